use std::fmt::{Display, Formatter, Result};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub description: String,

    #[serde(default)]
    pub messages: Vec<TemplateMessage>,

    #[serde(default)]
    pub dynamic_components: Vec<DynamicComponent>,

    #[serde(default)]
    pub static_components: Vec<StaticComponent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateMessage {
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ComponentType {
    Header,
    Body,
    Footer,
    Buttons,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DynamicComponent {
    #[serde(rename = "type")]
    pub kind: ComponentType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<MediaKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default)]
    pub buttons: Vec<TemplateButton>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticComponent {
    #[serde(rename = "type")]
    pub kind: ComponentType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default)]
    pub buttons: Vec<TemplateButton>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateButton {
    #[serde(rename = "type")]
    pub kind: ButtonKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ButtonKind {
    QuickReply,
    Url,
    CopyCode,
}

/// Header media a template can require before it may be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MediaKind {
    Image,
    Video,
    Document,
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            MediaKind::Image => write!(f, "image"),
            MediaKind::Video => write!(f, "video"),
            MediaKind::Document => write!(f, "document"),
        }
    }
}

impl Template {
    /// Body text of the first dynamic `BODY` component, falling back to a
    /// static one.
    pub fn body_text(&self) -> &str {
        self.dynamic_components
            .iter()
            .find(|c| c.kind == ComponentType::Body)
            .and_then(|c| c.text.as_deref())
            .or_else(|| {
                self.static_components
                    .iter()
                    .find(|c| c.kind == ComponentType::Body)
                    .and_then(|c| c.text.as_deref())
            })
            .unwrap_or_default()
    }

    pub fn header_format(&self) -> Option<MediaKind> {
        self.dynamic_components
            .iter()
            .find(|c| c.kind == ComponentType::Header)
            .and_then(|c| c.format)
    }

    pub fn buttons(&self) -> &[TemplateButton] {
        if let Some(component) = self
            .static_components
            .iter()
            .find(|c| c.kind == ComponentType::Buttons && !c.buttons.is_empty())
        {
            return &component.buttons;
        }

        if let Some(component) = self
            .dynamic_components
            .iter()
            .find(|c| !c.buttons.is_empty())
        {
            return &component.buttons;
        }

        &[]
    }
}
