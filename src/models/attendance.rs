use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{
    channel::ChannelKind,
    recipient::{PhoneMode, RecipientSource},
    template::{MediaKind, Template},
};

/// Uploaded header media, as returned by the upload webhook.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeaderMedia {
    #[serde(default)]
    pub image_url: Option<String>,

    #[serde(default)]
    pub video_url: Option<String>,

    #[serde(default)]
    pub document_url: Option<String>,

    #[serde(default)]
    pub document_name: Option<String>,
}

impl HeaderMedia {
    pub fn url_for(&self, kind: MediaKind) -> Option<&str> {
        let url = match kind {
            MediaKind::Image => self.image_url.as_deref(),
            MediaKind::Video => self.video_url.as_deref(),
            MediaKind::Document => self.document_url.as_deref(),
        };
        url.filter(|u| !u.is_empty())
    }
}

/// Everything the operator filled in on the panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceForm {
    pub channel_id: String,

    /// Raw channel type reported by the host (`4` is a cloud channel).
    pub channel_type: u32,

    pub sector_id: String,
    pub ddi: String,
    pub recipients: RecipientSource,

    #[serde(default)]
    pub send_quick_message: bool,

    #[serde(default)]
    pub template: Option<Template>,

    #[serde(default)]
    pub variables: HashMap<String, String>,

    #[serde(default)]
    pub button_values: HashMap<String, String>,

    #[serde(default)]
    pub media: HeaderMedia,

    /// Free text sent when no template is selected.
    #[serde(default)]
    pub message: Option<String>,
}

impl AttendanceForm {
    pub fn channel_kind(&self) -> ChannelKind {
        ChannelKind::from_type(self.channel_type)
    }

    /// Template actually sent as a quick message; only cloud channels
    /// support them.
    pub fn quick_message_template(&self) -> Option<&Template> {
        if self.send_quick_message && self.channel_kind() == ChannelKind::Cloud {
            self.template.as_ref()
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemplateComponentKind {
    Header,
    Body,
    CopyCode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateComponent {
    #[serde(rename = "type")]
    pub kind: TemplateComponentKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<MediaKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    pub parameters: Vec<TemplateParameter>,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateParameter {
    pub parameter_name: String,

    #[serde(flatten)]
    pub value: ParameterValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParameterValue {
    Text { text: String },
    Image { image: MediaLink },
    Video { video: MediaLink },
    Document { document: DocumentLink },
    CouponCode { coupon_code: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaLink {
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentLink {
    pub link: String,
    pub filename: String,
}

/// Body posted to the attendance webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendancePayload {
    pub channel_id: String,
    pub sector_id: String,
    pub phone: String,
    pub system_key: String,
    pub user_id: String,
    pub type_select: PhoneMode,
    pub type_channel: ChannelKind,
    pub endereco_api: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_list: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub template_components: Vec<TemplateComponent>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceResponse {
    #[serde(default)]
    pub total_atendimentos: Option<String>,

    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}
