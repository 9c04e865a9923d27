//! Placeholder extraction, message rendering and the structured parameter
//! list a quick message is sent with.
//!
//! Placeholders are written `{{token}}` where `token` is any run of
//! characters other than `}`. Tokens are trimmed when used as lookup keys,
//! but substitution only touches placeholders whose raw text is exactly
//! `{{token}}`.

use std::{
    collections::{HashMap, HashSet},
    sync::LazyLock,
};

use regex::{Captures, Regex};
use serde::Serialize;

use crate::models::{
    attendance::{
        DocumentLink, HeaderMedia, MediaLink, ParameterValue, TemplateComponent,
        TemplateComponentKind, TemplateParameter,
    },
    template::{ButtonKind, MediaKind, Template},
};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^}]+)\}\}").expect("placeholder pattern is valid"));

const DEFAULT_DOCUMENT_NAME: &str = "documento";

/// Ordered, de-duplicated placeholder tokens of `body`, in order of first
/// appearance.
pub fn extract_variables(body: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut ordered = Vec::new();

    for captures in PLACEHOLDER.captures_iter(body) {
        let token = captures[1].trim();
        if seen.insert(token.to_string()) {
            ordered.push(token.to_string());
        }
    }

    ordered
}

/// Replaces every `{{token}}` that has a non-empty value in `variables`.
///
/// Unfilled placeholders are left verbatim so the operator can see what is
/// still missing. Substitution runs in a single pass, so values that happen
/// to contain `{{...}}` are never expanded again.
pub fn render_message(body: &str, variables: &HashMap<String, String>) -> String {
    PLACEHOLDER
        .replace_all(body, |captures: &Captures| {
            substitution(&captures[1], variables)
                .map(str::to_string)
                .unwrap_or_else(|| captures[0].to_string())
        })
        .into_owned()
}

/// Tokens of `body` with at least one placeholder [`render_message`] leaves
/// in place, in order of first appearance.
pub fn unfilled_variables(body: &str, variables: &HashMap<String, String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut unfilled = Vec::new();

    for captures in PLACEHOLDER.captures_iter(body) {
        let raw = &captures[1];
        let token = raw.trim().to_string();
        if substitution(raw, variables).is_none() && seen.insert(token.clone()) {
            unfilled.push(token);
        }
    }

    unfilled
}

/// Value for a raw placeholder body. Placeholders padded with whitespace
/// inside the braces are never substituted.
fn substitution<'a>(raw: &str, variables: &'a HashMap<String, String>) -> Option<&'a str> {
    if raw != raw.trim() {
        return None;
    }
    variables
        .get(raw)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

/// Values of `ordered` looked up in `variables`; missing tokens become empty
/// strings.
pub fn ordered_values(ordered: &[String], variables: &HashMap<String, String>) -> Vec<String> {
    ordered
        .iter()
        .map(|token| variables.get(token).cloned().unwrap_or_default())
        .collect()
}

/// Operator input feeding [`build_components`].
#[derive(Debug, Clone, Copy)]
pub struct ComponentInputs<'a> {
    pub variables: &'a HashMap<String, String>,
    pub button_values: &'a HashMap<String, String>,
    pub media: &'a HeaderMedia,
}

/// Builds the provider-specific component list: header media, one text
/// parameter per body token, then one component per filled copy-code button.
pub fn build_components(template: &Template, inputs: ComponentInputs<'_>) -> Vec<TemplateComponent> {
    let mut components = Vec::new();

    if let Some(format) = template.header_format() {
        if let Some(parameter) = header_parameter(format, inputs.media) {
            components.push(TemplateComponent {
                kind: TemplateComponentKind::Header,
                sub_type: Some(format),
                text: None,
                parameters: vec![parameter],
                index: 0,
            });
        }
    }

    let body_parameters: Vec<TemplateParameter> = extract_variables(template.body_text())
        .into_iter()
        .map(|token| {
            let text = inputs.variables.get(&token).cloned().unwrap_or_default();
            TemplateParameter {
                parameter_name: token,
                value: ParameterValue::Text { text },
            }
        })
        .collect();

    if !body_parameters.is_empty() {
        components.push(TemplateComponent {
            kind: TemplateComponentKind::Body,
            sub_type: None,
            text: None,
            parameters: body_parameters,
            index: components.len(),
        });
    }

    for (position, button) in template.buttons().iter().enumerate() {
        if button.kind != ButtonKind::CopyCode {
            continue;
        }

        let key = format!("button_{}", position);
        let Some(code) = inputs.button_values.get(&key).filter(|v| !v.is_empty()) else {
            continue;
        };

        components.push(TemplateComponent {
            kind: TemplateComponentKind::CopyCode,
            sub_type: None,
            text: Some(
                button
                    .text
                    .clone()
                    .unwrap_or_else(|| format!("Botão {}", position + 1)),
            ),
            parameters: vec![TemplateParameter {
                parameter_name: key,
                value: ParameterValue::CouponCode {
                    coupon_code: code.clone(),
                },
            }],
            index: components.len(),
        });
    }

    components
}

fn header_parameter(format: MediaKind, media: &HeaderMedia) -> Option<TemplateParameter> {
    let link = media.url_for(format)?.to_string();

    let value = match format {
        MediaKind::Image => ParameterValue::Image {
            image: MediaLink { link },
        },
        MediaKind::Video => ParameterValue::Video {
            video: MediaLink { link },
        },
        MediaKind::Document => ParameterValue::Document {
            document: DocumentLink {
                link,
                filename: media
                    .document_name
                    .clone()
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| DEFAULT_DOCUMENT_NAME.to_string()),
            },
        },
    };

    Some(TemplateParameter {
        parameter_name: format!("header_{}", format),
        value,
    })
}

/// Everything the panel needs to draw the live preview of a template.
#[derive(Debug, Clone, Serialize)]
pub struct TemplatePreview {
    pub variables: Vec<String>,
    pub message: String,
    pub unfilled: Vec<String>,
    pub header: Option<MediaKind>,
}

impl TemplatePreview {
    pub fn new(template: &Template, variables: &HashMap<String, String>) -> Self {
        let body = template.body_text();

        Self {
            variables: extract_variables(body),
            message: render_message(body, variables),
            unfilled: unfilled_variables(body, variables),
            header: template.header_format(),
        }
    }
}
