use std::fmt::{Display, Formatter, Result};

use serde::{Deserialize, Serialize};

/// How the operator entered recipients; serialized as the webhook's
/// `typeSelect`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhoneMode {
    #[serde(rename = "numero")]
    Single,
    #[serde(rename = "lista")]
    List,
    #[serde(rename = "csv")]
    Csv,
}

impl Display for PhoneMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            PhoneMode::Single => write!(f, "numero"),
            PhoneMode::List => write!(f, "lista"),
            PhoneMode::Csv => write!(f, "csv"),
        }
    }
}

/// Raw recipient input, one variant per phone mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum RecipientSource {
    Single { number: String },
    List { text: String },
    Csv { text: String },
}

impl RecipientSource {
    pub fn mode(&self) -> PhoneMode {
        match self {
            RecipientSource::Single { .. } => PhoneMode::Single,
            RecipientSource::List { .. } => PhoneMode::List,
            RecipientSource::Csv { .. } => PhoneMode::Csv,
        }
    }
}

/// One normalized recipient: prefixed phone digits plus the values its
/// template variables are filled with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipientRecord {
    pub phone: String,
    pub extras: Vec<String>,
}

impl Display for RecipientRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}", self.phone)?;
        for extra in &self.extras {
            write!(f, ",{}", extra)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum RecipientBatch {
    /// `+<prefix><digits>`.
    Single { phone: String },
    Bulk { records: Vec<RecipientRecord> },
}

impl RecipientBatch {
    pub fn len(&self) -> usize {
        match self {
            RecipientBatch::Single { .. } => 1,
            RecipientBatch::Bulk { records } => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value of the webhook `phone` field: the single number without its
    /// leading `+`, or one record per line.
    pub fn wire_phone(&self) -> String {
        match self {
            RecipientBatch::Single { phone } => {
                phone.strip_prefix('+').unwrap_or(phone).to_string()
            }
            RecipientBatch::Bulk { records } => records
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}
