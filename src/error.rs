use thiserror::Error;

use crate::models::template::MediaKind;

/// Conditions that block a submission before anything is sent.
///
/// The `Display` text is what the operator sees in the host alert.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please fill in all required fields")]
    MissingSelection,

    #[error("Please enter a phone number")]
    MissingPhone,

    #[error("Please select a CSV file")]
    MissingCsvFile,

    #[error("Please upload the template {0}")]
    MissingHeaderMedia(MediaKind),

    #[error("CSV must start with a number in the first column")]
    CsvLeadingNumber,

    #[error("The limit is {limit} contacts ({found} provided)")]
    ListOverLimit { limit: usize, found: usize },

    #[error("Failed to read CSV file: {0}")]
    FileUnreadable(String),

    #[error("CSV file is empty")]
    EmptyFile,

    #[error("The recipient list contains no valid data")]
    NoValidData,

    #[error("systemKey not found")]
    MissingSystemKey,
}

/// Recoverable reductions of scope reported next to a successful result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipientWarning {
    Truncated { total: usize, used: usize },
}

impl std::fmt::Display for RecipientWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecipientWarning::Truncated { used, .. } => {
                write!(f, "Only the first {} numbers of the CSV will be started", used)
            }
        }
    }
}
