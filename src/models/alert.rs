use std::fmt::{Display, Formatter, Result};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertVariant {
    Success,
    Error,
    Warning,
}

impl Display for AlertVariant {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            AlertVariant::Success => write!(f, "success"),
            AlertVariant::Error => write!(f, "error"),
            AlertVariant::Warning => write!(f, "warning"),
        }
    }
}

/// Message shown to the operator through the host shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub variant: AlertVariant,
    pub message: String,
}

impl Alert {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            variant: AlertVariant::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            variant: AlertVariant::Error,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            variant: AlertVariant::Warning,
            message: message.into(),
        }
    }
}
