use std::fmt::{Display, Formatter, Result};

use serde::{Deserialize, Serialize};

const CLOUD_CHANNEL_TYPE: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Cloud,
    Web,
}

impl ChannelKind {
    pub fn from_type(channel_type: u32) -> Self {
        if channel_type == CLOUD_CHANNEL_TYPE {
            ChannelKind::Cloud
        } else {
            ChannelKind::Web
        }
    }
}

impl Display for ChannelKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            ChannelKind::Cloud => write!(f, "cloud"),
            ChannelKind::Web => write!(f, "web"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sector {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub organization_id: String,
}
