use serde::{Deserialize, Serialize};

/// Identity the host shell exposes for the logged-in operator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub user_id: Option<String>,

    #[serde(default)]
    pub system_key: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,
}

impl UserInfo {
    /// `userId`, falling back to `id`; empty when neither is known.
    pub fn resolved_user_id(&self) -> String {
        self.user_id
            .as_deref()
            .or(self.id.as_deref())
            .filter(|id| !id.is_empty())
            .unwrap_or_default()
            .to_string()
    }

    pub fn resolved_system_key(&self) -> Option<&str> {
        self.system_key.as_deref().filter(|key| !key.is_empty())
    }
}
