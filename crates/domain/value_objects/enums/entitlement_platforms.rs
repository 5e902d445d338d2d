use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntitlementPlatform {
    AppStore,
    PlayStore,
}

impl EntitlementPlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntitlementPlatform::AppStore => "app_store",
            EntitlementPlatform::PlayStore => "play_store",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "app_store" => Some(EntitlementPlatform::AppStore),
            "play_store" => Some(EntitlementPlatform::PlayStore),
            _ => None,
        }
    }
}

impl Display for EntitlementPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
