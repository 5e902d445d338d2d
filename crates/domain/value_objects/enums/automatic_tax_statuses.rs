use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AutomaticTaxStatus {
    Supported,
    UnrecognizedLocation,
    NotCollecting,
    Failed,
}

impl AutomaticTaxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AutomaticTaxStatus::Supported => "supported",
            AutomaticTaxStatus::UnrecognizedLocation => "unrecognized_location",
            AutomaticTaxStatus::NotCollecting => "not_collecting",
            AutomaticTaxStatus::Failed => "failed",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "supported" => Some(AutomaticTaxStatus::Supported),
            "unrecognized_location" => Some(AutomaticTaxStatus::UnrecognizedLocation),
            "not_collecting" => Some(AutomaticTaxStatus::NotCollecting),
            "failed" => Some(AutomaticTaxStatus::Failed),
            _ => None,
        }
    }
}

impl Display for AutomaticTaxStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
