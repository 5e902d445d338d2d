use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BillingAgreementStatus {
    #[default]
    Active,
    Canceled,
}

impl BillingAgreementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingAgreementStatus::Active => "active",
            BillingAgreementStatus::Canceled => "canceled",
        }
    }

    /// PayPal reports `Active`/`Canceled`; the datastore stores lowercase.
    pub fn from_str(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "active" => Some(BillingAgreementStatus::Active),
            "canceled" | "cancelled" => Some(BillingAgreementStatus::Canceled),
            _ => None,
        }
    }
}

impl Display for BillingAgreementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
