use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// `ChargeAutomatically` is the card rail, `SendInvoice` the billing-agreement rail.
#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CollectionMethod {
    #[default]
    ChargeAutomatically,
    SendInvoice,
}

impl CollectionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionMethod::ChargeAutomatically => "charge_automatically",
            CollectionMethod::SendInvoice => "send_invoice",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "charge_automatically" => Some(CollectionMethod::ChargeAutomatically),
            "send_invoice" => Some(CollectionMethod::SendInvoice),
            _ => None,
        }
    }
}

impl Display for CollectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
