use serde::{Deserialize, Serialize};

/// How the provider computes tax for a new subscription.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum TaxOptions {
    Automatic { enabled: bool },
    Manual { tax_rate_id: Option<String> },
}

impl TaxOptions {
    pub fn is_automatic(&self) -> bool {
        matches!(self, TaxOptions::Automatic { enabled: true })
    }
}
