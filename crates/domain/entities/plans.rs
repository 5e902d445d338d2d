use serde::{Deserialize, Serialize};

/// The subset of a price and its product used at checkout.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AbbrevPlan {
    pub plan_id: String,
    pub product_id: String,
    pub product_name: String,
    pub currency: String,
    pub amount: i64,
    pub interval: String,
    /// Plans sharing a product set are tiers of one offering.
    pub product_set: Option<String>,
}

impl AbbrevPlan {
    pub fn shares_product_set_with(&self, other_set: Option<&str>) -> bool {
        match (self.product_set.as_deref(), other_set) {
            (Some(mine), Some(theirs)) => mine == theirs,
            _ => false,
        }
    }
}
