use crate::domain::{
    entities::invoices::InvoiceEntity,
    value_objects::enums::{
        collection_methods::CollectionMethod, subscription_statuses::SubscriptionStatus,
    },
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscriptionItem {
    pub id: String,
    pub price_id: String,
    pub product_id: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscriptionEntity {
    pub id: String,
    pub customer_id: String,
    pub status: SubscriptionStatus,
    pub collection_method: CollectionMethod,
    pub items: Vec<SubscriptionItem>,
    pub latest_invoice: Option<InvoiceEntity>,
    /// Unix seconds.
    pub created: i64,
    pub canceled_at: Option<i64>,
    pub cancel_at_period_end: bool,
}

impl SubscriptionEntity {
    /// The only item of the subscription; `None` when it carries several plans.
    pub fn single_plan(&self) -> Option<&SubscriptionItem> {
        match self.items.as_slice() {
            [item] => Some(item),
            _ => None,
        }
    }

    /// Card country of the payment behind the latest invoice.
    pub fn source_country(&self) -> Option<String> {
        self.latest_invoice
            .as_ref()
            .and_then(|invoice| invoice.payment_intent.as_ref())
            .and_then(|intent| intent.card_country.clone())
    }
}
