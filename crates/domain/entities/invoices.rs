use crate::domain::value_objects::enums::invoice_statuses::InvoiceStatus;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentIntentSummary {
    pub id: String,
    pub status: Option<String>,
    pub client_secret: Option<String>,
    pub card_country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoiceEntity {
    pub id: String,
    pub customer_id: String,
    pub subscription_id: Option<String>,
    /// Minor units.
    pub amount_due: i64,
    pub currency: String,
    pub status: InvoiceStatus,
    pub attempt_count: i64,
    pub created: i64,
    pub payment_intent: Option<PaymentIntentSummary>,
}

impl InvoiceEntity {
    /// Message id for a reference transaction; unique per invoice and attempt.
    pub fn payment_attempt_key(&self) -> String {
        format!("{}-{}", self.id, self.attempt_count)
    }
}
