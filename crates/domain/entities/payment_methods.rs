#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentMethodEntity {
    pub id: String,
    pub customer_id: Option<String>,
    pub card_country: Option<String>,
    pub billing_postal_code: Option<String>,
}
