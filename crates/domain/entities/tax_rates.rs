#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaxRateEntity {
    pub id: String,
    pub country: String,
    pub percentage: f64,
}
