use mockall::automock;

#[automock]
pub trait CurrencyCompatibility: Send + Sync {
    fn is_currency_compatible_with_country(&self, currency: &str, country: &str) -> bool;
}
