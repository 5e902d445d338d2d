use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::interfaces::currencies::CurrencyCompatibility;

/// Maps an uppercase ISO 4217 currency to the ISO 3166 countries allowed to pay in it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrencyHelper {
    currency_to_countries: HashMap<String, Vec<String>>,
}

impl CurrencyHelper {
    pub fn new(currency_to_countries: HashMap<String, Vec<String>>) -> Self {
        let currency_to_countries = currency_to_countries
            .into_iter()
            .map(|(currency, countries)| {
                (
                    currency.to_ascii_uppercase(),
                    countries
                        .into_iter()
                        .map(|country| country.to_ascii_uppercase())
                        .collect(),
                )
            })
            .collect();

        Self {
            currency_to_countries,
        }
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        let map: HashMap<String, Vec<String>> = serde_json::from_str(raw)?;
        Ok(Self::new(map))
    }

    pub fn supported_currencies(&self) -> Vec<String> {
        let mut currencies: Vec<String> = self.currency_to_countries.keys().cloned().collect();
        currencies.sort();
        currencies
    }
}

impl Default for CurrencyHelper {
    fn default() -> Self {
        let pairs: [(&str, &[&str]); 4] = [
            ("USD", &["US", "GB", "NZ", "MY", "SG", "CA", "AS", "GU", "MP", "PR", "VI"]),
            (
                "EUR",
                &["FR", "DE", "NL", "IT", "AT", "BE", "ES", "IE", "FI", "PT", "LU"],
            ),
            ("CHF", &["CH"]),
            ("GBP", &["GB"]),
        ];

        Self::new(
            pairs
                .iter()
                .map(|(currency, countries)| {
                    (
                        currency.to_string(),
                        countries.iter().map(|country| country.to_string()).collect(),
                    )
                })
                .collect(),
        )
    }
}

impl CurrencyCompatibility for CurrencyHelper {
    fn is_currency_compatible_with_country(&self, currency: &str, country: &str) -> bool {
        self.currency_to_countries
            .get(&currency.to_ascii_uppercase())
            .map(|countries| {
                countries
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(country))
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usd_is_accepted_from_the_us() {
        let helper = CurrencyHelper::default();
        assert!(helper.is_currency_compatible_with_country("usd", "US"));
        assert!(helper.is_currency_compatible_with_country("USD", "ca"));
    }

    #[test]
    fn eur_is_rejected_from_the_us() {
        let helper = CurrencyHelper::default();
        assert!(!helper.is_currency_compatible_with_country("eur", "US"));
    }

    #[test]
    fn unknown_currency_is_never_compatible() {
        let helper = CurrencyHelper::default();
        assert!(!helper.is_currency_compatible_with_country("jpy", "JP"));
    }

    #[test]
    fn parses_configured_map() {
        let helper = CurrencyHelper::from_json(r#"{"usd":["us"],"nok":["NO"]}"#)
            .expect("valid map");
        assert!(helper.is_currency_compatible_with_country("NOK", "no"));
        assert_eq!(helper.supported_currencies(), vec!["NOK", "USD"]);
    }
}
