use thiserror::Error;

use crate::domain::entities::invoices::InvoiceEntity;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("no minimum chargeable amount for currency `{0}`")]
pub struct UnsupportedCurrency(pub String);

/// Smallest amount (minor units) the card processor will charge per currency.
pub fn minimum_chargeable_amount(currency: &str) -> Result<i64, UnsupportedCurrency> {
    let amount = match currency.to_ascii_lowercase().as_str() {
        "usd" | "aed" | "aud" | "brl" | "cad" | "chf" | "eur" | "inr" | "nzd" | "sgd" | "jpy" => 50,
        "bgn" => 100,
        "gbp" => 30,
        "dkk" => 250,
        "sek" | "nok" => 300,
        "czk" => 1500,
        "hkd" => 400,
        "huf" => 17500,
        "mxn" | "thb" => 1000,
        "myr" => 200,
        "pln" | "ron" => 200,
        _ => return Err(UnsupportedCurrency(currency.to_string())),
    };

    Ok(amount)
}

/// Invoices below the minimum are settled as zero invoices instead of being charged.
pub fn needs_active_charge(invoice: &InvoiceEntity) -> Result<bool, UnsupportedCurrency> {
    let minimum = minimum_chargeable_amount(&invoice.currency)?;
    Ok(invoice.amount_due >= minimum)
}
