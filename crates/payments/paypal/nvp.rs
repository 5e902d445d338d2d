use std::collections::HashMap;

use thiserror::Error;

/// Name-value-pair fields from a PayPal classic API response.
pub type NvpFields = HashMap<String, String>;

#[derive(Debug, Error, Clone, PartialEq)]
#[error("paypal {method} failed: ack={ack} code={error_code:?} {short_message:?} (correlation_id={correlation_id:?})")]
pub struct PaypalApiError {
    pub method: String,
    pub ack: String,
    pub error_code: Option<String>,
    pub short_message: Option<String>,
    pub long_message: Option<String>,
    pub correlation_id: Option<String>,
}

pub fn parse_nvp(body: &str) -> NvpFields {
    url::form_urlencoded::parse(body.as_bytes())
        .into_owned()
        .collect()
}

/// `Success` and `SuccessWithWarning` are both successful acknowledgements.
pub fn check_ack(method: &str, fields: &NvpFields) -> Result<(), PaypalApiError> {
    let ack = fields.get("ACK").cloned().unwrap_or_default();
    if ack == "Success" || ack == "SuccessWithWarning" {
        return Ok(());
    }

    Err(PaypalApiError {
        method: method.to_string(),
        ack,
        error_code: fields.get("L_ERRORCODE0").cloned(),
        short_message: fields.get("L_SHORTMESSAGE0").cloned(),
        long_message: fields.get("L_LONGMESSAGE0").cloned(),
        correlation_id: fields.get("CORRELATIONID").cloned(),
    })
}

const ZERO_DECIMAL_CURRENCIES: [&str; 3] = ["JPY", "HUF", "TWD"];

/// Formats minor units the way NVP amounts are written, e.g. `1234` usd -> `12.34`.
pub fn format_amount(amount_minor: i64, currency: &str) -> String {
    if ZERO_DECIMAL_CURRENCIES
        .iter()
        .any(|code| code.eq_ignore_ascii_case(currency))
    {
        return amount_minor.to_string();
    }

    let sign = if amount_minor < 0 { "-" } else { "" };
    let absolute = amount_minor.unsigned_abs();
    format!("{sign}{}.{:02}", absolute / 100, absolute % 100)
}
