use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::{error, info};

use super::nvp::{NvpFields, check_ack, format_amount, parse_nvp};
use crate::domain::{
    entities::billing_agreements::AgreementDetails,
    interfaces::billing_agreements::BillingAgreementGateway,
    value_objects::enums::billing_agreement_statuses::BillingAgreementStatus,
};

pub const SANDBOX_NVP_URL: &str = "https://api-3t.sandbox.paypal.com/nvp";
pub const LIVE_NVP_URL: &str = "https://api-3t.paypal.com/nvp";
const NVP_VERSION: &str = "204";
const AGREEMENT_DESCRIPTION: &str = "Subscription billing agreement";

#[derive(Debug, Clone)]
pub struct PaypalCredentials {
    pub user: String,
    pub password: String,
    pub signature: String,
}

/// Arguments of a charge against a billing agreement.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTransaction {
    pub agreement_id: String,
    pub amount_minor: i64,
    pub currency: String,
    pub invoice_number: String,
    /// Sent as `MSGSUBID`, PayPal's replay key.
    pub idempotency_key: String,
    pub ip_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTransactionResult {
    pub transaction_id: String,
    pub payment_status: String,
    pub pending_reason: Option<String>,
}

/// PayPal classic (NVP) API client built on reqwest.
pub struct PaypalClient {
    http: reqwest::Client,
    credentials: PaypalCredentials,
    nvp_url: String,
    return_url: String,
    cancel_url: String,
}

impl PaypalClient {
    pub fn new(
        credentials: PaypalCredentials,
        nvp_url: String,
        return_url: String,
        cancel_url: String,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            credentials,
            nvp_url,
            return_url,
            cancel_url,
        }
    }

    async fn do_request(&self, method: &str, mut params: Vec<(&str, String)>) -> Result<NvpFields> {
        params.extend([
            ("USER", self.credentials.user.clone()),
            ("PWD", self.credentials.password.clone()),
            ("SIGNATURE", self.credentials.signature.clone()),
            ("METHOD", method.to_string()),
            ("VERSION", NVP_VERSION.to_string()),
        ]);

        let resp = self
            .http
            .post(&self.nvp_url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .form(&params)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            error!(%status, %method, "paypal: nvp request failed at http level");
            anyhow::bail!("PayPal NVP request failed: {method} (status {status})");
        }

        let fields = parse_nvp(&body);
        if let Err(api_error) = check_ack(method, &fields) {
            error!(
                %method,
                ack = %api_error.ack,
                paypal_error_code = ?api_error.error_code,
                paypal_short_message = ?api_error.short_message,
                paypal_long_message = ?api_error.long_message,
                paypal_correlation_id = ?api_error.correlation_id,
                "paypal: nvp request rejected"
            );
            return Err(api_error.into());
        }

        Ok(fields)
    }

    fn required(fields: &NvpFields, key: &str, method: &str) -> Result<String> {
        fields
            .get(key)
            .filter(|value| !value.is_empty())
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("PayPal {method} response is missing {key}"))
    }

    async fn ba_update(&self, agreement_id: &str, cancel: bool) -> Result<NvpFields> {
        let mut params = vec![("REFERENCEID", agreement_id.to_string())];
        if cancel {
            params.push(("BILLINGAGREEMENTSTATUS", "Canceled".to_string()));
        }
        self.do_request("BillAgreementUpdate", params).await
    }

    pub async fn do_reference_transaction(
        &self,
        transaction: &ReferenceTransaction,
    ) -> Result<ReferenceTransactionResult> {
        let mut params = vec![
            ("REFERENCEID", transaction.agreement_id.clone()),
            (
                "AMT",
                format_amount(transaction.amount_minor, &transaction.currency),
            ),
            ("CURRENCYCODE", transaction.currency.to_ascii_uppercase()),
            ("PAYMENTACTION", "Sale".to_string()),
            ("PAYMENTTYPE", "instant".to_string()),
            ("INVNUM", transaction.invoice_number.clone()),
            ("MSGSUBID", transaction.idempotency_key.clone()),
        ];
        if let Some(ip_address) = &transaction.ip_address {
            params.push(("IPADDRESS", ip_address.clone()));
        }

        let fields = self.do_request("DoReferenceTransaction", params).await?;
        let result = ReferenceTransactionResult {
            transaction_id: Self::required(&fields, "TRANSACTIONID", "DoReferenceTransaction")?,
            payment_status: fields.get("PAYMENTSTATUS").cloned().unwrap_or_default(),
            pending_reason: fields.get("PENDINGREASON").cloned(),
        };

        info!(
            invoice_number = %transaction.invoice_number,
            transaction_id = %result.transaction_id,
            payment_status = %result.payment_status,
            "paypal: reference transaction submitted"
        );
        Ok(result)
    }
}

pub(crate) fn agreement_details_from_fields(fields: &NvpFields) -> AgreementDetails {
    let get = |key: &str| fields.get(key).filter(|value| !value.is_empty()).cloned();

    AgreementDetails {
        status: fields
            .get("BILLINGAGREEMENTSTATUS")
            .and_then(|raw| BillingAgreementStatus::from_str(raw))
            .unwrap_or_default(),
        first_name: get("FIRSTNAME"),
        last_name: get("LASTNAME"),
        street: get("STREET"),
        street2: get("STREET2"),
        city: get("CITY"),
        state: get("STATE"),
        zip: get("ZIP"),
        country_code: get("COUNTRYCODE"),
    }
}

#[async_trait]
impl BillingAgreementGateway for PaypalClient {
    async fn get_checkout_token(&self, currency_code: &str) -> Result<String> {
        let params = vec![
            ("PAYMENTREQUEST_0_AMT", "0".to_string()),
            (
                "PAYMENTREQUEST_0_CURRENCYCODE",
                currency_code.to_ascii_uppercase(),
            ),
            ("PAYMENTREQUEST_0_PAYMENTACTION", "AUTHORIZATION".to_string()),
            ("L_BILLINGTYPE0", "MerchantInitiatedBilling".to_string()),
            ("L_BILLINGAGREEMENTDESCRIPTION0", AGREEMENT_DESCRIPTION.to_string()),
            ("NOSHIPPING", "1".to_string()),
            ("RETURNURL", self.return_url.clone()),
            ("CANCELURL", self.cancel_url.clone()),
        ];

        let fields = self.do_request("SetExpressCheckout", params).await?;
        Self::required(&fields, "TOKEN", "SetExpressCheckout")
    }

    async fn create_billing_agreement(&self, token: &str) -> Result<String> {
        let fields = self
            .do_request("CreateBillingAgreement", vec![("TOKEN", token.to_string())])
            .await?;
        Self::required(&fields, "BILLINGAGREEMENTID", "CreateBillingAgreement")
    }

    async fn agreement_details(&self, agreement_id: &str) -> Result<AgreementDetails> {
        let fields = self.ba_update(agreement_id, false).await?;
        Ok(agreement_details_from_fields(&fields))
    }

    async fn cancel_billing_agreement(&self, agreement_id: &str) -> Result<()> {
        self.ba_update(agreement_id, true).await?;
        info!(%agreement_id, "paypal: billing agreement canceled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payments::paypal::nvp::parse_nvp;

    #[test]
    fn agreement_details_read_payer_address() {
        let fields = parse_nvp(
            "BILLINGAGREEMENTSTATUS=Active&FIRSTNAME=Ada&LASTNAME=Lovelace&STREET=1+Market+St\
             &STREET2=&CITY=San+Francisco&STATE=CA&ZIP=94105&COUNTRYCODE=US&ACK=Success",
        );

        let details = agreement_details_from_fields(&fields);

        assert_eq!(details.status, BillingAgreementStatus::Active);
        assert_eq!(details.street.as_deref(), Some("1 Market St"));
        assert_eq!(details.street2, None);
        assert_eq!(details.country_code.as_deref(), Some("US"));
    }
}
