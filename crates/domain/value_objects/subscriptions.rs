use serde::{Deserialize, Serialize};

use crate::domain::{
    entities::{
        customers::CustomerEntity,
        invoices::{InvoiceEntity, PaymentIntentSummary},
        subscriptions::SubscriptionEntity,
    },
    value_objects::{
        enums::{invoice_statuses::InvoiceStatus, subscription_statuses::SubscriptionStatus},
        tax::TaxOptions,
    },
};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionWithPmiRequest {
    pub price_id: String,
    pub payment_method_id: Option<String>,
    pub promotion_code: Option<String>,
    pub idempotency_key: String,
    pub metrics_context: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionWithPaypalRequest {
    pub price_id: String,
    pub token: Option<String>,
    pub promotion_code: Option<String>,
    pub idempotency_key: String,
    pub metrics_context: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBillingAgreementRequest {
    pub token: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutTokenRequest {
    pub currency_code: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerRequest {
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RetryInvoiceRequest {
    pub invoice_id: String,
    pub payment_method_id: String,
    pub idempotency_key: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubscriptionRequest {
    pub subscription_id: String,
    pub plan_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionIdRequest {
    pub subscription_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodRequest {
    pub payment_method_id: String,
}

/// Arguments for a card-rail subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPmiSubscription {
    pub customer_id: String,
    pub price_id: String,
    pub payment_method_id: Option<String>,
    pub promotion_code_id: Option<String>,
    pub idempotency_key: String,
    pub tax: TaxOptions,
}

/// Arguments for a billing-agreement subscription, always collected by invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPaypalSubscription {
    pub customer_id: String,
    pub price_id: String,
    pub promotion_code_id: Option<String>,
    pub idempotency_key: String,
    pub tax: TaxOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilteredPaymentIntent {
    pub status: Option<String>,
    pub client_secret: Option<String>,
}

impl From<&PaymentIntentSummary> for FilteredPaymentIntent {
    fn from(intent: &PaymentIntentSummary) -> Self {
        Self {
            status: intent.status.clone(),
            client_secret: intent.client_secret.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilteredInvoice {
    pub id: String,
    pub status: InvoiceStatus,
    pub payment_intent: Option<FilteredPaymentIntent>,
}

impl From<&InvoiceEntity> for FilteredInvoice {
    fn from(invoice: &InvoiceEntity) -> Self {
        Self {
            id: invoice.id.clone(),
            status: invoice.status,
            payment_intent: invoice.payment_intent.as_ref().map(FilteredPaymentIntent::from),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilteredSubscription {
    pub id: String,
    pub status: SubscriptionStatus,
    pub latest_invoice: Option<FilteredInvoice>,
}

impl From<&SubscriptionEntity> for FilteredSubscription {
    fn from(subscription: &SubscriptionEntity) -> Self {
        Self {
            id: subscription.id.clone(),
            status: subscription.status,
            latest_invoice: subscription.latest_invoice.as_ref().map(FilteredInvoice::from),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilteredCustomer {
    pub id: String,
    pub currency: Option<String>,
    pub default_payment_method_id: Option<String>,
    pub billing_agreement_id: Option<String>,
    pub subscriptions: Vec<FilteredSubscription>,
}

impl From<&CustomerEntity> for FilteredCustomer {
    fn from(customer: &CustomerEntity) -> Self {
        Self {
            id: customer.id.clone(),
            currency: customer.currency.clone(),
            default_payment_method_id: customer.default_payment_method_id.clone(),
            billing_agreement_id: customer.paypal_agreement_id.clone(),
            subscriptions: customer
                .subscriptions
                .iter()
                .map(FilteredSubscription::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionCreated {
    pub source_country: Option<String>,
    pub subscription: FilteredSubscription,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSubscription {
    pub uid: String,
    pub subscription_id: String,
    pub product_id: String,
    pub created_at_ms: i64,
    pub cancelled_at_ms: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionIdResponse {
    pub subscription_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodIdResponse {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckoutToken {
    pub token: String,
}
