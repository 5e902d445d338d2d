use std::collections::HashMap;

use serde::Deserialize;

use crate::domain::{
    entities::{
        customers::{Address, CustomerEntity, CustomerTax},
        invoices::{InvoiceEntity, PaymentIntentSummary},
        payment_methods::PaymentMethodEntity,
        plans::AbbrevPlan,
        promotion_codes::PromotionCodeEntity,
        subscriptions::{SubscriptionEntity, SubscriptionItem},
        tax_rates::TaxRateEntity,
    },
    value_objects::enums::{
        automatic_tax_statuses::AutomaticTaxStatus, collection_methods::CollectionMethod,
        invoice_statuses::InvoiceStatus, subscription_statuses::SubscriptionStatus,
    },
};

pub(crate) const METADATA_USER_ID: &str = "userid";
pub(crate) const METADATA_PAYPAL_AGREEMENT: &str = "paypalAgreementId";
pub(crate) const METADATA_PAYMENT_ATTEMPTS: &str = "paymentAttempts";
pub(crate) const METADATA_PAYPAL_TRANSACTION: &str = "paypalTransactionId";
pub(crate) const METADATA_PRODUCT_SET: &str = "productSet";
pub(crate) const TAX_ID_FIELD_NAME: &str = "Tax ID";

/// A field Stripe returns either as an id or, when expanded, as the object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum Expandable<T> {
    Object(Box<T>),
    Id(String),
}

impl<T> Expandable<T> {
    pub(crate) fn object(&self) -> Option<&T> {
        match self {
            Expandable::Object(object) => Some(object),
            Expandable::Id(_) => None,
        }
    }
}

impl Expandable<StripeProduct> {
    fn id(&self) -> &str {
        match self {
            Expandable::Object(product) => &product.id,
            Expandable::Id(id) => id,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StripeList<T> {
    pub(crate) data: Vec<T>,
    #[serde(default)]
    pub(crate) has_more: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StripeErrorEnvelope {
    pub(crate) error: StripeErrorDetails,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StripeErrorDetails {
    #[serde(rename = "type")]
    pub(crate) type_: Option<String>,
    pub(crate) code: Option<String>,
    pub(crate) message: Option<String>,
    pub(crate) param: Option<String>,
    pub(crate) decline_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub(crate) struct StripeAddress {
    pub(crate) line1: Option<String>,
    pub(crate) line2: Option<String>,
    pub(crate) city: Option<String>,
    pub(crate) state: Option<String>,
    pub(crate) postal_code: Option<String>,
    pub(crate) country: Option<String>,
}

impl From<StripeAddress> for Address {
    fn from(value: StripeAddress) -> Self {
        Self {
            line1: value.line1,
            line2: value.line2,
            city: value.city,
            state: value.state,
            postal_code: value.postal_code,
            country: value.country,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub(crate) struct StripeCustomField {
    pub(crate) name: String,
    pub(crate) value: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub(crate) struct StripeInvoiceSettings {
    pub(crate) default_payment_method: Option<Expandable<StripePaymentMethod>>,
    #[serde(default)]
    pub(crate) custom_fields: Option<Vec<StripeCustomField>>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StripeCustomerTax {
    pub(crate) automatic_tax: Option<String>,
    pub(crate) ip_address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StripeCustomer {
    pub(crate) id: String,
    #[serde(default)]
    pub(crate) deleted: bool,
    pub(crate) email: Option<String>,
    pub(crate) currency: Option<String>,
    #[serde(default)]
    pub(crate) metadata: HashMap<String, String>,
    pub(crate) address: Option<StripeAddress>,
    #[serde(default)]
    pub(crate) invoice_settings: StripeInvoiceSettings,
    pub(crate) tax: Option<StripeCustomerTax>,
    pub(crate) subscriptions: Option<StripeList<StripeSubscription>>,
}

impl From<StripeCustomer> for CustomerEntity {
    fn from(value: StripeCustomer) -> Self {
        let default_payment_method_id =
            value
                .invoice_settings
                .default_payment_method
                .map(|method| match method {
                    Expandable::Object(method) => method.id,
                    Expandable::Id(id) => id,
                });

        let tax_ids = value
            .invoice_settings
            .custom_fields
            .unwrap_or_default()
            .into_iter()
            .filter(|field| field.name == TAX_ID_FIELD_NAME)
            .map(|field| field.value)
            .collect();

        let tax = value
            .tax
            .map(|tax| CustomerTax {
                automatic_tax: tax
                    .automatic_tax
                    .as_deref()
                    .and_then(AutomaticTaxStatus::from_str),
                ip_address: tax.ip_address,
            })
            .unwrap_or_default();

        Self {
            id: value.id,
            uid: value.metadata.get(METADATA_USER_ID).cloned(),
            email: value.email,
            currency: value.currency,
            tax,
            address: value.address.map(Address::from),
            default_payment_method_id,
            paypal_agreement_id: value
                .metadata
                .get(METADATA_PAYPAL_AGREEMENT)
                .filter(|id| !id.is_empty())
                .cloned(),
            tax_ids,
            subscriptions: value
                .subscriptions
                .map(|list| list.data.into_iter().map(SubscriptionEntity::from).collect())
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StripePrice {
    pub(crate) id: String,
    #[serde(default)]
    pub(crate) active: bool,
    pub(crate) currency: String,
    pub(crate) unit_amount: Option<i64>,
    pub(crate) recurring: Option<StripeRecurring>,
    pub(crate) product: Expandable<StripeProduct>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StripeRecurring {
    pub(crate) interval: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StripeProduct {
    pub(crate) id: String,
    #[serde(default)]
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) metadata: HashMap<String, String>,
}

impl From<StripePrice> for AbbrevPlan {
    fn from(value: StripePrice) -> Self {
        let product = value.product.object();
        Self {
            plan_id: value.id.clone(),
            product_id: value.product.id().to_string(),
            product_name: product.map(|p| p.name.clone()).unwrap_or_default(),
            currency: value.currency,
            amount: value.unit_amount.unwrap_or_default(),
            interval: value
                .recurring
                .map(|recurring| recurring.interval)
                .unwrap_or_default(),
            product_set: product
                .and_then(|p| p.metadata.get(METADATA_PRODUCT_SET))
                .filter(|set| !set.is_empty())
                .cloned(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StripeSubscriptionItem {
    pub(crate) id: String,
    pub(crate) price: StripePrice,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StripeSubscription {
    pub(crate) id: String,
    pub(crate) customer: String,
    pub(crate) status: String,
    pub(crate) collection_method: Option<String>,
    pub(crate) items: StripeList<StripeSubscriptionItem>,
    pub(crate) latest_invoice: Option<Expandable<StripeInvoice>>,
    #[serde(default)]
    pub(crate) created: i64,
    pub(crate) canceled_at: Option<i64>,
    #[serde(default)]
    pub(crate) cancel_at_period_end: bool,
}

impl From<StripeSubscription> for SubscriptionEntity {
    fn from(value: StripeSubscription) -> Self {
        Self {
            id: value.id,
            customer_id: value.customer,
            // Unknown statuses are treated as not yet settled.
            status: SubscriptionStatus::from_str(&value.status).unwrap_or_default(),
            collection_method: value
                .collection_method
                .as_deref()
                .and_then(CollectionMethod::from_str)
                .unwrap_or_default(),
            items: value
                .items
                .data
                .into_iter()
                .map(|item| SubscriptionItem {
                    id: item.id,
                    product_id: item.price.product.id().to_string(),
                    price_id: item.price.id,
                })
                .collect(),
            latest_invoice: value.latest_invoice.and_then(|invoice| match invoice {
                Expandable::Object(invoice) => Some(InvoiceEntity::from(*invoice)),
                Expandable::Id(_) => None,
            }),
            created: value.created,
            canceled_at: value.canceled_at,
            cancel_at_period_end: value.cancel_at_period_end,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StripeInvoice {
    pub(crate) id: String,
    pub(crate) customer: String,
    pub(crate) subscription: Option<String>,
    #[serde(default)]
    pub(crate) amount_due: i64,
    pub(crate) currency: String,
    pub(crate) status: Option<String>,
    #[serde(default)]
    pub(crate) attempt_count: i64,
    #[serde(default)]
    pub(crate) created: i64,
    #[serde(default)]
    pub(crate) metadata: HashMap<String, String>,
    pub(crate) payment_intent: Option<Expandable<StripePaymentIntent>>,
}

impl From<StripeInvoice> for InvoiceEntity {
    fn from(value: StripeInvoice) -> Self {
        // Billing-agreement payments happen outside Stripe, so their attempts live in metadata.
        let attempt_count = value
            .metadata
            .get(METADATA_PAYMENT_ATTEMPTS)
            .and_then(|raw| raw.parse::<i64>().ok())
            .unwrap_or(value.attempt_count);

        Self {
            id: value.id,
            customer_id: value.customer,
            subscription_id: value.subscription,
            amount_due: value.amount_due,
            currency: value.currency,
            status: value
                .status
                .as_deref()
                .and_then(InvoiceStatus::from_str)
                .unwrap_or_default(),
            attempt_count,
            created: value.created,
            payment_intent: value.payment_intent.and_then(|intent| match intent {
                Expandable::Object(intent) => Some(PaymentIntentSummary::from(*intent)),
                Expandable::Id(id) => Some(PaymentIntentSummary {
                    id,
                    ..Default::default()
                }),
            }),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StripePaymentIntent {
    pub(crate) id: String,
    pub(crate) status: Option<String>,
    pub(crate) client_secret: Option<String>,
    pub(crate) payment_method: Option<Expandable<StripePaymentMethod>>,
}

impl From<StripePaymentIntent> for PaymentIntentSummary {
    fn from(value: StripePaymentIntent) -> Self {
        let card_country = value
            .payment_method
            .as_ref()
            .and_then(Expandable::object)
            .and_then(|method| method.card.as_ref())
            .and_then(|card| card.country.clone());

        Self {
            id: value.id,
            status: value.status,
            client_secret: value.client_secret,
            card_country,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StripeCard {
    pub(crate) country: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub(crate) struct StripeBillingDetails {
    pub(crate) address: Option<StripeAddress>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StripePaymentMethod {
    pub(crate) id: String,
    pub(crate) customer: Option<String>,
    pub(crate) card: Option<StripeCard>,
    #[serde(default)]
    pub(crate) billing_details: StripeBillingDetails,
}

impl From<StripePaymentMethod> for PaymentMethodEntity {
    fn from(value: StripePaymentMethod) -> Self {
        Self {
            id: value.id,
            customer_id: value.customer,
            card_country: value.card.and_then(|card| card.country),
            billing_postal_code: value
                .billing_details
                .address
                .and_then(|address| address.postal_code)
                .filter(|code| !code.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StripeCoupon {
    #[serde(default)]
    pub(crate) valid: bool,
    pub(crate) applies_to: Option<StripeCouponAppliesTo>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StripeCouponAppliesTo {
    #[serde(default)]
    pub(crate) products: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StripePromotionCode {
    pub(crate) id: String,
    pub(crate) code: String,
    #[serde(default)]
    pub(crate) active: bool,
    pub(crate) expires_at: Option<i64>,
    pub(crate) coupon: StripeCoupon,
}

impl From<StripePromotionCode> for PromotionCodeEntity {
    fn from(value: StripePromotionCode) -> Self {
        Self {
            id: value.id,
            code: value.code,
            active: value.active,
            coupon_valid: value.coupon.valid,
            expires_at: value.expires_at,
            applies_to_products: value
                .coupon
                .applies_to
                .map(|applies_to| applies_to.products)
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StripeTaxRate {
    pub(crate) id: String,
    pub(crate) country: Option<String>,
    #[serde(default)]
    pub(crate) percentage: f64,
}

impl StripeTaxRate {
    pub(crate) fn into_entity(self) -> Option<TaxRateEntity> {
        Some(TaxRateEntity {
            id: self.id,
            country: self.country?,
            percentage: self.percentage,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StripeSource {
    pub(crate) id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn customer_reads_agreement_and_expanded_subscriptions() {
        let raw = json!({
            "id": "cus_1",
            "email": "user@example.com",
            "currency": "usd",
            "metadata": { "userid": "uid1", "paypalAgreementId": "B-123" },
            "tax": { "automatic_tax": "supported", "ip_address": "1.2.3.4" },
            "invoice_settings": {
                "default_payment_method": "pm_1",
                "custom_fields": [{ "name": "Tax ID", "value": "EU1234" }]
            },
            "subscriptions": {
                "data": [{
                    "id": "sub_1",
                    "customer": "cus_1",
                    "status": "active",
                    "collection_method": "send_invoice",
                    "items": { "data": [{
                        "id": "si_1",
                        "price": { "id": "price_1", "currency": "usd", "product": "prod_1" }
                    }]},
                    "latest_invoice": "in_1",
                    "created": 1700000000
                }],
                "has_more": false
            }
        });

        let customer: CustomerEntity = serde_json::from_value::<StripeCustomer>(raw)
            .expect("customer json")
            .into();

        assert_eq!(customer.uid.as_deref(), Some("uid1"));
        assert_eq!(customer.paypal_agreement(), Some("B-123"));
        assert!(customer.is_automatic_tax_supported());
        assert!(customer.has_tax_id());
        assert_eq!(customer.default_payment_method_id.as_deref(), Some("pm_1"));
        assert!(customer.has_paypal_subscription());
        assert_eq!(customer.subscriptions[0].items[0].product_id, "prod_1");
        assert!(customer.subscriptions[0].latest_invoice.is_none());
    }

    #[test]
    fn expanded_invoice_carries_card_country_and_attempts() {
        let raw = json!({
            "id": "in_1",
            "customer": "cus_1",
            "subscription": "sub_1",
            "amount_due": 999,
            "currency": "usd",
            "status": "open",
            "attempt_count": 0,
            "metadata": { "paymentAttempts": "2" },
            "payment_intent": {
                "id": "pi_1",
                "status": "succeeded",
                "client_secret": "pi_1_secret",
                "payment_method": { "id": "pm_1", "card": { "country": "CA" } }
            }
        });

        let invoice: InvoiceEntity = serde_json::from_value::<StripeInvoice>(raw)
            .expect("invoice json")
            .into();

        assert_eq!(invoice.status, InvoiceStatus::Open);
        assert_eq!(invoice.attempt_count, 2);
        assert_eq!(invoice.payment_attempt_key(), "in_1-2");
        assert_eq!(
            invoice.payment_intent.and_then(|intent| intent.card_country).as_deref(),
            Some("CA")
        );
    }

    #[test]
    fn price_with_product_set_becomes_abbrev_plan() {
        let raw = json!({
            "id": "price_1",
            "active": true,
            "currency": "eur",
            "unit_amount": 499,
            "recurring": { "interval": "month" },
            "product": {
                "id": "prod_1",
                "name": "Secure VPN",
                "metadata": { "productSet": "vpn" }
            }
        });

        let plan: AbbrevPlan = serde_json::from_value::<StripePrice>(raw)
            .expect("price json")
            .into();

        assert_eq!(plan.product_id, "prod_1");
        assert_eq!(plan.product_name, "Secure VPN");
        assert_eq!(plan.product_set.as_deref(), Some("vpn"));
        assert_eq!(plan.interval, "month");
    }
}
