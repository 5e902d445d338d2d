use serde::{Deserialize, Serialize};

use crate::domain::{
    entities::subscriptions::SubscriptionEntity,
    value_objects::enums::{
        automatic_tax_statuses::AutomaticTaxStatus, collection_methods::CollectionMethod,
        subscription_statuses::SubscriptionStatus,
    },
};

/// Related objects to inline when fetching a customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerExpand {
    Subscriptions,
    Tax,
    TaxIds,
}

impl CustomerExpand {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerExpand::Subscriptions => "subscriptions",
            CustomerExpand::Tax => "tax",
            CustomerExpand::TaxIds => "tax_ids",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Address {
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CustomerTax {
    pub automatic_tax: Option<AutomaticTaxStatus>,
    pub ip_address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerEntity {
    pub id: String,
    pub uid: Option<String>,
    pub email: Option<String>,
    /// Set by the provider on the first subscription and fixed afterwards.
    pub currency: Option<String>,
    pub tax: CustomerTax,
    pub address: Option<Address>,
    pub default_payment_method_id: Option<String>,
    pub paypal_agreement_id: Option<String>,
    pub tax_ids: Vec<String>,
    pub subscriptions: Vec<SubscriptionEntity>,
}

impl CustomerEntity {
    pub fn paypal_agreement(&self) -> Option<&str> {
        self.paypal_agreement_id.as_deref().filter(|id| !id.is_empty())
    }

    /// A customer pays by billing agreement once any live subscription is invoice-collected.
    pub fn has_paypal_subscription(&self) -> bool {
        self.subscriptions.iter().any(|subscription| {
            subscription.collection_method == CollectionMethod::SendInvoice
                && subscription.status.is_active()
        })
    }

    pub fn has_tax_id(&self) -> bool {
        !self.tax_ids.is_empty()
    }

    pub fn is_automatic_tax_supported(&self) -> bool {
        self.tax.automatic_tax == Some(AutomaticTaxStatus::Supported)
    }

    pub fn address_country(&self) -> Option<&str> {
        self.address
            .as_ref()
            .and_then(|address| address.country.as_deref())
    }

    pub fn find_subscription(&self, subscription_id: &str) -> Option<&SubscriptionEntity> {
        self.subscriptions
            .iter()
            .find(|subscription| subscription.id == subscription_id)
    }

    pub fn find_incomplete_subscription_for_price(
        &self,
        price_id: &str,
    ) -> Option<&SubscriptionEntity> {
        self.subscriptions.iter().find(|subscription| {
            subscription.status == SubscriptionStatus::Incomplete
                && subscription.items.iter().any(|item| item.price_id == price_id)
        })
    }

    pub fn active_subscriptions(&self) -> impl Iterator<Item = &SubscriptionEntity> {
        self.subscriptions
            .iter()
            .filter(|subscription| subscription.status.is_active())
    }
}
