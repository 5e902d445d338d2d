use std::sync::Arc;

use crates::domain::{
    interfaces::{
        billing_agreements::BillingAgreementGateway, currencies::CurrencyCompatibility,
        customs::CustomsGate, diagnostics::ErrorReporter, identity::IdentityResolver,
        invoice_processing::InvoiceProcessor, mailer::AccountMailer, profile::ProfileCache,
        push::DevicePush,
    },
    repositories::{
        account_customers::AccountCustomerRepository, accounts::AccountRepository,
        billing_agreement_records::BillingAgreementRecordRepository,
        customers::CustomerRepository, external_entitlements::ExternalEntitlementRepository,
        payment_methods::PaymentMethodLookup, plans::PlanLookup,
        subscriptions::SubscriptionLifecycle, tax_rates::TaxRateLookup,
    },
};

#[derive(Debug, Clone, Copy, Default)]
pub struct CheckoutSettings {
    /// Let the provider compute tax from the customer's location.
    pub automatic_tax: bool,
}

/// Every collaborator the checkout flows talk to.
#[derive(Clone)]
pub struct BillingServices {
    pub settings: CheckoutSettings,
    pub customers: Arc<dyn CustomerRepository>,
    pub plans: Arc<dyn PlanLookup>,
    pub subscriptions: Arc<dyn SubscriptionLifecycle>,
    pub payment_methods: Arc<dyn PaymentMethodLookup>,
    pub tax_rates: Arc<dyn TaxRateLookup>,
    pub agreements: Arc<dyn BillingAgreementGateway>,
    pub invoice_processor: Arc<dyn InvoiceProcessor>,
    pub currencies: Arc<dyn CurrencyCompatibility>,
    pub identity: Arc<dyn IdentityResolver>,
    pub customs: Arc<dyn CustomsGate>,
    pub profile: Arc<dyn ProfileCache>,
    pub push: Arc<dyn DevicePush>,
    pub mailer: Arc<dyn AccountMailer>,
    pub reporter: Arc<dyn ErrorReporter>,
    pub accounts: Arc<dyn AccountRepository>,
    pub account_customers: Arc<dyn AccountCustomerRepository>,
    pub agreement_records: Arc<dyn BillingAgreementRecordRepository>,
    pub entitlements: Arc<dyn ExternalEntitlementRepository>,
}
