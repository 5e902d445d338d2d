use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use anyhow::{Result, bail};
use async_trait::async_trait;
use crates::domain::{
    entities::{
        customers::CustomerEntity,
        invoices::{InvoiceEntity, PaymentIntentSummary},
        plans::AbbrevPlan,
        subscriptions::{SubscriptionEntity, SubscriptionItem},
    },
    interfaces::{
        billing_agreements::MockBillingAgreementGateway, currencies::MockCurrencyCompatibility,
        customs::MockCustomsGate, diagnostics::MockErrorReporter, identity::MockIdentityResolver,
        invoice_processing::MockInvoiceProcessor, mailer::MockAccountMailer,
        profile::MockProfileCache, push::MockDevicePush,
    },
    repositories::{
        account_customers::MockAccountCustomerRepository, accounts::MockAccountRepository,
        billing_agreement_records::MockBillingAgreementRecordRepository,
        customers::MockCustomerRepository,
        external_entitlements::MockExternalEntitlementRepository,
        payment_methods::MockPaymentMethodLookup, plans::MockPlanLookup,
        subscriptions::{MockSubscriptionLifecycle, SubscriptionLifecycle},
        tax_rates::MockTaxRateLookup,
    },
    value_objects::{
        customs::CustomsVerdict,
        enums::{
            collection_methods::CollectionMethod, invoice_statuses::InvoiceStatus,
            subscription_statuses::SubscriptionStatus,
        },
        iam::{AccountModel, AuthenticatedUser, Credentials, RequestContext},
        subscriptions::{NewPaypalSubscription, NewPmiSubscription},
    },
};

use super::services::{BillingServices, CheckoutSettings};

pub const UID: &str = "uid-1";
pub const EMAIL: &str = "user@example.com";
pub const CLIENT_ADDRESS: &str = "203.0.113.9";

pub struct Mocks {
    pub settings: CheckoutSettings,
    pub customers: MockCustomerRepository,
    pub plans: MockPlanLookup,
    pub subscriptions: MockSubscriptionLifecycle,
    pub payment_methods: MockPaymentMethodLookup,
    pub tax_rates: MockTaxRateLookup,
    pub agreements: MockBillingAgreementGateway,
    pub invoice_processor: MockInvoiceProcessor,
    pub currencies: MockCurrencyCompatibility,
    pub identity: MockIdentityResolver,
    pub customs: MockCustomsGate,
    pub profile: MockProfileCache,
    pub push: MockDevicePush,
    pub mailer: MockAccountMailer,
    pub reporter: MockErrorReporter,
    pub accounts: MockAccountRepository,
    pub account_customers: MockAccountCustomerRepository,
    pub agreement_records: MockBillingAgreementRecordRepository,
    pub entitlements: MockExternalEntitlementRepository,
    lifecycle_override: Option<Arc<dyn SubscriptionLifecycle>>,
}

impl Mocks {
    pub fn new() -> Self {
        Self {
            settings: CheckoutSettings::default(),
            customers: MockCustomerRepository::new(),
            plans: MockPlanLookup::new(),
            subscriptions: MockSubscriptionLifecycle::new(),
            payment_methods: MockPaymentMethodLookup::new(),
            tax_rates: MockTaxRateLookup::new(),
            agreements: MockBillingAgreementGateway::new(),
            invoice_processor: MockInvoiceProcessor::new(),
            currencies: MockCurrencyCompatibility::new(),
            identity: MockIdentityResolver::new(),
            customs: MockCustomsGate::new(),
            profile: MockProfileCache::new(),
            push: MockDevicePush::new(),
            mailer: MockAccountMailer::new(),
            reporter: MockErrorReporter::new(),
            accounts: MockAccountRepository::new(),
            account_customers: MockAccountCustomerRepository::new(),
            agreement_records: MockBillingAgreementRecordRepository::new(),
            entitlements: MockExternalEntitlementRepository::new(),
            lifecycle_override: None,
        }
    }

    /// Caller resolves to `user` and passes customs.
    pub fn allow_caller(&mut self, user: AuthenticatedUser) {
        self.identity
            .expect_resolve()
            .returning(move |_| Ok(Some(user.clone())));
        self.customs
            .expect_check()
            .returning(|_, _, _| Ok(CustomsVerdict::Allowed));
    }

    pub fn allow_notifications(&mut self) {
        self.profile.expect_delete_cache().returning(|_| Ok(()));
        self.push.expect_notify_profile_updated().returning(|_| Ok(()));
        self.mailer.expect_send_finish_setup_email().returning(|_| Ok(()));
    }

    pub fn no_external_entitlements(&mut self) {
        self.entitlements
            .expect_list_for_uid()
            .returning(|_| Ok(Vec::new()));
    }

    pub fn compatible_currencies(&mut self) {
        self.currencies
            .expect_is_currency_compatible_with_country()
            .returning(|_, _| true);
    }

    pub fn use_lifecycle(&mut self, lifecycle: Arc<dyn SubscriptionLifecycle>) {
        self.lifecycle_override = Some(lifecycle);
    }

    pub fn into_services(self) -> BillingServices {
        let subscriptions: Arc<dyn SubscriptionLifecycle> = match self.lifecycle_override {
            Some(lifecycle) => lifecycle,
            None => Arc::new(self.subscriptions),
        };
        BillingServices {
            settings: self.settings,
            customers: Arc::new(self.customers),
            plans: Arc::new(self.plans),
            subscriptions,
            payment_methods: Arc::new(self.payment_methods),
            tax_rates: Arc::new(self.tax_rates),
            agreements: Arc::new(self.agreements),
            invoice_processor: Arc::new(self.invoice_processor),
            currencies: Arc::new(self.currencies),
            identity: Arc::new(self.identity),
            customs: Arc::new(self.customs),
            profile: Arc::new(self.profile),
            push: Arc::new(self.push),
            mailer: Arc::new(self.mailer),
            reporter: Arc::new(self.reporter),
            accounts: Arc::new(self.accounts),
            account_customers: Arc::new(self.account_customers),
            agreement_records: Arc::new(self.agreement_records),
            entitlements: Arc::new(self.entitlements),
        }
    }
}

pub fn request() -> RequestContext {
    RequestContext {
        credentials: Credentials::bearer("session-token"),
        client_address: CLIENT_ADDRESS.to_string(),
        location: None,
    }
}

fn user_with_verifier(verifier_set_at: i64) -> AuthenticatedUser {
    AuthenticatedUser {
        uid: UID.to_string(),
        email: EMAIL.to_string(),
        account: AccountModel {
            uid: UID.to_string(),
            email: EMAIL.to_string(),
            email_verified: verifier_set_at > 0,
            verifier_set_at,
        },
    }
}

/// Passwordless account created during checkout.
pub fn stub_user() -> AuthenticatedUser {
    user_with_verifier(0)
}

pub fn verified_user() -> AuthenticatedUser {
    user_with_verifier(1_700_000_000_000)
}

pub fn customer(id: &str) -> CustomerEntity {
    CustomerEntity {
        id: id.to_string(),
        uid: Some(UID.to_string()),
        email: Some(EMAIL.to_string()),
        ..CustomerEntity::default()
    }
}

pub fn plan(plan_id: &str, product_id: &str, currency: &str) -> AbbrevPlan {
    AbbrevPlan {
        plan_id: plan_id.to_string(),
        product_id: product_id.to_string(),
        product_name: format!("{product_id} product"),
        currency: currency.to_string(),
        amount: 999,
        interval: "month".to_string(),
        product_set: None,
    }
}

pub fn invoice(id: &str, amount_due: i64, currency: &str) -> InvoiceEntity {
    InvoiceEntity {
        id: id.to_string(),
        customer_id: "cus_1".to_string(),
        amount_due,
        currency: currency.to_string(),
        status: InvoiceStatus::Open,
        ..InvoiceEntity::default()
    }
}

pub fn subscription(
    id: &str,
    price_id: &str,
    status: SubscriptionStatus,
    collection_method: CollectionMethod,
) -> SubscriptionEntity {
    SubscriptionEntity {
        id: id.to_string(),
        customer_id: "cus_1".to_string(),
        status,
        collection_method,
        items: vec![SubscriptionItem {
            id: format!("si_{id}"),
            price_id: price_id.to_string(),
            product_id: format!("prod_{price_id}"),
        }],
        created: 1_700_000_000,
        ..SubscriptionEntity::default()
    }
}

pub fn with_card_country(mut subscription: SubscriptionEntity, country: &str) -> SubscriptionEntity {
    let invoice_id = format!("in_{}", subscription.id);
    let latest = subscription
        .latest_invoice
        .get_or_insert_with(|| invoice(&invoice_id, 999, "usd"));
    latest.payment_intent = Some(PaymentIntentSummary {
        id: "pi_1".to_string(),
        status: Some("succeeded".to_string()),
        client_secret: Some("secret".to_string()),
        card_country: Some(country.to_string()),
    });
    subscription
}

/// Replays the first subscription created for an idempotency key, like the provider does.
#[derive(Default)]
pub struct IdempotentLifecycle {
    by_key: Mutex<HashMap<String, SubscriptionEntity>>,
    created: AtomicUsize,
}

impl IdempotentLifecycle {
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    fn create_once(
        &self,
        key: &str,
        price_id: &str,
        collection: CollectionMethod,
    ) -> Result<SubscriptionEntity> {
        let mut by_key = match self.by_key.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let stored = by_key.entry(key.to_string()).or_insert_with(|| {
            let n = self.created.fetch_add(1, Ordering::SeqCst) + 1;
            let mut fresh = subscription(
                &format!("sub_{n}"),
                price_id,
                SubscriptionStatus::Incomplete,
                collection,
            );
            fresh.latest_invoice = Some(invoice(&format!("in_{n}"), 0, "usd"));
            fresh
        });
        Ok(stored.clone())
    }
}

#[async_trait]
impl SubscriptionLifecycle for IdempotentLifecycle {
    async fn create_subscription_with_pmi(
        &self,
        subscription: &NewPmiSubscription,
    ) -> Result<SubscriptionEntity> {
        self.create_once(
            &subscription.idempotency_key,
            &subscription.price_id,
            CollectionMethod::ChargeAutomatically,
        )
    }

    async fn create_subscription_with_paypal(
        &self,
        subscription: &NewPaypalSubscription,
    ) -> Result<SubscriptionEntity> {
        self.create_once(
            &subscription.idempotency_key,
            &subscription.price_id,
            CollectionMethod::SendInvoice,
        )
    }

    async fn cancel_subscription(&self, subscription_id: &str) -> Result<()> {
        bail!("unexpected cancel of {subscription_id}")
    }

    async fn set_cancel_at_period_end(
        &self,
        subscription_id: &str,
        _cancel_at_period_end: bool,
    ) -> Result<SubscriptionEntity> {
        bail!("unexpected update of {subscription_id}")
    }

    async fn change_subscription_plan(
        &self,
        subscription: &SubscriptionEntity,
        _new_price_id: &str,
    ) -> Result<SubscriptionEntity> {
        bail!("unexpected plan change of {}", subscription.id)
    }

    async fn retry_invoice_with_payment_id(
        &self,
        _customer_id: &str,
        invoice_id: &str,
        _payment_method_id: &str,
        _idempotency_key: &str,
    ) -> Result<InvoiceEntity> {
        bail!("unexpected retry of {invoice_id}")
    }

    async fn fetch_open_invoices(
        &self,
        customer_id: &str,
        _created_before_secs: i64,
    ) -> Result<Vec<InvoiceEntity>> {
        bail!("unexpected invoice listing for {customer_id}")
    }
}
