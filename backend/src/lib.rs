pub mod auth;
pub mod config;
pub mod usecases;

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use crates::{
    domain::value_objects::currencies::CurrencyHelper,
    infra::{
        db::{
            postgres::postgres_connection::{self, PgPoolSquad},
            repositories::{
                account_customers::AccountCustomerPostgres, accounts::AccountPostgres,
                customers::StripeCustomerPostgres,
                external_entitlements::ExternalEntitlementPostgres,
                paypal_billing_agreements::PaypalCustomerPostgres,
            },
        },
        services::{
            customs_client::CustomsClient, http_support::ServiceHttp, mailer_client::MailerClient,
            profile_client::ProfileClient, push_client::PushClient,
        },
    },
    observability::diagnostics::TracingErrorReporter,
    payments::{
        paypal::{LIVE_NVP_URL, PaypalClient, PaypalCredentials, PaypalInvoiceProcessor, SANDBOX_NVP_URL},
        stripe::StripeClient,
    },
};
use tracing::info;

use auth::JwtIdentityResolver;
use config::{config_loader, config_model::DotEnvyConfig, stage::Stage};
use usecases::{
    paypal_checkout::PaypalCheckoutUseCase,
    services::{BillingServices, CheckoutSettings},
    stripe_checkout::StripeCheckoutUseCase,
};

/// Both payment rails over one set of collaborators.
pub struct Checkout {
    pub stripe: StripeCheckoutUseCase,
    pub paypal: PaypalCheckoutUseCase,
}

/// Loads configuration and wires the checkout use cases. Must run inside a tokio runtime.
pub fn bootstrap() -> Result<Checkout> {
    dotenvy::dotenv().ok();
    crates::observability::init_observability("subscriptions")?;

    let stage = config_loader::get_stage();
    let dotenvy_env = config_loader::load()?;
    info!(%stage, "ENV has been loaded");

    let postgres_pool = postgres_connection::establish_connection(
        &dotenvy_env.database.url,
        dotenvy_env.database.max_connections,
    )?;
    info!("Postgres connection has been established");

    let services = build_services(&dotenvy_env, stage, Arc::new(postgres_pool))?;
    Ok(Checkout {
        stripe: StripeCheckoutUseCase::new(services.clone()),
        paypal: PaypalCheckoutUseCase::new(services),
    })
}

pub fn build_services(
    config: &DotEnvyConfig,
    stage: Stage,
    db_pool: Arc<PgPoolSquad>,
) -> Result<Arc<BillingServices>> {
    let stripe_client = Arc::new(StripeClient::new(
        config.stripe.secret_key.clone(),
        config.stripe.api_base.clone(),
        config.stripe.tax_ids.clone(),
    ));

    let nvp_url = if stage.is_production() {
        LIVE_NVP_URL
    } else {
        SANDBOX_NVP_URL
    };
    let paypal_client = Arc::new(PaypalClient::new(
        PaypalCredentials {
            user: config.paypal.user.clone(),
            password: config.paypal.password.clone(),
            signature: config.paypal.signature.clone(),
        },
        nvp_url.to_string(),
        config.paypal.return_url.clone(),
        config.paypal.cancel_url.clone(),
    ));
    let invoice_processor = Arc::new(PaypalInvoiceProcessor::new(
        stripe_client.clone(),
        paypal_client.clone(),
    ));

    let currencies = match config.currency_countries.clone() {
        Some(table) => CurrencyHelper::new(table),
        None => CurrencyHelper::default(),
    };

    let collaborators = &config.services;
    let timeout = Duration::from_secs(collaborators.timeout_secs);
    let http = |service: &'static str, base_url: &str| {
        ServiceHttp::new(
            service,
            base_url.to_string(),
            collaborators.auth_secret.clone(),
            timeout,
        )
    };

    let accounts = Arc::new(AccountPostgres::new(Arc::clone(&db_pool)));
    let account_customers = Arc::new(AccountCustomerPostgres::new(Arc::clone(&db_pool)));

    info!(
        automatic_tax = config.stripe.automatic_tax,
        paypal_live = stage.is_production(),
        "subscriptions: services wired"
    );

    Ok(Arc::new(BillingServices {
        settings: CheckoutSettings {
            automatic_tax: config.stripe.automatic_tax,
        },
        customers: Arc::new(StripeCustomerPostgres::new(
            account_customers.clone(),
            stripe_client.clone(),
        )),
        plans: stripe_client.clone(),
        subscriptions: stripe_client.clone(),
        payment_methods: stripe_client.clone(),
        tax_rates: stripe_client.clone(),
        agreements: paypal_client,
        invoice_processor,
        currencies: Arc::new(currencies),
        identity: Arc::new(JwtIdentityResolver::new(
            config.auth.jwt_secret.clone(),
            config.auth.audience.clone(),
            accounts.clone(),
        )),
        customs: Arc::new(CustomsClient::new(http("customs", &collaborators.customs_url)?)),
        profile: Arc::new(ProfileClient::new(http("profile", &collaborators.profile_url)?)),
        push: Arc::new(PushClient::new(http("push", &collaborators.push_url)?)),
        mailer: Arc::new(MailerClient::new(http("mailer", &collaborators.mailer_url)?)),
        reporter: Arc::new(TracingErrorReporter::new()),
        accounts,
        account_customers,
        agreement_records: Arc::new(PaypalCustomerPostgres::new(Arc::clone(&db_pool))),
        entitlements: Arc::new(ExternalEntitlementPostgres::new(db_pool)),
    }))
}
