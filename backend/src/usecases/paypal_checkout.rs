use std::sync::Arc;

use chrono::Utc;
use crates::domain::{
    entities::{
        customers::{CustomerEntity, CustomerExpand},
        plans::AbbrevPlan,
        subscriptions::SubscriptionEntity,
    },
    value_objects::{
        addresses::BillingAddressUpdate,
        enums::billing_agreement_statuses::BillingAgreementStatus,
        iam::{AuthenticatedUser, RequestContext},
        subscriptions::{
            CheckoutToken, CheckoutTokenRequest, CreateSubscriptionWithPaypalRequest,
            FilteredCustomer, FilteredSubscription, NewPaypalSubscription, SubscriptionCreated,
            UpdateBillingAgreementRequest,
        },
    },
};
use tracing::{error, info, warn};

use super::{
    account_cleanup::finish_with_stub_cleanup,
    catalog::{extract_promotion_code, require_plan},
    compensation::{Rollback, roll_back},
    customer_resolution::{authorize, require_customer},
    eligibility::ensure_eligible,
    errors::{SubscriptionError, UseCaseResult},
    invoice_settlement::{BackgroundSettlement, settle_initial_invoice},
    notifications::{customer_changed, send_finish_setup_email_for_stub_account},
    services::BillingServices,
    tax::{automatic_tax_applies, tax_options},
};

/// How a checkout on the billing-agreement rail gets paid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaypalPaymentPath {
    /// First PayPal checkout: the approved token becomes a new agreement.
    NewAgreement { token: String },
    /// Returning PayPal customer billed through the agreement on file.
    ExistingAgreement { agreement_id: String },
}

pub fn validate_payment_path(
    customer: &CustomerEntity,
    token: Option<&str>,
) -> UseCaseResult<PaypalPaymentPath> {
    let token = token.filter(|token| !token.is_empty());
    let is_paypal_customer = customer.has_paypal_subscription();
    let agreement = customer.paypal_agreement();
    let customer_id = customer.id.clone();

    match (is_paypal_customer, agreement, token) {
        (true, None, _) => Err(SubscriptionError::MissingBillingAgreement { customer_id }),
        (false, _, None) => Err(SubscriptionError::MissingPaymentToken { customer_id }),
        (_, Some(_), Some(_)) => {
            Err(SubscriptionError::BillingAgreementAlreadyExists { customer_id })
        }
        (false, None, Some(token)) => Ok(PaypalPaymentPath::NewAgreement {
            token: token.to_string(),
        }),
        (true, Some(agreement_id), None) => Ok(PaypalPaymentPath::ExistingAgreement {
            agreement_id: agreement_id.to_string(),
        }),
    }
}

/// An agreement created in this request whose payer country fits the currency.
#[derive(Debug, Clone, PartialEq)]
struct VerifiedAgreement {
    agreement_id: String,
    country_code: String,
}

struct PaypalOrder<'a> {
    user: &'a AuthenticatedUser,
    customer: &'a CustomerEntity,
    plan: &'a AbbrevPlan,
    promotion_code_id: Option<String>,
    idempotency_key: String,
    ip_address: Option<String>,
    tax_subscription: bool,
}

fn client_ip(request: &RequestContext) -> Option<String> {
    Some(request.client_address.clone()).filter(|address| !address.is_empty())
}

pub struct PaypalCheckoutUseCase {
    services: Arc<BillingServices>,
    settlement: BackgroundSettlement,
}

impl PaypalCheckoutUseCase {
    pub fn new(services: Arc<BillingServices>) -> Self {
        let settlement = BackgroundSettlement::new(
            Arc::clone(&services.invoice_processor),
            Arc::clone(&services.reporter),
        );
        Self {
            services,
            settlement,
        }
    }

    pub async fn get_checkout_token(
        &self,
        request: &RequestContext,
        payload: CheckoutTokenRequest,
    ) -> UseCaseResult<CheckoutToken> {
        let user = authorize(&self.services, request, "getCheckoutToken").await?;
        let token = self
            .services
            .agreements
            .get_checkout_token(&payload.currency_code)
            .await
            .map_err(|err| {
                error!(uid = %user.uid, currency = %payload.currency_code, error = ?err, "paypal: checkout token failed");
                SubscriptionError::Upstream(err)
            })?;
        info!(uid = %user.uid, currency = %payload.currency_code, "paypal: checkout token issued");
        Ok(CheckoutToken { token })
    }

    pub async fn create_subscription_with_paypal(
        &self,
        request: &RequestContext,
        payload: CreateSubscriptionWithPaypalRequest,
    ) -> UseCaseResult<SubscriptionCreated> {
        let user = authorize(&self.services, request, "createSubscriptionWithPaypal").await?;
        info!(uid = %user.uid, price_id = %payload.price_id, "paypal: create subscription requested");

        let result = self.create_for_user(request, &user, payload).await;
        if let Err(err) = &result {
            warn!(
                uid = %user.uid,
                status = err.status_code().as_u16(),
                errno = err.errno(),
                error = %err,
                "paypal: create subscription failed"
            );
        }
        finish_with_stub_cleanup(&self.services, &user, result).await
    }

    async fn create_for_user(
        &self,
        request: &RequestContext,
        user: &AuthenticatedUser,
        payload: CreateSubscriptionWithPaypalRequest,
    ) -> UseCaseResult<SubscriptionCreated> {
        let services = self.services.as_ref();
        let customer = require_customer(
            services,
            &user.uid,
            vec![CustomerExpand::Subscriptions, CustomerExpand::Tax],
        )
        .await?;
        let plan = require_plan(services, &payload.price_id).await?;

        let path = validate_payment_path(&customer, payload.token.as_deref())?;
        ensure_eligible(services, &user.uid, &customer, &plan).await?;
        let promotion =
            extract_promotion_code(services, payload.promotion_code.as_deref(), &plan).await?;

        let order = PaypalOrder {
            user,
            customer: &customer,
            plan: &plan,
            promotion_code_id: promotion.map(|promotion| promotion.id),
            idempotency_key: payload.idempotency_key.clone(),
            ip_address: client_ip(request),
            tax_subscription: automatic_tax_applies(services, &customer),
        };

        let (subscription, source_country) = match path {
            PaypalPaymentPath::NewAgreement { token } => {
                self.subscribe_with_new_agreement(request, &order, &token).await?
            }
            PaypalPaymentPath::ExistingAgreement { agreement_id } => {
                info!(uid = %user.uid, %agreement_id, "paypal: billing existing agreement");
                self.subscribe_with_existing_agreement(&order).await?
            }
        };

        customer_changed(services, &user.uid).await;
        send_finish_setup_email_for_stub_account(services, user, &plan, payload.metrics_context)
            .await;

        info!(
            uid = %user.uid,
            subscription_id = %subscription.id,
            "paypal: subscription created"
        );
        Ok(SubscriptionCreated {
            source_country,
            subscription: FilteredSubscription::from(&subscription),
        })
    }

    async fn subscribe_with_new_agreement(
        &self,
        request: &RequestContext,
        order: &PaypalOrder<'_>,
        token: &str,
    ) -> UseCaseResult<(SubscriptionEntity, Option<String>)> {
        let services = self.services.as_ref();
        let verified = self
            .create_and_verify_agreement(
                request,
                &order.user.uid,
                order.customer,
                token,
                &order.plan.currency,
                order.tax_subscription,
            )
            .await?;
        let agreement_id = verified.agreement_id.as_str();
        let abandon_agreement = Rollback {
            agreement_id: Some(agreement_id),
            ..Rollback::default()
        };

        let tax = match tax_options(
            services,
            order.customer,
            &order.plan.currency,
            Some(&verified.country_code),
        )
        .await
        {
            Ok(tax) => tax,
            Err(err) => {
                roll_back(services, abandon_agreement, "paypal_checkout").await?;
                return Err(err);
            }
        };

        let new_subscription = NewPaypalSubscription {
            customer_id: order.customer.id.clone(),
            price_id: order.plan.plan_id.clone(),
            promotion_code_id: order.promotion_code_id.clone(),
            idempotency_key: order.idempotency_key.clone(),
            tax,
        };
        let (created, attached) = tokio::join!(
            services
                .subscriptions
                .create_subscription_with_paypal(&new_subscription),
            services
                .customers
                .update_customer_paypal_agreement(order.customer, agreement_id)
        );

        let (subscription, customer) = match (created, attached) {
            (Ok(subscription), Ok(customer)) => (subscription, customer),
            (Err(err), attached) => {
                error!(customer_id = %order.customer.id, error = ?err, "paypal: subscription creation failed");
                let rollback = Rollback {
                    detach_agreement_from: attached.is_ok().then_some(order.customer),
                    ..abandon_agreement
                };
                roll_back(services, rollback, "paypal_checkout").await?;
                return Err(SubscriptionError::Upstream(err));
            }
            (Ok(subscription), Err(err)) => {
                error!(customer_id = %order.customer.id, error = ?err, "paypal: attaching agreement failed");
                let rollback = Rollback {
                    subscription_id: Some(&subscription.id),
                    ..abandon_agreement
                };
                roll_back(services, rollback, "paypal_checkout").await?;
                return Err(SubscriptionError::Upstream(err));
            }
        };

        settle_initial_invoice(
            services,
            &customer,
            &subscription,
            Some(agreement_id),
            order.ip_address.clone(),
        )
        .await?;

        Ok((subscription, Some(verified.country_code)))
    }

    async fn subscribe_with_existing_agreement(
        &self,
        order: &PaypalOrder<'_>,
    ) -> UseCaseResult<(SubscriptionEntity, Option<String>)> {
        let services = self.services.as_ref();
        let country = order.customer.address_country().map(str::to_string);
        let tax = tax_options(services, order.customer, &order.plan.currency, country.as_deref())
            .await?;

        let new_subscription = NewPaypalSubscription {
            customer_id: order.customer.id.clone(),
            price_id: order.plan.plan_id.clone(),
            promotion_code_id: order.promotion_code_id.clone(),
            idempotency_key: order.idempotency_key.clone(),
            tax,
        };
        let subscription = services
            .subscriptions
            .create_subscription_with_paypal(&new_subscription)
            .await
            .map_err(|err| {
                error!(customer_id = %order.customer.id, error = ?err, "paypal: subscription creation failed");
                SubscriptionError::Upstream(err)
            })?;

        settle_initial_invoice(
            services,
            order.customer,
            &subscription,
            None,
            order.ip_address.clone(),
        )
        .await?;

        Ok((subscription, country))
    }

    /// Turns `token` into an agreement whose payer country can pay in `currency`.
    ///
    /// The agreement is cancelled again when its details cannot be read or the
    /// country does not fit.
    async fn create_and_verify_agreement(
        &self,
        request: &RequestContext,
        uid: &str,
        customer: &CustomerEntity,
        token: &str,
        currency: &str,
        tax_subscription: bool,
    ) -> UseCaseResult<VerifiedAgreement> {
        let services = self.services.as_ref();
        let agreement_id = services
            .agreements
            .create_billing_agreement(token)
            .await
            .map_err(|err| {
                error!(%uid, error = ?err, "paypal: billing agreement creation failed");
                SubscriptionError::Upstream(err)
            })?;
        let abandon_agreement = Rollback {
            agreement_id: Some(&agreement_id),
            ..Rollback::default()
        };

        let details = match services.agreements.agreement_details(&agreement_id).await {
            Ok(details) => details,
            Err(err) => {
                error!(%uid, %agreement_id, error = ?err, "paypal: agreement details unavailable");
                roll_back(services, abandon_agreement, "verify_billing_agreement").await?;
                return Err(SubscriptionError::Upstream(err));
            }
        };

        if !tax_subscription {
            let address = BillingAddressUpdate::from_agreement(&details, request.location.as_ref());
            if let Err(err) = services
                .customers
                .update_customer_billing_address(&customer.id, &address)
                .await
            {
                warn!(customer_id = %customer.id, error = ?err, "paypal: copying billing address failed");
            }
        }

        let country = details
            .country_code
            .clone()
            .filter(|country| !country.is_empty());
        let compatible = country.as_deref().is_some_and(|country| {
            services
                .currencies
                .is_currency_compatible_with_country(currency, country)
        });
        let Some(country_code) = country.filter(|_| compatible) else {
            info!(%uid, %agreement_id, %currency, country = ?details.country_code, "paypal: agreement country does not fit currency");
            roll_back(services, abandon_agreement, "verify_billing_agreement").await?;
            return Err(SubscriptionError::CurrencyCountryMismatch {
                currency: currency.to_string(),
                country: details.country_code.unwrap_or_default(),
            });
        };

        if let Err(err) = services
            .agreement_records
            .create_paypal_ba(uid, &agreement_id, BillingAgreementStatus::Active)
            .await
        {
            info!(%uid, %agreement_id, error = %err, "paypal: agreement record not stored, continuing");
        }

        Ok(VerifiedAgreement {
            agreement_id,
            country_code,
        })
    }

    pub async fn update_paypal_billing_agreement(
        &self,
        request: &RequestContext,
        payload: UpdateBillingAgreementRequest,
    ) -> UseCaseResult<FilteredCustomer> {
        let services = self.services.as_ref();
        let user = authorize(services, request, "updatePaypalBillingAgreement").await?;
        let customer = require_customer(
            services,
            &user.uid,
            vec![CustomerExpand::Subscriptions, CustomerExpand::Tax],
        )
        .await?;

        if customer.paypal_agreement().is_some() {
            return Err(SubscriptionError::BillingAgreementAlreadyExists {
                customer_id: customer.id.clone(),
            });
        }
        if !customer.has_paypal_subscription() {
            return Err(SubscriptionError::internal_validation(
                "update_paypal_billing_agreement",
                "customer has no PayPal subscription",
            ));
        }
        let Some(currency) = customer.currency.clone() else {
            return Err(SubscriptionError::internal_validation(
                "update_paypal_billing_agreement",
                "customer has no currency",
            ));
        };
        if payload.token.is_empty() {
            return Err(SubscriptionError::MissingPaymentToken {
                customer_id: customer.id.clone(),
            });
        }

        let verified = self
            .create_and_verify_agreement(
                request,
                &user.uid,
                &customer,
                &payload.token,
                &currency,
                automatic_tax_applies(services, &customer),
            )
            .await?;

        let customer = match services
            .customers
            .update_customer_paypal_agreement(&customer, &verified.agreement_id)
            .await
        {
            Ok(customer) => customer,
            Err(err) => {
                error!(customer_id = %customer.id, error = ?err, "paypal: attaching agreement failed");
                let rollback = Rollback {
                    agreement_id: Some(&verified.agreement_id),
                    ..Rollback::default()
                };
                roll_back(services, rollback, "update_paypal_billing_agreement").await?;
                return Err(SubscriptionError::Upstream(err));
            }
        };

        let open_invoices = services
            .subscriptions
            .fetch_open_invoices(&customer.id, Utc::now().timestamp())
            .await
            .map_err(|err| {
                error!(customer_id = %customer.id, error = ?err, "paypal: listing open invoices failed");
                SubscriptionError::Upstream(err)
            })?;
        let pending = open_invoices.len();
        for invoice in open_invoices {
            // detached; outcomes reach the reporter only
            drop(
                self.settlement
                    .submit(customer.clone(), invoice, client_ip(request)),
            );
        }

        customer_changed(services, &user.uid).await;
        info!(uid = %user.uid, customer_id = %customer.id, pending, "paypal: billing agreement replaced");
        Ok(FilteredCustomer::from(&customer))
    }
}
