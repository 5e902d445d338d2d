use std::sync::Arc;

use crates::domain::{
    entities::{
        customers::{CustomerEntity, CustomerExpand},
        payment_methods::PaymentMethodEntity,
        subscriptions::SubscriptionEntity,
    },
    value_objects::{
        addresses::is_address_lookup_country,
        diagnostics::DiagnosticReport,
        enums::subscription_statuses::SubscriptionStatus,
        iam::{AuthenticatedUser, RequestContext},
        subscriptions::{
            ActiveSubscription, CreateCustomerRequest, CreateSubscriptionWithPmiRequest,
            FilteredCustomer, FilteredInvoice, FilteredSubscription, NewPmiSubscription,
            PaymentMethodIdResponse, PaymentMethodRequest, RetryInvoiceRequest,
            SubscriptionCreated, SubscriptionIdRequest, SubscriptionIdResponse,
            UpdateSubscriptionRequest,
        },
    },
};
use sha2::{Digest, Sha256};
use tracing::{error, info, warn};

use super::{
    account_cleanup::finish_with_stub_cleanup,
    catalog::{extract_promotion_code, require_plan},
    customer_resolution::{
        authenticate, authorize, fetch_customer, require_customer, stored_customer_id,
    },
    eligibility::ensure_eligible,
    errors::{SubscriptionError, UseCaseResult},
    notifications::{customer_changed, send_finish_setup_email_for_stub_account},
    services::BillingServices,
    tax::{automatic_tax_applies, tax_options},
};

/// Idempotency key for customer creation; one customer per account.
pub fn customer_idempotency_key(uid: &str) -> String {
    hex::encode(Sha256::digest(uid.as_bytes()))
}

pub fn retry_idempotency_key(key: &str) -> String {
    format!("{key}-retryInvoice")
}

fn find_customer_subscription<'a>(
    customer: &'a CustomerEntity,
    subscription_id: &str,
) -> UseCaseResult<&'a SubscriptionEntity> {
    customer
        .find_subscription(subscription_id)
        .ok_or_else(|| SubscriptionError::UnknownSubscription {
            subscription_id: subscription_id.to_string(),
        })
}

fn upstream(context: &'static str) -> impl Fn(anyhow::Error) -> SubscriptionError {
    move |err| {
        error!(context, error = ?err, "subscriptions: provider call failed");
        SubscriptionError::Upstream(err)
    }
}

pub struct StripeCheckoutUseCase {
    services: Arc<BillingServices>,
}

impl StripeCheckoutUseCase {
    pub fn new(services: Arc<BillingServices>) -> Self {
        Self { services }
    }

    pub async fn create_subscription_with_pmi(
        &self,
        request: &RequestContext,
        payload: CreateSubscriptionWithPmiRequest,
    ) -> UseCaseResult<SubscriptionCreated> {
        let user = authorize(&self.services, request, "createSubscriptionWithPMI").await?;
        info!(uid = %user.uid, price_id = %payload.price_id, "subscriptions: create subscription requested");

        let result = self.create_for_user(&user, payload).await;
        if let Err(err) = &result {
            warn!(
                uid = %user.uid,
                status = err.status_code().as_u16(),
                errno = err.errno(),
                error = %err,
                "subscriptions: create subscription failed"
            );
        }
        finish_with_stub_cleanup(&self.services, &user, result).await
    }

    async fn create_for_user(
        &self,
        user: &AuthenticatedUser,
        payload: CreateSubscriptionWithPmiRequest,
    ) -> UseCaseResult<SubscriptionCreated> {
        let services = self.services.as_ref();
        let customer = require_customer(
            services,
            &user.uid,
            vec![CustomerExpand::Subscriptions, CustomerExpand::Tax],
        )
        .await?;
        let plan = require_plan(services, &payload.price_id).await?;

        let payment_method = match payload.payment_method_id.as_deref() {
            Some(id) => Some(
                services
                    .payment_methods
                    .get_payment_method(id)
                    .await
                    .map_err(upstream("get_payment_method"))?,
            ),
            None => None,
        };
        let card_country = payment_method
            .as_ref()
            .and_then(|method| method.card_country.clone());
        if payment_method.is_some() {
            let country = card_country.clone().unwrap_or_default();
            if !services
                .currencies
                .is_currency_compatible_with_country(&plan.currency, &country)
            {
                return Err(SubscriptionError::CurrencyCountryMismatch {
                    currency: plan.currency.clone(),
                    country,
                });
            }
        }

        ensure_eligible(services, &user.uid, &customer, &plan).await?;
        let promotion =
            extract_promotion_code(services, payload.promotion_code.as_deref(), &plan).await?;
        let tax = tax_options(services, &customer, &plan.currency, card_country.as_deref()).await?;

        if let Some(incomplete) = customer.find_incomplete_subscription_for_price(&plan.plan_id) {
            info!(
                uid = %user.uid,
                subscription_id = %incomplete.id,
                "subscriptions: cancelling incomplete subscription for the same price"
            );
            services
                .subscriptions
                .cancel_subscription(&incomplete.id)
                .await
                .map_err(upstream("cancel_incomplete_subscription"))?;
        }

        let subscription = services
            .subscriptions
            .create_subscription_with_pmi(&NewPmiSubscription {
                customer_id: customer.id.clone(),
                price_id: plan.plan_id.clone(),
                payment_method_id: payload.payment_method_id.clone(),
                promotion_code_id: promotion.map(|promotion| promotion.id),
                idempotency_key: payload.idempotency_key.clone(),
                tax,
            })
            .await
            .map_err(upstream("create_subscription_with_pmi"))?;

        let source_country = card_country.or_else(|| subscription.source_country());
        if !services.settings.automatic_tax {
            self.update_customer_location(
                &customer.id,
                source_country.as_deref(),
                payment_method.as_ref(),
            )
            .await;
        }

        customer_changed(services, &user.uid).await;
        send_finish_setup_email_for_stub_account(services, user, &plan, payload.metrics_context)
            .await;

        info!(
            uid = %user.uid,
            subscription_id = %subscription.id,
            status = %subscription.status,
            "subscriptions: subscription created"
        );
        Ok(SubscriptionCreated {
            source_country,
            subscription: FilteredSubscription::from(&subscription),
        })
    }

    /// Best effort; the card's postal code places US and CA customers for tax.
    async fn update_customer_location(
        &self,
        customer_id: &str,
        source_country: Option<&str>,
        payment_method: Option<&PaymentMethodEntity>,
    ) {
        let Some(country) = source_country.filter(|country| is_address_lookup_country(country))
        else {
            return;
        };
        let Some(method) = payment_method else {
            return;
        };
        let postal_code = method
            .billing_postal_code
            .as_deref()
            .filter(|code| !code.is_empty());
        let Some(postal_code) = postal_code else {
            self.services.reporter.report(
                DiagnosticReport::new("customer_location", "Credit-card without postal code")
                    .with_field("customer_id", customer_id)
                    .with_field("payment_method_id", method.id.clone()),
            );
            return;
        };

        match self
            .services
            .customers
            .set_customer_location(customer_id, country, postal_code)
            .await
        {
            Ok(true) => info!(%customer_id, %country, "subscriptions: customer location set"),
            Ok(false) => warn!(%customer_id, %country, "subscriptions: postal code not recognized"),
            Err(err) => warn!(%customer_id, error = ?err, "subscriptions: setting customer location failed"),
        }
    }

    pub async fn list_active(
        &self,
        request: &RequestContext,
    ) -> UseCaseResult<Vec<ActiveSubscription>> {
        let user = authenticate(&self.services, request).await?;
        let Some(customer) =
            fetch_customer(&self.services, &user.uid, vec![CustomerExpand::Subscriptions]).await?
        else {
            return Ok(Vec::new());
        };

        customer
            .active_subscriptions()
            .map(|subscription| -> UseCaseResult<ActiveSubscription> {
                let item = subscription.single_plan().ok_or_else(|| {
                    SubscriptionError::MultiPlanSubscriptionUnsupported {
                        subscription_id: subscription.id.clone(),
                    }
                })?;
                Ok(ActiveSubscription {
                    uid: user.uid.clone(),
                    subscription_id: subscription.id.clone(),
                    product_id: item.product_id.clone(),
                    created_at_ms: subscription.created * 1000,
                    cancelled_at_ms: subscription.canceled_at.map(|at| at * 1000),
                })
            })
            .collect()
    }

    pub async fn create_customer(
        &self,
        request: &RequestContext,
        payload: CreateCustomerRequest,
    ) -> UseCaseResult<FilteredCustomer> {
        let services = self.services.as_ref();
        let user = authorize(services, request, "createCustomer").await?;

        if let Some(existing) =
            fetch_customer(services, &user.uid, vec![CustomerExpand::Subscriptions]).await?
        {
            info!(uid = %user.uid, customer_id = %existing.id, "subscriptions: customer already exists");
            return Ok(FilteredCustomer::from(&existing));
        }

        let client_address = services
            .settings
            .automatic_tax
            .then(|| request.client_address.clone());
        let customer = services
            .customers
            .create_plain_customer(
                &user.uid,
                &user.email,
                payload.display_name,
                &customer_idempotency_key(&user.uid),
                client_address,
            )
            .await
            .map_err(upstream("create_plain_customer"))?;

        info!(uid = %user.uid, customer_id = %customer.id, "subscriptions: customer created");
        Ok(FilteredCustomer::from(&customer))
    }

    pub async fn retry_invoice(
        &self,
        request: &RequestContext,
        payload: RetryInvoiceRequest,
    ) -> UseCaseResult<FilteredInvoice> {
        let services = self.services.as_ref();
        let user = authorize(services, request, "retryInvoice").await?;
        let customer_id = stored_customer_id(services, &user.uid).await?;

        let invoice = services
            .subscriptions
            .retry_invoice_with_payment_id(
                &customer_id,
                &payload.invoice_id,
                &payload.payment_method_id,
                &retry_idempotency_key(&payload.idempotency_key),
            )
            .await
            .map_err(upstream("retry_invoice_with_payment_id"))?;

        customer_changed(services, &user.uid).await;
        Ok(FilteredInvoice::from(&invoice))
    }

    pub async fn delete_subscription(
        &self,
        request: &RequestContext,
        payload: SubscriptionIdRequest,
    ) -> UseCaseResult<SubscriptionIdResponse> {
        let services = self.services.as_ref();
        let user = authorize(services, request, "deleteSubscription").await?;
        let customer =
            require_customer(services, &user.uid, vec![CustomerExpand::Subscriptions]).await?;
        let subscription = find_customer_subscription(&customer, &payload.subscription_id)?;

        if !subscription.cancel_at_period_end {
            services
                .subscriptions
                .set_cancel_at_period_end(&subscription.id, true)
                .await
                .map_err(upstream("cancel_at_period_end"))?;
        }

        customer_changed(services, &user.uid).await;
        info!(uid = %user.uid, subscription_id = %subscription.id, "subscriptions: cancelled at period end");
        Ok(SubscriptionIdResponse {
            subscription_id: subscription.id.clone(),
        })
    }

    pub async fn reactivate_subscription(
        &self,
        request: &RequestContext,
        payload: SubscriptionIdRequest,
    ) -> UseCaseResult<SubscriptionIdResponse> {
        let services = self.services.as_ref();
        let user = authorize(services, request, "reactivateSubscription").await?;
        let customer =
            require_customer(services, &user.uid, vec![CustomerExpand::Subscriptions]).await?;
        let subscription = find_customer_subscription(&customer, &payload.subscription_id)?;

        if !subscription.status.is_active() {
            return Err(SubscriptionError::internal_validation(
                "reactivate_subscription",
                format!(
                    "subscription {} is {} and cannot be reactivated",
                    subscription.id, subscription.status
                ),
            ));
        }

        services
            .subscriptions
            .set_cancel_at_period_end(&subscription.id, false)
            .await
            .map_err(upstream("reactivate_subscription"))?;

        customer_changed(services, &user.uid).await;
        Ok(SubscriptionIdResponse {
            subscription_id: subscription.id.clone(),
        })
    }

    pub async fn update_subscription(
        &self,
        request: &RequestContext,
        payload: UpdateSubscriptionRequest,
    ) -> UseCaseResult<SubscriptionIdResponse> {
        let services = self.services.as_ref();
        let user = authorize(services, request, "updateSubscription").await?;
        let customer =
            require_customer(services, &user.uid, vec![CustomerExpand::Subscriptions]).await?;
        let subscription = find_customer_subscription(&customer, &payload.subscription_id)?;
        let current_item = subscription.single_plan().ok_or_else(|| {
            SubscriptionError::MultiPlanSubscriptionUnsupported {
                subscription_id: subscription.id.clone(),
            }
        })?;

        let current_plan = require_plan(services, &current_item.price_id).await?;
        let new_plan = require_plan(services, &payload.plan_id).await?;
        if current_plan.plan_id == new_plan.plan_id
            || !new_plan.shares_product_set_with(current_plan.product_set.as_deref())
        {
            return Err(SubscriptionError::InvalidPlanUpdate {
                from: current_plan.plan_id,
                to: new_plan.plan_id,
            });
        }

        if let Some(current) = customer.currency.as_deref() {
            if !current.eq_ignore_ascii_case(&new_plan.currency) {
                return Err(SubscriptionError::CurrencyCurrencyMismatch {
                    current: current.to_string(),
                    requested: new_plan.currency,
                });
            }
        }

        services
            .subscriptions
            .change_subscription_plan(subscription, &new_plan.plan_id)
            .await
            .map_err(upstream("change_subscription_plan"))?;

        customer_changed(services, &user.uid).await;
        info!(
            uid = %user.uid,
            subscription_id = %subscription.id,
            from = %current_plan.plan_id,
            to = %new_plan.plan_id,
            "subscriptions: plan changed"
        );
        Ok(SubscriptionIdResponse {
            subscription_id: subscription.id.clone(),
        })
    }

    pub async fn update_default_payment_method(
        &self,
        request: &RequestContext,
        payload: PaymentMethodRequest,
    ) -> UseCaseResult<FilteredCustomer> {
        let services = self.services.as_ref();
        let user = authorize(services, request, "updateDefaultPaymentMethod").await?;
        let customer = require_customer(
            services,
            &user.uid,
            vec![CustomerExpand::Subscriptions, CustomerExpand::Tax],
        )
        .await?;
        let payment_method = services
            .payment_methods
            .get_payment_method(&payload.payment_method_id)
            .await
            .map_err(upstream("get_payment_method"))?;

        if let Some(currency) = customer.currency.as_deref() {
            let country = payment_method.card_country.clone().unwrap_or_default();
            if !services
                .currencies
                .is_currency_compatible_with_country(currency, &country)
            {
                return Err(SubscriptionError::CurrencyCountryMismatch {
                    currency: currency.to_string(),
                    country,
                });
            }
        }

        let updated = services
            .customers
            .update_default_payment_method(&customer.id, &payment_method.id)
            .await
            .map_err(upstream("update_default_payment_method"))?;
        if !automatic_tax_applies(services, &customer) {
            self.update_customer_location(
                &customer.id,
                payment_method.card_country.as_deref(),
                Some(&payment_method),
            )
            .await;
        }
        services
            .customers
            .remove_sources(&customer.id)
            .await
            .map_err(upstream("remove_sources"))?;

        customer_changed(services, &user.uid).await;
        Ok(FilteredCustomer::from(&updated))
    }

    /// Detaches a card that never paid; customers with a working subscription keep theirs.
    pub async fn detach_failed_payment_method(
        &self,
        request: &RequestContext,
        payload: PaymentMethodRequest,
    ) -> UseCaseResult<PaymentMethodIdResponse> {
        let services = self.services.as_ref();
        let user = authorize(services, request, "detachFailedPaymentMethod").await?;
        let customer =
            require_customer(services, &user.uid, vec![CustomerExpand::Subscriptions]).await?;

        let only_incomplete = customer
            .subscriptions
            .iter()
            .all(|subscription| subscription.status == SubscriptionStatus::Incomplete);
        if only_incomplete {
            services
                .payment_methods
                .detach_payment_method(&payload.payment_method_id)
                .await
                .map_err(upstream("detach_payment_method"))?;
            info!(uid = %user.uid, payment_method_id = %payload.payment_method_id, "subscriptions: failed payment method detached");
        }

        customer_changed(services, &user.uid).await;
        Ok(PaymentMethodIdResponse {
            id: payload.payment_method_id,
        })
    }
}
