use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use super::{
    client::{FormBody, StripeClient, expand_params, field},
    types::{StripeInvoice, StripeList, StripeSubscription},
};
use crate::domain::{
    entities::{invoices::InvoiceEntity, subscriptions::SubscriptionEntity},
    repositories::subscriptions::SubscriptionLifecycle,
    value_objects::{
        subscriptions::{NewPaypalSubscription, NewPmiSubscription},
        tax::TaxOptions,
    },
};

const SUBSCRIPTION_EXPANSION: [&str; 1] = ["latest_invoice.payment_intent.payment_method"];
/// Billing-agreement invoices are charged by us right away; the due date only bounds retries.
const DAYS_UNTIL_DUE: u32 = 1;

fn tax_params(tax: &TaxOptions) -> FormBody {
    match tax {
        TaxOptions::Automatic { enabled } => vec![field("automatic_tax[enabled]", enabled)],
        TaxOptions::Manual {
            tax_rate_id: Some(id),
        } => vec![field("default_tax_rates[0]", id)],
        TaxOptions::Manual { tax_rate_id: None } => Vec::new(),
    }
}

fn pmi_subscription_body(subscription: &NewPmiSubscription) -> FormBody {
    let mut body = vec![
        field("customer", &subscription.customer_id),
        field("items[0][price]", &subscription.price_id),
        field("payment_behavior", "allow_incomplete"),
    ];
    if let Some(method) = &subscription.payment_method_id {
        body.push(field("default_payment_method", method));
    }
    if let Some(promotion_code) = &subscription.promotion_code_id {
        body.push(field("promotion_code", promotion_code));
    }
    body.extend(tax_params(&subscription.tax));
    body.extend(expand_params(SUBSCRIPTION_EXPANSION));
    body
}

fn paypal_subscription_body(subscription: &NewPaypalSubscription) -> FormBody {
    let mut body = vec![
        field("customer", &subscription.customer_id),
        field("items[0][price]", &subscription.price_id),
        field("collection_method", "send_invoice"),
        field("days_until_due", DAYS_UNTIL_DUE),
    ];
    if let Some(promotion_code) = &subscription.promotion_code_id {
        body.push(field("promotion_code", promotion_code));
    }
    body.extend(tax_params(&subscription.tax));
    body.extend(expand_params(["latest_invoice"]));
    body
}

#[async_trait]
impl SubscriptionLifecycle for StripeClient {
    async fn create_subscription_with_pmi(
        &self,
        subscription: &NewPmiSubscription,
    ) -> Result<SubscriptionEntity> {
        let created: StripeSubscription = self
            .post(
                "/v1/subscriptions",
                &pmi_subscription_body(subscription),
                Some(&subscription.idempotency_key),
                "create subscription with payment method",
            )
            .await?;

        info!(
            customer_id = %subscription.customer_id,
            subscription_id = %created.id,
            status = %created.status,
            "stripe: subscription created"
        );
        Ok(created.into())
    }

    async fn create_subscription_with_paypal(
        &self,
        subscription: &NewPaypalSubscription,
    ) -> Result<SubscriptionEntity> {
        let created: StripeSubscription = self
            .post(
                "/v1/subscriptions",
                &paypal_subscription_body(subscription),
                Some(&subscription.idempotency_key),
                "create invoiced subscription",
            )
            .await?;

        info!(
            customer_id = %subscription.customer_id,
            subscription_id = %created.id,
            "stripe: invoiced subscription created"
        );
        Ok(created.into())
    }

    async fn cancel_subscription(&self, subscription_id: &str) -> Result<()> {
        // https://stripe.com/docs/api/subscriptions/cancel
        let _: StripeSubscription = self
            .delete(
                &format!("/v1/subscriptions/{subscription_id}"),
                "cancel subscription",
            )
            .await?;
        Ok(())
    }

    async fn set_cancel_at_period_end(
        &self,
        subscription_id: &str,
        cancel_at_period_end: bool,
    ) -> Result<SubscriptionEntity> {
        let body = vec![field("cancel_at_period_end", cancel_at_period_end)];
        let updated: StripeSubscription = self
            .post(
                &format!("/v1/subscriptions/{subscription_id}"),
                &body,
                None,
                "update cancel at period end",
            )
            .await?;
        Ok(updated.into())
    }

    async fn change_subscription_plan(
        &self,
        subscription: &SubscriptionEntity,
        new_price_id: &str,
    ) -> Result<SubscriptionEntity> {
        let item_id = subscription
            .single_plan()
            .map(|item| item.id.clone())
            .ok_or_else(|| anyhow::anyhow!("subscription {} has several items", subscription.id))?;

        let body = vec![
            field("items[0][id]", item_id),
            field("items[0][price]", new_price_id),
            field("proration_behavior", "always_invoice"),
            field("cancel_at_period_end", false),
        ];
        let updated: StripeSubscription = self
            .post(
                &format!("/v1/subscriptions/{}", subscription.id),
                &body,
                None,
                "change subscription plan",
            )
            .await?;
        Ok(updated.into())
    }

    async fn retry_invoice_with_payment_id(
        &self,
        customer_id: &str,
        invoice_id: &str,
        payment_method_id: &str,
        idempotency_key: &str,
    ) -> Result<InvoiceEntity> {
        let _: serde_json::Value = self
            .post(
                &format!("/v1/payment_methods/{payment_method_id}/attach"),
                &vec![field("customer", customer_id)],
                None,
                "attach payment method",
            )
            .await?;

        self.set_default_payment_method(customer_id, payment_method_id)
            .await?;

        let mut body = vec![field("payment_method", payment_method_id)];
        body.extend(expand_params(["payment_intent.payment_method"]));
        let invoice: StripeInvoice = self
            .post(
                &format!("/v1/invoices/{invoice_id}/pay"),
                &body,
                Some(idempotency_key),
                "pay invoice",
            )
            .await?;
        Ok(invoice.into())
    }

    async fn fetch_open_invoices(
        &self,
        customer_id: &str,
        created_before_secs: i64,
    ) -> Result<Vec<InvoiceEntity>> {
        let mut invoices = Vec::new();
        let mut starting_after: Option<String> = None;

        loop {
            let mut query = vec![
                field("customer", customer_id),
                field("status", "open"),
                field("created[lte]", created_before_secs),
                field("limit", 100),
            ];
            if let Some(cursor) = &starting_after {
                query.push(field("starting_after", cursor));
            }

            let page: StripeList<StripeInvoice> =
                self.get("/v1/invoices", &query, "list open invoices").await?;
            starting_after = page.data.last().map(|invoice| invoice.id.clone());
            let has_more = page.has_more;
            invoices.extend(page.data.into_iter().map(InvoiceEntity::from));

            if !has_more || starting_after.is_none() {
                break;
            }
        }

        Ok(invoices)
    }
}
