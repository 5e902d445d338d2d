use anyhow::Result;
use tracing::{info, warn};

use super::{
    client::{FormBody, StripeClient, expand_params, field},
    types::{
        METADATA_PAYPAL_AGREEMENT, METADATA_USER_ID, StripeCustomer, StripeList, StripeSource,
        TAX_ID_FIELD_NAME,
    },
};
use crate::domain::{
    entities::customers::{CustomerEntity, CustomerExpand},
    value_objects::{
        addresses::BillingAddressUpdate, enums::automatic_tax_statuses::AutomaticTaxStatus,
    },
};

fn customer_expansions(expand: &[CustomerExpand]) -> FormBody {
    let mut paths: Vec<&str> = Vec::new();
    for item in expand {
        match item {
            CustomerExpand::Subscriptions => {
                paths.push("subscriptions");
                paths.push("subscriptions.data.latest_invoice");
            }
            CustomerExpand::Tax => paths.push("tax"),
            // Tax ids live on invoice settings, which are always returned.
            CustomerExpand::TaxIds => {}
        }
    }
    expand_params(paths)
}

impl StripeClient {
    /// `None` when the customer was deleted on the provider side.
    pub async fn retrieve_customer(
        &self,
        customer_id: &str,
        expand: &[CustomerExpand],
    ) -> Result<Option<CustomerEntity>> {
        let customer: StripeCustomer = self
            .get(
                &format!("/v1/customers/{customer_id}"),
                &customer_expansions(expand),
                "retrieve customer",
            )
            .await?;

        if customer.deleted {
            warn!(%customer_id, "stripe: customer was deleted");
            return Ok(None);
        }

        Ok(Some(customer.into()))
    }

    pub async fn create_customer(
        &self,
        uid: &str,
        email: &str,
        display_name: Option<String>,
        idempotency_key: &str,
        client_address: Option<String>,
    ) -> Result<CustomerEntity> {
        let mut body = vec![
            field("email", email),
            field(&format!("metadata[{METADATA_USER_ID}]"), uid),
        ];
        if let Some(name) = display_name.filter(|name| !name.trim().is_empty()) {
            body.push(field("name", name));
        }
        if let Some(ip_address) = client_address {
            body.push(field("tax[ip_address]", ip_address));
        }
        body.extend(expand_params(["tax"]));

        let customer: StripeCustomer = self
            .post("/v1/customers", &body, Some(idempotency_key), "create customer")
            .await?;

        info!(%uid, customer_id = %customer.id, "stripe: customer created");
        Ok(customer.into())
    }

    pub async fn update_customer_metadata(
        &self,
        customer_id: &str,
        key: &str,
        value: &str,
    ) -> Result<CustomerEntity> {
        let body = vec![field(&format!("metadata[{key}]"), value)];
        let customer: StripeCustomer = self
            .post(
                &format!("/v1/customers/{customer_id}"),
                &body,
                None,
                "update customer metadata",
            )
            .await?;
        Ok(customer.into())
    }

    pub async fn update_paypal_agreement(
        &self,
        customer_id: &str,
        agreement_id: &str,
    ) -> Result<CustomerEntity> {
        self.update_customer_metadata(customer_id, METADATA_PAYPAL_AGREEMENT, agreement_id)
            .await
    }

    pub async fn update_billing_address(
        &self,
        customer_id: &str,
        address: &BillingAddressUpdate,
    ) -> Result<()> {
        let mut body = FormBody::new();
        let fields = [
            ("name", &address.name),
            ("address[line1]", &address.line1),
            ("address[line2]", &address.line2),
            ("address[city]", &address.city),
            ("address[state]", &address.state),
            ("address[postal_code]", &address.postal_code),
            ("address[country]", &address.country),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                body.push(field(key, value));
            }
        }

        let _: StripeCustomer = self
            .post(
                &format!("/v1/customers/{customer_id}"),
                &body,
                None,
                "update billing address",
            )
            .await?;
        Ok(())
    }

    /// Returns whether automatic tax can place the customer at the new address.
    pub async fn set_location(
        &self,
        customer_id: &str,
        country: &str,
        postal_code: &str,
    ) -> Result<bool> {
        let mut body = vec![
            field("address[country]", country),
            field("address[postal_code]", postal_code),
        ];
        body.extend(expand_params(["tax"]));

        let customer: StripeCustomer = self
            .post(
                &format!("/v1/customers/{customer_id}"),
                &body,
                None,
                "set customer location",
            )
            .await?;

        let located = CustomerEntity::from(customer).tax.automatic_tax
            != Some(AutomaticTaxStatus::UnrecognizedLocation);
        Ok(located)
    }

    pub async fn add_tax_id(&self, customer: &CustomerEntity, currency: &str) -> Result<()> {
        let Some(tax_id) = self.tax_id_for_currency(currency) else {
            warn!(customer_id = %customer.id, %currency, "stripe: no tax id configured for currency");
            return Ok(());
        };

        let body = vec![
            field("invoice_settings[custom_fields][0][name]", TAX_ID_FIELD_NAME),
            field("invoice_settings[custom_fields][0][value]", tax_id),
        ];
        let _: StripeCustomer = self
            .post(
                &format!("/v1/customers/{}", customer.id),
                &body,
                None,
                "add customer tax id",
            )
            .await?;
        Ok(())
    }

    pub async fn set_default_payment_method(
        &self,
        customer_id: &str,
        payment_method_id: &str,
    ) -> Result<CustomerEntity> {
        let mut body = vec![field(
            "invoice_settings[default_payment_method]",
            payment_method_id,
        )];
        body.extend(expand_params(["subscriptions", "tax"]));

        let customer: StripeCustomer = self
            .post(
                &format!("/v1/customers/{customer_id}"),
                &body,
                None,
                "update default payment method",
            )
            .await?;
        Ok(customer.into())
    }

    /// Deletes legacy card sources so only payment methods remain.
    pub async fn remove_customer_sources(&self, customer_id: &str) -> Result<()> {
        let sources: StripeList<StripeSource> = self
            .get(
                &format!("/v1/customers/{customer_id}/sources"),
                &vec![field("limit", 100)],
                "list customer sources",
            )
            .await?;

        for source in sources.data {
            let _: serde_json::Value = self
                .delete(
                    &format!("/v1/customers/{customer_id}/sources/{}", source.id),
                    "delete customer source",
                )
                .await?;
        }
        Ok(())
    }
}
