use crates::domain::{entities::customers::CustomerEntity, value_objects::tax::TaxOptions};
use tracing::{error, warn};

use super::{
    errors::{SubscriptionError, UseCaseResult},
    services::BillingServices,
};

/// Provider-computed tax is used only for customers in a supported location.
pub fn automatic_tax_applies(services: &BillingServices, customer: &CustomerEntity) -> bool {
    services.settings.automatic_tax && customer.is_automatic_tax_supported()
}

/// Picks the tax mode for a new subscription.
///
/// With automatic tax switched off the legacy path applies: the customer gets a tax id
/// for `currency` if it has none, and the tax rate comes from `payment_country`.
pub async fn tax_options(
    services: &BillingServices,
    customer: &CustomerEntity,
    currency: &str,
    payment_country: Option<&str>,
) -> UseCaseResult<TaxOptions> {
    if services.settings.automatic_tax {
        let enabled = customer.is_automatic_tax_supported();
        if !enabled {
            warn!(
                customer_id = %customer.id,
                automatic_tax = ?customer.tax.automatic_tax,
                "tax: automatic tax is on but the customer location is not supported"
            );
        }
        return Ok(TaxOptions::Automatic { enabled });
    }

    let Some(country) = payment_country else {
        return Ok(TaxOptions::Manual { tax_rate_id: None });
    };

    if !customer.has_tax_id() {
        services
            .customers
            .add_tax_id_to_customer(customer, currency)
            .await
            .map_err(|err| {
                error!(customer_id = %customer.id, %currency, error = ?err, "tax: failed to add tax id");
                SubscriptionError::Upstream(err)
            })?;
    }

    let rate = services
        .tax_rates
        .tax_rate_by_country_code(country)
        .await
        .map_err(|err| {
            error!(%country, error = ?err, "tax: failed to look up tax rate");
            SubscriptionError::Upstream(err)
        })?;

    Ok(TaxOptions::Manual {
        tax_rate_id: rate.map(|rate| rate.id),
    })
}

#[cfg(test)]
mod tests {
    use crates::domain::{
        entities::{customers::CustomerTax, tax_rates::TaxRateEntity},
        value_objects::enums::automatic_tax_statuses::AutomaticTaxStatus,
    };
    use mockall::predicate::eq;

    use super::*;
    use crate::usecases::{services::CheckoutSettings, test_support::{Mocks, customer}};

    #[tokio::test]
    async fn automatic_mode_never_touches_tax_rates() {
        let mut mocks = Mocks::new();
        mocks.settings = CheckoutSettings { automatic_tax: true };
        mocks.tax_rates.expect_tax_rate_by_country_code().never();
        mocks.customers.expect_add_tax_id_to_customer().never();
        let services = mocks.into_services();

        let mut supported = customer("cus_1");
        supported.tax = CustomerTax {
            automatic_tax: Some(AutomaticTaxStatus::Supported),
            ip_address: None,
        };

        let options = tax_options(&services, &supported, "usd", Some("US")).await.unwrap();
        assert!(options.is_automatic());
        assert!(automatic_tax_applies(&services, &supported));

        let unrecognized = customer("cus_2");
        let options = tax_options(&services, &unrecognized, "usd", Some("US")).await.unwrap();
        assert_eq!(options, TaxOptions::Automatic { enabled: false });
    }

    #[tokio::test]
    async fn manual_mode_adds_tax_id_and_uses_country_rate() {
        let mut mocks = Mocks::new();
        mocks
            .customers
            .expect_add_tax_id_to_customer()
            .withf(|customer, currency| customer.id == "cus_1" && currency == "eur")
            .times(1)
            .returning(|_, _| Ok(()));
        mocks
            .tax_rates
            .expect_tax_rate_by_country_code()
            .with(eq("DE"))
            .returning(|country| {
                Ok(Some(TaxRateEntity {
                    id: "txr_de".into(),
                    country: country.to_string(),
                    percentage: 19.0,
                }))
            });
        let services = mocks.into_services();

        let options = tax_options(&services, &customer("cus_1"), "eur", Some("DE"))
            .await
            .unwrap();

        assert_eq!(
            options,
            TaxOptions::Manual {
                tax_rate_id: Some("txr_de".into())
            }
        );
    }

    #[tokio::test]
    async fn manual_mode_without_country_has_no_rate() {
        let mut mocks = Mocks::new();
        mocks.customers.expect_add_tax_id_to_customer().never();
        let services = mocks.into_services();

        let options = tax_options(&services, &customer("cus_1"), "usd", None).await.unwrap();

        assert_eq!(options, TaxOptions::Manual { tax_rate_id: None });
    }
}
