use std::collections::HashMap;

use anyhow::{Context, Result};
use crates::payments::stripe::DEFAULT_API_BASE;

use super::{
    config_model::{Auth, CollaboratorServices, Database, DotEnvyConfig, Paypal, Stripe},
    stage::Stage,
};

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("{key} is invalid"))
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn flag(key: &str) -> Result<bool> {
    match optional(key) {
        None => Ok(false),
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => anyhow::bail!("{key} is invalid: expected a boolean, got {raw}"),
        },
    }
}

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let database = Database {
        url: required("DATABASE_URL")?,
        max_connections: optional("DATABASE_MAX_CONNECTIONS")
            .map(|raw| raw.parse())
            .transpose()
            .context("DATABASE_MAX_CONNECTIONS is invalid")?
            .unwrap_or(10),
    };

    let stripe = Stripe {
        secret_key: required("STRIPE_SECRET_KEY")?,
        api_base: optional("STRIPE_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        automatic_tax: flag("STRIPE_AUTOMATIC_TAX_ENABLED")?,
        tax_ids: optional("STRIPE_TAX_IDS")
            .map(|raw| serde_json::from_str::<HashMap<String, String>>(&raw))
            .transpose()
            .context("STRIPE_TAX_IDS is invalid")?
            .unwrap_or_default(),
    };

    let paypal = Paypal {
        user: required("PAYPAL_NVP_USER")?,
        password: required("PAYPAL_NVP_PASSWORD")?,
        signature: required("PAYPAL_NVP_SIGNATURE")?,
        return_url: required("PAYPAL_RETURN_URL")?,
        cancel_url: required("PAYPAL_CANCEL_URL")?,
    };

    let auth = Auth {
        jwt_secret: required("AUTH_JWT_SECRET")?,
        audience: optional("AUTH_JWT_AUDIENCE").unwrap_or_else(|| "subscriptions".to_string()),
    };

    let services = CollaboratorServices {
        customs_url: required("CUSTOMS_SERVICE_URL")?,
        profile_url: required("PROFILE_SERVICE_URL")?,
        push_url: required("PUSH_SERVICE_URL")?,
        mailer_url: required("MAILER_SERVICE_URL")?,
        auth_secret: required("SERVICES_AUTH_SECRET")?,
        timeout_secs: optional("SERVICES_TIMEOUT_SECS")
            .map(|raw| raw.parse())
            .transpose()
            .context("SERVICES_TIMEOUT_SECS is invalid")?
            .unwrap_or(5),
    };

    let currency_countries = optional("CURRENCY_COUNTRIES")
        .map(|raw| serde_json::from_str(&raw))
        .transpose()
        .context("CURRENCY_COUNTRIES is invalid")?;

    Ok(DotEnvyConfig {
        database,
        stripe,
        paypal,
        auth,
        services,
        currency_countries,
    })
}

pub fn get_stage() -> Stage {
    dotenvy::dotenv().ok();

    let stage_str = std::env::var("STAGE").unwrap_or_default();
    Stage::try_from(&stage_str).unwrap_or_default()
}
