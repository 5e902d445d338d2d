use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub database: Database,
    pub stripe: Stripe,
    pub paypal: Paypal,
    pub auth: Auth,
    pub services: CollaboratorServices,
    /// Uppercase currency -> countries allowed to pay in it.
    pub currency_countries: Option<HashMap<String, Vec<String>>>,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct Stripe {
    pub secret_key: String,
    pub api_base: String,
    pub automatic_tax: bool,
    pub tax_ids: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct Paypal {
    pub user: String,
    pub password: String,
    pub signature: String,
    pub return_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone)]
pub struct Auth {
    pub jwt_secret: String,
    pub audience: String,
}

#[derive(Debug, Clone)]
pub struct CollaboratorServices {
    pub customs_url: String,
    pub profile_url: String,
    pub push_url: String,
    pub mailer_url: String,
    pub auth_secret: String,
    pub timeout_secs: u64,
}
