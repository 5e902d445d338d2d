pub mod customs_client;
pub mod http_support;
pub mod mailer_client;
pub mod profile_client;
pub mod push_client;
