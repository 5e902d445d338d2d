pub mod billing_agreements;
pub mod currencies;
pub mod customs;
pub mod diagnostics;
pub mod identity;
pub mod invoice_processing;
pub mod mailer;
pub mod profile;
pub mod push;
