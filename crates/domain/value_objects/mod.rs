pub mod accounts;
pub mod addresses;
pub mod currencies;
pub mod customs;
pub mod diagnostics;
pub mod enums;
pub mod iam;
pub mod invoices;
pub mod subscriptions;
pub mod tax;
