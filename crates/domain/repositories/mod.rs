pub mod account_customers;
pub mod accounts;
pub mod billing_agreement_records;
pub mod customers;
pub mod external_entitlements;
pub mod payment_methods;
pub mod plans;
pub mod subscriptions;
pub mod tax_rates;
