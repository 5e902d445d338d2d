pub mod account_customers;
pub mod accounts;
pub mod billing_agreements;
pub mod customers;
pub mod external_entitlements;
pub mod invoices;
pub mod payment_methods;
pub mod plans;
pub mod promotion_codes;
pub mod subscriptions;
pub mod tax_rates;
