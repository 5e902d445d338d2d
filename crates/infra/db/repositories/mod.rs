pub mod account_customers;
pub mod accounts;
pub mod customers;
pub mod external_entitlements;
pub mod paypal_billing_agreements;
