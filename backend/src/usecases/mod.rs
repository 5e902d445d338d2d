pub mod account_cleanup;
pub mod catalog;
pub mod compensation;
pub mod customer_resolution;
pub mod eligibility;
pub mod errors;
pub mod invoice_settlement;
pub mod notifications;
pub mod paypal_checkout;
pub mod services;
pub mod stripe_checkout;
pub mod tax;

#[cfg(test)]
pub(crate) mod test_support;
