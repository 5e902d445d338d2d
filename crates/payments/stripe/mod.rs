mod catalog;
pub mod client;
mod customers;
mod invoices;
mod subscriptions;
pub(crate) mod types;

pub use client::{DEFAULT_API_BASE, StripeApiError, StripeClient};
