pub mod client;
pub mod invoices;
pub mod nvp;

pub use client::{LIVE_NVP_URL, PaypalClient, PaypalCredentials, SANDBOX_NVP_URL};
pub use invoices::PaypalInvoiceProcessor;
pub use nvp::PaypalApiError;
