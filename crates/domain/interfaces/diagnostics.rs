use mockall::automock;

use crate::domain::value_objects::diagnostics::DiagnosticReport;

/// Sink for failures that have no caller to return to.
#[automock]
pub trait ErrorReporter: Send + Sync {
    fn report(&self, report: DiagnosticReport);
}
