use std::collections::BTreeMap;

use tracing::error;

use crate::domain::{
    interfaces::diagnostics::ErrorReporter, value_objects::diagnostics::DiagnosticReport,
};

/// Reports through tracing on the `diagnostics` target, which the alert layer forwards.
#[derive(Debug, Default, Clone)]
pub struct TracingErrorReporter;

impl TracingErrorReporter {
    pub fn new() -> Self {
        Self
    }
}

fn render_fields(fields: &BTreeMap<String, String>) -> String {
    fields
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(" ")
}

impl ErrorReporter for TracingErrorReporter {
    fn report(&self, report: DiagnosticReport) {
        error!(
            target: "diagnostics",
            context = %report.context,
            details = %render_fields(&report.fields),
            "{}",
            report.message
        );
    }
}
