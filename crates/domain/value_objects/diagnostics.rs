use std::collections::BTreeMap;

/// An error that nobody is waiting for, handed to the diagnostic sink.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiagnosticReport {
    pub context: String,
    pub message: String,
    pub fields: BTreeMap<String, String>,
}

impl DiagnosticReport {
    pub fn new(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}
