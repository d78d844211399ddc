use std::fmt;

use serde::Serialize;

use crate::module_id::ModuleId;

/// A non-fatal finding about one module.
///
/// Diagnostics are logged as they are produced and also returned, so callers can report or
/// assert on them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub module: ModuleId,
    pub message: String,
}

impl Diagnostic {
    pub(crate) fn warn(module: &ModuleId, message: impl Into<String>) -> Self {
        let diagnostic = Self {
            module: module.clone(),
            message: message.into(),
        };
        tracing::warn!(module = %diagnostic.module, "{}", diagnostic.message);
        diagnostic
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "module {}: {}", self.module, self.message)
    }
}
