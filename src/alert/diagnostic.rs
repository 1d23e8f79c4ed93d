//! Context-carrying diagnostic logger

use std::fmt;

/// Logger value that carries key/value context into every record.
///
/// `with_context` returns a new value; the receiver is left untouched so a
/// service-wide diagnostic can be specialised per handler.
#[derive(Debug, Clone, Default)]
pub struct Diagnostic {
    context: Vec<(String, String)>,
}

impl Diagnostic {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a diagnostic with additional context tags
    pub fn with_context<K, V>(&self, ctx: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let context: Vec<(String, String)> = self
            .context
            .iter()
            .cloned()
            .chain(ctx.into_iter().map(|(k, v)| (k.into(), v.into())))
            .collect();
        Self { context }
    }

    pub fn context(&self) -> &[(String, String)] {
        &self.context
    }

    pub fn error(&self, msg: &str, err: &dyn std::error::Error) {
        tracing::error!(context = %self, error = %err, "{}", msg);
    }

    pub fn info(&self, msg: &str) {
        tracing::info!(context = %self, "{}", msg);
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.context.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        Ok(())
    }
}
