//! Non-fatal diagnostics collected while synthesizing code.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// One degraded-but-continued defect, such as an empty `allOf`.
pub struct Diagnostic {
    /// Dotted path of the offending node (`User.properties.id`).
    pub location: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

#[derive(Debug, Clone)]
/// Caller-owned sink threaded through synthesis.
///
/// Every recorded diagnostic is also logged with `tracing::warn!` unless the
/// sink is buffered.
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    log: bool,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            log: true,
        }
    }
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink that records without logging; merge it back with [`Diagnostics::absorb`].
    pub fn buffered() -> Self {
        Self {
            entries: Vec::new(),
            log: false,
        }
    }

    pub fn warn(&mut self, location: impl Into<String>, message: impl Into<String>) {
        let diagnostic = Diagnostic {
            location: location.into(),
            message: message.into(),
        };
        self.record(diagnostic);
    }

    /// Moves every entry of `other` into this sink.
    pub fn absorb(&mut self, other: Diagnostics) {
        for diagnostic in other.entries {
            self.record(diagnostic);
        }
    }

    fn record(&mut self, diagnostic: Diagnostic) {
        if self.log {
            tracing::warn!(location = %diagnostic.location, "{}", diagnostic.message);
        }
        self.entries.push(diagnostic);
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::Diagnostics;

    #[test]
    fn absorb_keeps_order() {
        let mut outer = Diagnostics::new();
        outer.warn("A", "first");

        let mut scratch = Diagnostics::buffered();
        scratch.warn("B", "second");
        outer.absorb(scratch);

        let rendered: Vec<String> = outer.entries().iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["A: first", "B: second"]);
    }
}
