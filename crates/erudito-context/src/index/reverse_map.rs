//! Identifier to payload lookup.

/// Payloads ordered by identifier.
///
/// Identifiers are dense and only ever grow, so entry `n` of the arena is the
/// payload of vector `n`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReverseMap {
    payloads: Vec<String>,
}

impl ReverseMap {
    /// Rebuild from persisted payloads.
    pub fn from_payloads(payloads: Vec<String>) -> Self {
        Self { payloads }
    }

    /// Number of recorded payloads.
    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    /// Payload recorded for `id`.
    pub fn get(&self, id: usize) -> Option<&str> {
        self.payloads.get(id).map(String::as_str)
    }

    /// Record payloads for the next identifiers in sequence.
    pub fn extend(&mut self, payloads: Vec<String>) {
        self.payloads.extend(payloads);
    }

    /// All payloads in identifier order.
    pub fn payloads(&self) -> &[String] {
        &self.payloads
    }
}
