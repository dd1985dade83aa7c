//! # models::gate
//!
//! Allow/block outcome of a per-cycle gate.  Never cached across cycles.

/// `R` carries why the gate blocked, for the logs and for tests.
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision<R> {
    Allow,
    Block(R),
}

#[cfg(test)]
impl<R> GateDecision<R> {
    #[inline]
    pub fn is_allowed(&self) -> bool {
        matches!(self, GateDecision::Allow)
    }
}
