//! Run-scoped rate-limit suppression

const LOG_TARGET: &str = "rate-limit";

/// One-way switch suppressing further fetches of a resource category.
///
/// Two states, normal and degraded, with a single one-way transition. Once a
/// fetch category observes a rate-limit signal, the remainder of the run uses
/// whatever was accumulated so far plus persisted fallbacks for that category.
#[derive(Debug)]
pub struct RateLimitGate {
    category: &'static str,
    tripped: bool,
}

impl RateLimitGate {
    #[must_use]
    pub const fn new(category: &'static str) -> Self {
        Self {
            category,
            tripped: false,
        }
    }

    /// Enter the degraded state. Idempotent; logs on the first transition.
    pub fn trip(&mut self) {
        if !self.tripped {
            log::warn!(target: LOG_TARGET, "Rate limit hit, suppressing further {} fetches for this run", self.category);
            self.tripped = true;
        }
    }

    #[must_use]
    pub const fn is_tripped(&self) -> bool {
        self.tripped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_normal() {
        let gate = RateLimitGate::new("views");
        assert!(!gate.is_tripped());
    }

    #[test]
    fn test_trip_is_one_way() {
        let mut gate = RateLimitGate::new("views");
        gate.trip();
        assert!(gate.is_tripped());

        gate.trip();
        assert!(gate.is_tripped());
    }
}
