//! Monotonic, prefixed identifier source.

/// Generates identifiers of the form `{prefix}_{counter:06}`.
///
/// The counter starts at 1, strictly increases, and is never reused or
/// decremented. Each generator instance owns its own sequence.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    prefix: String,
    counter: u64,
}

impl IdGenerator {
    /// Create a generator for the given prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: 1,
        }
    }

    /// The prefix this generator was constructed with.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Return the next identifier and advance the sequence.
    pub fn next_id(&mut self) -> String {
        let next = format!("{}_{:06}", self.prefix, self.counter);
        self.counter += 1;
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix() {
        let generator = IdGenerator::new("event");
        assert_eq!(generator.prefix(), "event");
    }

    #[test]
    fn test_sequence() {
        let mut generator = IdGenerator::new("sess");
        assert_eq!(generator.next_id(), "sess_000001");
        assert_eq!(generator.next_id(), "sess_000002");
        assert_eq!(generator.next_id(), "sess_000003");
    }

    #[test]
    fn test_independent_generators() {
        let mut first = IdGenerator::new("a");
        let mut second = IdGenerator::new("a");
        assert_eq!(first.next_id(), "a_000001");
        assert_eq!(first.next_id(), "a_000002");
        assert_eq!(second.next_id(), "a_000001");
    }

    #[test]
    fn test_wide_counter() {
        let mut generator = IdGenerator::new("x");
        for _ in 0..1_000_000 {
            generator.next_id();
        }
        assert_eq!(generator.next_id(), "x_1000001");
    }
}
