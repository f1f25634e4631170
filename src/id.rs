use serde::{Deserialize, Serialize};

/// Monotonic ID generator shared by events and action records.
/// No two generated records share an ID within one engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn starting_from(start: u64) -> Self {
        Self { next: start }
    }

    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// The ID the next call to [`next_id`](Self::next_id) will return.
    pub fn peek(&self) -> u64 {
        self.next
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_ids() {
        let mut ids = IdGenerator::new();
        assert_eq!(ids.next_id(), 1);
        assert_eq!(ids.next_id(), 2);
        assert_eq!(ids.peek(), 3);
    }

    #[test]
    fn resumes_from_offset() {
        let mut ids = IdGenerator::starting_from(500);
        assert_eq!(ids.next_id(), 500);
        assert_eq!(ids.next_id(), 501);
    }
}
