use std::collections::HashSet;
use uuid::Uuid;

/// Session-scoped record of event identity tokens already processed.
///
/// The pipeline observes each logical event at multiple points, so the same
/// token can arrive more than once. The set grows for the life of one call
/// session; sessions are short-lived and the correlator is torn down with
/// them, so no eviction is needed.
#[derive(Debug, Default)]
pub struct SeenEvents {
    ids: HashSet<Uuid>,
}

impl SeenEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `id` and report whether this is its first sighting.
    pub fn first_sighting(&mut self, id: Uuid) -> bool {
        self.ids.insert(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sighting_then_duplicate() {
        let mut seen = SeenEvents::new();
        let id = Uuid::new_v4();

        assert!(seen.first_sighting(id));
        assert!(!seen.first_sighting(id));
        assert_eq!(seen.len(), 1);
    }

    #[test]
    fn test_distinct_ids_are_independent() {
        let mut seen = SeenEvents::new();
        assert!(seen.first_sighting(Uuid::new_v4()));
        assert!(seen.first_sighting(Uuid::new_v4()));
        assert_eq!(seen.len(), 2);
    }
}
