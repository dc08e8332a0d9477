use std::collections::HashSet;

/// Insertion-ordered set of entity ids that a run has already handled.
///
/// Order is kept so a checkpoint written and read back lists ids exactly as
/// they were processed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessedIds {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl ProcessedIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the id was already present.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.seen.contains(&id) {
            return false;
        }
        self.seen.insert(id.clone());
        self.order.push(id);
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.order.clone()
    }
}

impl<S: Into<String>> FromIterator<S> for ProcessedIds {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut ids = ProcessedIds::new();
        for id in iter {
            ids.insert(id);
        }
        ids
    }
}
