use std::collections::BTreeSet;
use std::sync::Arc;

/// Color ids whose cells render as empty.
///
/// An immutable value: toggling returns a new set and leaves the original
/// untouched, so a render already holding a set never sees it change. Clones
/// share storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HiddenSet {
    ids: Arc<BTreeSet<String>>,
}

impl HiddenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// A copy with `id` flipped between hidden and shown.
    #[must_use]
    pub fn toggled(&self, id: &str) -> Self {
        let mut ids = (*self.ids).clone();
        if !ids.remove(id) {
            ids.insert(id.to_string());
        }
        Self { ids: Arc::new(ids) }
    }

    /// A copy with `id` hidden.
    #[must_use]
    pub fn with(&self, id: &str) -> Self {
        if self.contains(id) {
            return self.clone();
        }
        self.toggled(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for HiddenSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            ids: Arc::new(iter.into_iter().map(Into::into).collect()),
        }
    }
}
