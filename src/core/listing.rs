use super::NoteName;

/// Snapshot of the store's note names plus the current selection.
#[derive(Debug, Clone, Default)]
pub struct Listing {
    entries: Vec<NoteName>,
    selected: Option<usize>,
}

impl Listing {
    pub fn new(entries: Vec<NoteName>) -> Self {
        let mut listing = Self {
            entries,
            selected: None,
        };
        listing.select_first();
        listing
    }

    pub fn entries(&self) -> &[NoteName] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&NoteName> {
        self.entries.get(index)
    }

    pub fn contains(&self, name: &NoteName) -> bool {
        self.position(name).is_some()
    }

    pub fn selected(&self) -> Option<&NoteName> {
        self.selected.and_then(|idx| self.entries.get(idx))
    }

    pub fn select(&mut self, name: &NoteName) -> bool {
        match self.position(name) {
            Some(idx) => {
                self.selected = Some(idx);
                true
            }
            None => false,
        }
    }

    /// Swaps in a fresh snapshot, keeping the selection if its name survived.
    pub fn replace(&mut self, entries: Vec<NoteName>) {
        let selected_before = self.selected().cloned();
        self.entries = entries;

        if let Some(prev) = selected_before {
            if self.select(&prev) {
                return;
            }
        }
        self.select_first();
    }

    /// Removes exactly the entry called `name`.
    pub fn remove(&mut self, name: &NoteName) -> bool {
        let Some(idx) = self.position(name) else {
            return false;
        };
        self.entries.remove(idx);

        self.selected = match self.selected {
            _ if self.entries.is_empty() => None,
            Some(sel) if sel > idx => Some(sel - 1),
            Some(sel) if sel == idx => Some(idx.min(self.entries.len() - 1)),
            other => other,
        };
        true
    }

    fn position(&self, name: &NoteName) -> Option<usize> {
        self.entries.iter().position(|n| n == name)
    }

    fn select_first(&mut self) {
        self.selected = if self.entries.is_empty() { None } else { Some(0) };
    }
}
