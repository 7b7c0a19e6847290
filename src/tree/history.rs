//! Linear back/forward navigation history

/// Non-branching history of visited items
///
/// Appending while not at the tail discards the forward entries.
#[derive(Debug, Clone)]
pub struct NavigationHistory<T> {
    items: Vec<T>,
    index: Option<usize>,
}

impl<T> Default for NavigationHistory<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: None,
        }
    }
}

impl<T: PartialEq + Clone> NavigationHistory<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `item` as the current entry
    ///
    /// Returns `false` when the item equals the current entry and nothing changed.
    pub fn append(&mut self, item: T) -> bool {
        if let Some(index) = self.index {
            self.items.truncate(index + 1);
            if self.items[index] == item {
                return false;
            }
        } else {
            self.items.clear();
        }

        self.items.push(item);
        self.index = Some(self.items.len() - 1);
        true
    }

    /// Step back; `None` at the start (the cursor does not move)
    pub fn back(&mut self) -> Option<T> {
        match self.index {
            Some(index) if index > 0 => {
                self.index = Some(index - 1);
                self.items.get(index - 1).cloned()
            }
            _ => None,
        }
    }

    /// Step forward; `None` at the tail (the cursor does not move)
    pub fn forward(&mut self) -> Option<T> {
        match self.index {
            Some(index) if index + 1 < self.items.len() => {
                self.index = Some(index + 1);
                self.items.get(index + 1).cloned()
            }
            _ => None,
        }
    }

    pub fn current(&self) -> Option<&T> {
        self.index.and_then(|i| self.items.get(i))
    }

    pub fn can_back(&self) -> bool {
        matches!(self.index, Some(i) if i > 0)
    }

    pub fn can_forward(&self) -> bool {
        matches!(self.index, Some(i) if i + 1 < self.items.len())
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.index = None;
    }

    /// Cursor position, `None` when the history is empty
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
