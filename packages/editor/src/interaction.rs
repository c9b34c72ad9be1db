//! Per-node UI flags (selection, expanded, resizing).
//!
//! Kept outside the document so that selecting a node never creates a
//! history entry. `expanded` and `resizing` only ever hold for a selected
//! node: deselecting clears them, and setting them on an unselected node
//! is ignored.

use crate::NodeKey;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InteractionFlags {
    pub selected: bool,
    pub expanded: bool,
    pub resizing: bool,
}

#[derive(Debug, Clone, Default)]
pub struct InteractionState {
    flags: HashMap<NodeKey, InteractionFlags>,
}

impl InteractionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flags(&self, key: NodeKey) -> InteractionFlags {
        self.flags.get(&key).copied().unwrap_or_default()
    }

    pub fn set_selected(&mut self, key: NodeKey, selected: bool) {
        if selected {
            self.flags.entry(key).or_default().selected = true;
        } else {
            self.flags.remove(&key);
        }
    }

    /// Returns whether the flag was applied
    pub fn set_expanded(&mut self, key: NodeKey, expanded: bool) -> bool {
        match self.flags.get_mut(&key) {
            Some(flags) if flags.selected => {
                flags.expanded = expanded;
                true
            }
            _ => {
                tracing::trace!("ignoring expand on unselected {}", key);
                false
            }
        }
    }

    /// Returns whether the flag was applied
    pub fn set_resizing(&mut self, key: NodeKey, resizing: bool) -> bool {
        match self.flags.get_mut(&key) {
            Some(flags) if flags.selected => {
                flags.resizing = resizing;
                true
            }
            _ => {
                tracing::trace!("ignoring resize on unselected {}", key);
                false
            }
        }
    }

    /// Deselect everything
    pub fn clear_selection(&mut self) {
        self.flags.clear();
    }

    /// Deselect `key`, dropping its expanded and resizing flags with it
    pub fn clear_selection_for(&mut self, key: NodeKey) {
        self.flags.remove(&key);
    }

    pub fn is_selected(&self, key: NodeKey) -> bool {
        self.flags(key).selected
    }

    pub fn is_expanded(&self, key: NodeKey) -> bool {
        self.flags(key).expanded
    }

    pub fn is_resizing(&self, key: NodeKey) -> bool {
        self.flags(key).resizing
    }

    /// Selected keys in ascending order
    pub fn selected_keys(&self) -> Vec<NodeKey> {
        let mut keys: Vec<NodeKey> = self
            .flags
            .iter()
            .filter(|(_, flags)| flags.selected)
            .map(|(key, _)| *key)
            .collect();
        keys.sort();
        keys
    }

    /// Drop flags for keys that no longer exist
    pub fn retain(&mut self, mut keep: impl FnMut(NodeKey) -> bool) {
        self.flags.retain(|key, _| keep(*key));
    }
}
