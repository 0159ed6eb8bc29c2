// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Application registry.
//!
//! The sequencer assigns application ids by name the first time an
//! application defines itself, and tracks the last accepted command sequence
//! per application. Ids are dense and start at
//! [`crate::config::FIRST_APPLICATION_ID`].

use std::collections::HashMap;

use crate::config::FIRST_APPLICATION_ID;

struct AppState {
    name: String,
    last_sequence: u32,
    active: bool,
}

/// Name -> id assignment plus per-application sequencing state.
pub struct AppRegistry {
    by_name: HashMap<String, u16>,
    states: Vec<AppState>,
}

impl AppRegistry {
    pub fn new() -> Self {
        Self {
            by_name: HashMap::new(),
            states: Vec::new(),
        }
    }

    fn index(application_id: u16) -> Option<usize> {
        application_id
            .checked_sub(FIRST_APPLICATION_ID)
            .map(usize::from)
    }

    /// Assign (or look up) the id for `name`. Redefinition is idempotent and
    /// reactivates the application.
    pub fn define(&mut self, name: &str) -> u16 {
        if let Some(&id) = self.by_name.get(name) {
            if let Some(state) = Self::index(id).and_then(|i| self.states.get_mut(i)) {
                state.active = true;
            }
            return id;
        }
        let id = FIRST_APPLICATION_ID + self.states.len() as u16;
        self.states.push(AppState {
            name: name.to_string(),
            last_sequence: 0,
            active: true,
        });
        self.by_name.insert(name.to_string(), id);
        id
    }

    pub fn is_defined(&self, application_id: u16) -> bool {
        Self::index(application_id).is_some_and(|i| i < self.states.len())
    }

    pub fn name(&self, application_id: u16) -> Option<&str> {
        Self::index(application_id)
            .and_then(|i| self.states.get(i))
            .map(|s| s.name.as_str())
    }

    pub fn id(&self, name: &str) -> Option<u16> {
        self.by_name.get(name).copied()
    }

    /// Sequence the next admitted command must carry.
    pub fn expected_next(&self, application_id: u16) -> Option<u32> {
        Self::index(application_id)
            .and_then(|i| self.states.get(i))
            .map(|s| s.last_sequence + 1)
    }

    /// Record an admitted command sequence.
    pub fn record(&mut self, application_id: u16, sequence: u32) {
        if let Some(state) = Self::index(application_id).and_then(|i| self.states.get_mut(i)) {
            debug_assert_eq!(state.last_sequence + 1, sequence, "sequence admitted out of order");
            state.last_sequence = sequence;
        }
    }

    pub fn deactivate(&mut self, application_id: u16) {
        if let Some(state) = Self::index(application_id).and_then(|i| self.states.get_mut(i)) {
            state.active = false;
        }
    }

    pub fn is_active(&self, application_id: u16) -> bool {
        Self::index(application_id)
            .and_then(|i| self.states.get(i))
            .is_some_and(|s| s.active)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl Default for AppRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_assigns_dense_ids() {
        let mut apps = AppRegistry::new();
        let a = apps.define("REFDATA01");
        let b = apps.define("LEHM01");
        assert_eq!(a, FIRST_APPLICATION_ID);
        assert_eq!(b, FIRST_APPLICATION_ID + 1);
        assert_eq!(apps.name(a), Some("REFDATA01"));
        assert_eq!(apps.id("LEHM01"), Some(b));
    }

    #[test]
    fn test_redefinition_is_idempotent() {
        let mut apps = AppRegistry::new();
        let a = apps.define("BEAR01");
        apps.record(a, 1);
        let again = apps.define("BEAR01");
        assert_eq!(a, again);
        assert_eq!(apps.expected_next(a), Some(2), "state survives redefinition");
    }

    #[test]
    fn test_sequence_tracking() {
        let mut apps = AppRegistry::new();
        let a = apps.define("LEHM01");
        assert_eq!(apps.expected_next(a), Some(1));
        apps.record(a, 1);
        apps.record(a, 2);
        assert_eq!(apps.expected_next(a), Some(3));
    }

    #[test]
    fn test_unknown_application() {
        let apps = AppRegistry::new();
        assert!(!apps.is_defined(FIRST_APPLICATION_ID));
        assert_eq!(apps.expected_next(FIRST_APPLICATION_ID), None);
        assert_eq!(apps.name(0), None);
    }

    #[test]
    fn test_deactivate() {
        let mut apps = AppRegistry::new();
        let a = apps.define("GONE01");
        assert!(apps.is_active(a));
        apps.deactivate(a);
        assert!(!apps.is_active(a));
        apps.define("GONE01");
        assert!(apps.is_active(a));
    }
}
