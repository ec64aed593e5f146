//! Persistent state arena keyed by caller-supplied identity.
//!
//! Views that need an object surviving across passes (a navigation stack, a
//! text buffer) ask for it under a [`StateKey`] of their choosing. Because the
//! key is explicit rather than derived from the view's position, reordering a
//! subtree neither drops nor duplicates its state. An entry nobody asks for
//! during a pass is released when that pass ends.

use std::any::Any;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::diagnostics::{Diagnostic, Diagnostics};

/// Stable identity of a persistent state entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateKey(String);

impl StateKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A key nested under this one, `parent/child`.
    pub fn join(&self, child: impl fmt::Display) -> Self {
        Self(format!("{}/{child}", self.0))
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StateKey {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for StateKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Map from [`StateKey`] to type-erased shared state.
#[derive(Default)]
pub struct StateArena {
    entries: HashMap<StateKey, Rc<dyn Any>>,
    touched: HashSet<StateKey>,
}

impl StateArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget which keys were used. Called at the start of every pass.
    pub fn begin_pass(&mut self) {
        self.touched.clear();
    }

    /// Mark `key` as in use this pass without creating an entry.
    pub fn touch(&mut self, key: &StateKey) {
        if !self.touched.contains(key) {
            self.touched.insert(key.clone());
        }
    }

    /// The entry under `key`, created with `init` if absent.
    ///
    /// If the entry exists with a different type it is replaced and a
    /// [`Diagnostic::StateTypeMismatch`] is recorded.
    pub fn get_or_insert_with<T: 'static>(
        &mut self,
        key: &StateKey,
        init: impl FnOnce() -> T,
        diagnostics: &mut Diagnostics,
    ) -> Rc<RefCell<T>> {
        self.touch(key);
        if let Some(existing) = self.entries.get(key) {
            match Rc::clone(existing).downcast::<RefCell<T>>() {
                Ok(state) => return state,
                Err(_) => diagnostics.record(Diagnostic::StateTypeMismatch { key: key.clone() }),
            }
        }
        let state = Rc::new(RefCell::new(init()));
        self.entries.insert(key.clone(), Rc::clone(&state) as Rc<dyn Any>);
        debug!(%key, "persistent state created");
        state
    }

    /// Release every entry not touched since [`begin_pass`](Self::begin_pass).
    /// Returns the released keys, sorted.
    pub fn sweep(&mut self) -> Vec<StateKey> {
        let touched = &self.touched;
        let mut released = Vec::new();
        self.entries.retain(|key, _| {
            let keep = touched.contains(key);
            if !keep {
                released.push(key.clone());
            }
            keep
        });
        released.sort();
        if !released.is_empty() {
            debug!(released = released.len(), "persistent state released");
        }
        released
    }

    /// Whether `key` was used during the current pass.
    pub fn is_live(&self, key: &StateKey) -> bool {
        self.touched.contains(key)
    }

    pub fn contains(&self, key: &StateKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for StateArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.entries.keys().collect();
        keys.sort();
        f.debug_struct("StateArena").field("keys", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_key_same_instance() {
        let mut arena = StateArena::new();
        let mut diagnostics = Diagnostics::new();
        let key = StateKey::from("nav");
        let a = arena.get_or_insert_with(&key, || 1_u32, &mut diagnostics);
        *a.borrow_mut() = 7;
        let b = arena.get_or_insert_with(&key, || 0_u32, &mut diagnostics);
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(*b.borrow(), 7);
    }

    #[test]
    fn untouched_entries_are_released() {
        let mut arena = StateArena::new();
        let mut diagnostics = Diagnostics::new();
        arena.get_or_insert_with(&"a".into(), || (), &mut diagnostics);
        arena.get_or_insert_with(&"b".into(), || (), &mut diagnostics);
        assert!(arena.sweep().is_empty());

        arena.begin_pass();
        arena.get_or_insert_with(&"b".into(), || (), &mut diagnostics);
        assert_eq!(arena.sweep(), vec![StateKey::from("a")]);
        assert!(!arena.contains(&"a".into()));
        assert!(arena.contains(&"b".into()));
    }

    #[test]
    fn released_state_is_dropped() {
        let mut arena = StateArena::new();
        let mut diagnostics = Diagnostics::new();
        let token = Rc::new(());
        let held = token.clone();
        arena.get_or_insert_with(&"k".into(), move || held, &mut diagnostics);
        assert_eq!(Rc::strong_count(&token), 2);
        arena.begin_pass();
        arena.sweep();
        assert_eq!(Rc::strong_count(&token), 1);
    }

    #[test]
    fn type_change_recreates_and_reports() {
        let mut arena = StateArena::new();
        let mut diagnostics = Diagnostics::new();
        let key = StateKey::from("k");
        arena.get_or_insert_with(&key, || 1_i32, &mut diagnostics);
        let s = arena.get_or_insert_with(&key, || String::from("x"), &mut diagnostics);
        assert_eq!(*s.borrow(), "x");
        assert_eq!(
            diagnostics.into_vec(),
            vec![Diagnostic::StateTypeMismatch { key }]
        );
    }

    #[test]
    fn touch_marks_live_without_entry() {
        let mut arena = StateArena::new();
        let key = StateKey::from("owner");
        assert!(!arena.is_live(&key));
        arena.touch(&key);
        assert!(arena.is_live(&key));
        assert!(arena.is_empty());
    }

    #[test]
    fn join_nests_keys() {
        assert_eq!(StateKey::from("tabs").join(2).as_str(), "tabs/2");
    }
}
