//! Single-slot memo cache for derived dashboard state.
//!
//! An entry is served only when its key compares equal to the requested key.
//! Keys carry the full filter state rather than a hash, so a stale value is
//! never returned; a miss simply recomputes.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Hit and miss counts of a memo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoStats {
    pub hits: u64,
    pub misses: u64,
}

/// Remembers the last computed value together with the key it was computed for.
#[derive(Debug)]
pub struct Memo<K, V> {
    slot: RefCell<Option<(K, Rc<V>)>>,
    hits: Cell<u64>,
    misses: Cell<u64>,
}

impl<K, V> Default for Memo<K, V> {
    fn default() -> Self {
        Memo {
            slot: RefCell::new(None),
            hits: Cell::new(0),
            misses: Cell::new(0),
        }
    }
}

impl<K: PartialEq, V> Memo<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key`, or run `compute` and cache its result.
    pub fn get_or_compute<F>(&self, key: K, compute: F) -> Rc<V>
    where
        F: FnOnce() -> V,
    {
        if let Some((cached_key, value)) = self.slot.borrow().as_ref() {
            if *cached_key == key {
                self.hits.set(self.hits.get() + 1);
                return Rc::clone(value);
            }
        }
        self.misses.set(self.misses.get() + 1);
        let value = Rc::new(compute());
        *self.slot.borrow_mut() = Some((key, Rc::clone(&value)));
        value
    }

    pub fn stats(&self) -> MemoStats {
        MemoStats {
            hits: self.hits.get(),
            misses: self.misses.get(),
        }
    }
}
