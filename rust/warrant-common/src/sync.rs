//! Thread-safety bounds that relax to nothing on `wasm32`.
//!
//! Validators, resolvers and proof caches are shared between tasks on native
//! runtimes, so they must be `Send + Sync` there. In the browser everything
//! runs on one thread and many useful types (JS handles, `Rc`) are neither.
//! Bounding on [`ConditionalSend`] / [`ConditionalSync`] instead of the std
//! markers lets one definition serve both.

#[cfg(not(target_arch = "wasm32"))]
mod bounds {
    /// `Send` on native targets, no bound on `wasm32`.
    pub trait ConditionalSend: Send {}
    impl<T: Send> ConditionalSend for T {}

    /// `Send + Sync` on native targets, no bound on `wasm32`.
    pub trait ConditionalSync: Send + Sync {}
    impl<T: Send + Sync> ConditionalSync for T {}
}

#[cfg(target_arch = "wasm32")]
mod bounds {
    /// `Send` on native targets, no bound on `wasm32`.
    pub trait ConditionalSend {}
    impl<T> ConditionalSend for T {}

    /// `Send + Sync` on native targets, no bound on `wasm32`.
    pub trait ConditionalSync {}
    impl<T> ConditionalSync for T {}
}

pub use bounds::{ConditionalSend, ConditionalSync};

#[cfg(not(target_arch = "wasm32"))]
type Cell<T> = std::sync::RwLock<T>;

#[cfg(target_arch = "wasm32")]
type Cell<T> = std::cell::RefCell<T>;

/// Interior mutability that is [`ConditionalSync`] whenever `T` is.
///
/// Backed by an `RwLock` on native targets and a `RefCell` on `wasm32`.
/// Poisoning is ignored: the values kept here are memo tables whose entries
/// are inserted whole, so a panicked writer leaves nothing half-written.
///
/// ```
/// use warrant_common::SharedCell;
/// use std::collections::HashMap;
///
/// let memo = SharedCell::new(HashMap::new());
/// memo.write().insert("bafy", 1);
/// assert_eq!(memo.read().get("bafy"), Some(&1));
/// ```
#[derive(Debug, Default)]
pub struct SharedCell<T>(Cell<T>);

impl<T> SharedCell<T> {
    /// Wrap `value`.
    pub fn new(value: T) -> Self {
        Self(Cell::new(value))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl<T> SharedCell<T> {
    /// Shared access. Blocks while a writer holds the cell.
    pub fn read(&self) -> std::sync::RwLockReadGuard<'_, T> {
        self.0.read().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Exclusive access. Blocks while anyone else holds the cell.
    pub fn write(&self) -> std::sync::RwLockWriteGuard<'_, T> {
        self.0
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(target_arch = "wasm32")]
impl<T> SharedCell<T> {
    /// Shared access.
    ///
    /// # Panics
    ///
    /// If the cell is currently written.
    pub fn read(&self) -> std::cell::Ref<'_, T> {
        self.0.borrow()
    }

    /// Exclusive access.
    ///
    /// # Panics
    ///
    /// If the cell is currently read or written.
    pub fn write(&self) -> std::cell::RefMut<'_, T> {
        self.0.borrow_mut()
    }
}
