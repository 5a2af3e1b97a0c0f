use crate::error::AppError;
use std::cell::RefCell;
use std::collections::HashMap;

mod file_slots;
pub mod json_store;

pub use file_slots::{FileSlots, store_dir};

/// A named-key string store, the board's equivalent of browser local storage.
pub trait Slots {
    /// `Ok(None)` when nothing was ever written under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    /// Replaces whatever `key` held before.
    fn set(&self, key: &str, value: &str) -> Result<(), AppError>;
}

impl<S: Slots + ?Sized> Slots for &S {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        (**self).set(key, value)
    }
}

/// In-process slots, lost on exit.
#[derive(Debug, Default)]
pub struct MemorySlots {
    values: RefCell<HashMap<String, String>>,
}

impl MemorySlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: &str) -> Self {
        let slots = Self::new();
        slots
            .values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        slots
    }
}

impl Slots for MemorySlots {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
