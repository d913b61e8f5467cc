//! Reusable scratch buffers.
//!
//! A [`Pool`] hands out [`Pooled`] guards. When a guard is dropped its value is
//! reset and goes back to the pool, so a buffer can never be used after it was
//! returned. Two shared pools exist: [`bytes()`] for byte buffers used while
//! reading files and streams, and [`strings()`] for text assembled by the
//! pretty printer.

use std::ops::{Deref, DerefMut};
use std::sync::Mutex;

use lazy_static::lazy_static;

/// Initial capacity of pooled byte buffers.
pub const SCRATCH_CAPACITY: usize = 64 * 1024;

/// Values above this capacity are not kept, so one huge body does not pin memory.
const MAX_RETAINED_CAPACITY: usize = 4 * 1024 * 1024;

/// Maximum number of idle values kept per pool.
const MAX_IDLE: usize = 16;

/// A value that can be cleared and reused.
pub trait Recycle: Default {
    fn fresh() -> Self {
        Self::default()
    }
    fn reset(&mut self);
    fn retained_capacity(&self) -> usize;
}

impl Recycle for Vec<u8> {
    fn fresh() -> Self {
        Vec::with_capacity(SCRATCH_CAPACITY)
    }
    fn reset(&mut self) {
        self.clear();
    }
    fn retained_capacity(&self) -> usize {
        self.capacity()
    }
}

impl Recycle for String {
    fn reset(&mut self) {
        self.clear();
    }
    fn retained_capacity(&self) -> usize {
        self.capacity()
    }
}

pub struct Pool<T: Recycle> {
    idle: Mutex<Vec<T>>,
}

impl<T: Recycle> Pool<T> {
    pub fn new() -> Self {
        Self { idle: Mutex::new(Vec::new()) }
    }

    /// Takes a value from the pool, or creates a fresh one.
    pub fn get(&self) -> Pooled<'_, T> {
        let value = self
            .idle
            .lock()
            .ok()
            .and_then(|mut idle| idle.pop())
            .unwrap_or_else(T::fresh);
        Pooled { pool: self, value }
    }

    /// Number of values currently waiting for reuse.
    pub fn idle(&self) -> usize {
        self.idle.lock().map(|idle| idle.len()).unwrap_or(0)
    }

    fn put(&self, mut value: T) {
        if value.retained_capacity() > MAX_RETAINED_CAPACITY {
            return;
        }
        value.reset();
        if let Ok(mut idle) = self.idle.lock() {
            if idle.len() < MAX_IDLE {
                idle.push(value);
            }
        }
    }
}

impl<T: Recycle> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A value on loan from a [`Pool`]. Returned automatically on drop.
pub struct Pooled<'a, T: Recycle> {
    pool: &'a Pool<T>,
    value: T,
}

impl<T: Recycle> Deref for Pooled<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T: Recycle> DerefMut for Pooled<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T: Recycle> Drop for Pooled<'_, T> {
    fn drop(&mut self) {
        let value = std::mem::take(&mut self.value);
        self.pool.put(value);
    }
}

lazy_static! {
    static ref BYTES: Pool<Vec<u8>> = Pool::new();
    static ref STRINGS: Pool<String> = Pool::new();
}

/// Shared pool of byte buffers.
pub fn bytes() -> &'static Pool<Vec<u8>> {
    &BYTES
}

/// Shared pool of string builders.
pub fn strings() -> &'static Pool<String> {
    &STRINGS
}
