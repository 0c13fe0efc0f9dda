//! Object Header
//!
//! Every control block starts with an `ObjectHeader` followed by the
//! class-specific body:
//!
//! ```text
//! +-------------------+
//! | ObjectHeader      |  <- id (set while open)
//! +-------------------+
//! | Body (T)          |  <- task, semaphore, queue, ... fields
//! +-------------------+
//! ```
//!
//! Free-list membership lives in the registry as pool positions, so the
//! header carries no links.

use core::ops::{Deref, DerefMut};
use super::id::ObjectId;

/// Common object header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObjectHeader {
    /// Id assigned by open, cleared by close
    id: Option<ObjectId>,
}

impl ObjectHeader {
    /// Create an unpublished header
    pub const fn new() -> Self {
        Self { id: None }
    }

    /// Id of the object, if it is currently open
    #[inline]
    pub fn id(&self) -> Option<ObjectId> {
        self.id
    }

    /// Check if the object is currently open
    #[inline]
    pub fn is_open(&self) -> bool {
        self.id.is_some()
    }

    #[inline]
    pub(super) fn publish(&mut self, id: ObjectId) {
        self.id = Some(id);
    }

    #[inline]
    pub(super) fn unpublish(&mut self) {
        self.id = None;
    }
}

/// A control block: header plus class-specific body
#[derive(Debug, Default)]
pub struct ControlBlock<T> {
    pub header: ObjectHeader,
    pub body: T,
}

impl<T> ControlBlock<T> {
    pub const fn new(body: T) -> Self {
        Self {
            header: ObjectHeader::new(),
            body,
        }
    }
}

impl<T> Deref for ControlBlock<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.body
    }
}

impl<T> DerefMut for ControlBlock<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.body
    }
}
