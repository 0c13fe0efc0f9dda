//! Object lifecycle: allocate, open, close, free
//!
//! ```text
//!             allocate              open
//!  inactive ------------> Allocated ------> open (ObjectGuard via get)
//!     ^                    |   ^                       |
//!     |        free        |   |         close         |
//!     +--------------------+   +-----------------------+
//! ```
//!
//! The states are types: a block can only be opened while `Allocated`,
//! closed while held through an `ObjectGuard`, and freed after close. Both
//! handle types keep the block's own lock, so nothing else touches the block
//! while a manager fills it in or tears it down; lookups of it meanwhile
//! report `Busy`.
//!
//! Open and close touch the registry tables and the global table one after
//! the other, never both at once.
//!
//! Dropping an `Allocated` without opening or freeing it puts the block back
//! at the head of the inactive queue, as if it had never been allocated.

use core::ops::{Deref, DerefMut};
use spin::MutexGuard;

use super::context::ObjectsContext;
use super::error::ObjectsError;
use super::header::ControlBlock;
use super::id::{build_id, ObjectId};
use super::information::{BlockState, ObjectInformation, Requeue};
use super::mp::GlobalObject;
use super::name::ObjectName;

/// A block taken from the inactive queue and not yet open
pub struct Allocated<'a, T> {
    information: &'a ObjectInformation<T>,
    slot: usize,
    block: MutexGuard<'a, ControlBlock<T>>,
    /// The block has been opened or freed; drop must not requeue it
    consumed: bool,
}

/// An open object, locked for the holder
pub struct ObjectGuard<'a, T> {
    information: &'a ObjectInformation<T>,
    slot: usize,
    id: ObjectId,
    block: MutexGuard<'a, ControlBlock<T>>,
}

impl<T> ObjectInformation<T> {
    /// Take the first block off the inactive queue
    ///
    /// Returns `None` when the class is exhausted.
    pub fn allocate(&self) -> Option<Allocated<'_, T>> {
        let slot = {
            let mut tables = self.tables.lock();
            let Some(slot) = tables.inactive.pop_front() else {
                log::debug!("[OB] {} exhausted", self.class());
                return None;
            };
            debug_assert_eq!(tables.states[slot], BlockState::Inactive);
            tables.states[slot] = BlockState::Allocated;
            slot
        };

        let block = self.pool[slot].lock();
        debug_assert!(!block.header.is_open());
        log::debug!("[OB] {} allocated index {}", self.class(), slot + 1);

        Some(Allocated {
            information: self,
            slot,
            block,
            consumed: false,
        })
    }
}

impl<'a, T> Allocated<'a, T> {
    /// Index this block will be published under
    #[inline]
    pub fn index(&self) -> u32 {
        (self.slot + 1) as u32
    }

    /// Publish the block under `name` and return its id
    ///
    /// The block is entered in the local table, the name table (nameable
    /// classes) and the global table (distributable classes).
    ///
    /// # Errors
    /// `InvalidName` for a zero name in a nameable class, `TooMany` if the
    /// global table is full. On error the block goes back to the inactive
    /// queue and the registry is as it was before `allocate`.
    pub fn open(mut self, ctx: &ObjectsContext, name: ObjectName) -> Result<ObjectId, ObjectsError> {
        let information = self.information;
        if information.is_named() && !name.is_valid() {
            return Err(ObjectsError::InvalidName);
        }

        let index = self.slot + 1;
        let id = build_id(ctx.local_node(), index as u32);

        // Global entry first, then the tables; never both locks at once.
        if information.supports_global() {
            let recorded = ctx.global().lock().open(GlobalObject {
                class: information.class(),
                id,
                name,
            });
            if let Err(err) = recorded {
                log::warn!("[OB] {} global table full, {} not opened", information.class(), id);
                return Err(err);
            }
        }

        let mut tables = information.tables.lock();
        tables.local_table[index] = Some(self.slot);
        if let Some(names) = tables.name_table.as_mut() {
            names[index] = name;
        }
        tables.states[self.slot] = BlockState::Open;
        drop(tables);

        self.block.header.publish(id);
        self.consumed = true;
        log::debug!("[OB] {} opened {} ({})", information.class(), id, name);
        Ok(id)
    }

    /// Return the block to the tail of the inactive queue
    pub fn free(mut self) {
        self.information.release(self.slot, Requeue::Back);
        self.consumed = true;
        log::debug!("[OB] {} freed index {}", self.information.class(), self.slot + 1);
    }
}

impl<'a, T> Drop for Allocated<'a, T> {
    fn drop(&mut self) {
        if !self.consumed {
            self.information.release(self.slot, Requeue::Front);
        }
    }
}

impl<'a, T> Deref for Allocated<'a, T> {
    type Target = ControlBlock<T>;

    fn deref(&self) -> &ControlBlock<T> {
        &self.block
    }
}

impl<'a, T> DerefMut for Allocated<'a, T> {
    fn deref_mut(&mut self) -> &mut ControlBlock<T> {
        &mut self.block
    }
}

impl<'a, T> ObjectGuard<'a, T> {
    pub(super) fn new(
        information: &'a ObjectInformation<T>,
        slot: usize,
        id: ObjectId,
        block: MutexGuard<'a, ControlBlock<T>>,
    ) -> Self {
        Self {
            information,
            slot,
            id,
            block,
        }
    }

    #[inline]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    #[inline]
    pub fn index(&self) -> u32 {
        (self.slot + 1) as u32
    }

    /// Unpublish the object from every table
    ///
    /// The block stays allocated to the caller so teardown can continue
    /// before it is freed.
    pub fn close(self, ctx: &ObjectsContext) -> Allocated<'a, T> {
        let ObjectGuard {
            information,
            slot,
            id,
            mut block,
        } = self;
        let index = slot + 1;

        let mut tables = information.tables.lock();
        debug_assert_eq!(tables.local_table[index], Some(slot));
        tables.local_table[index] = None;
        if let Some(names) = tables.name_table.as_mut() {
            names[index] = ObjectName::NONE;
        }
        tables.states[slot] = BlockState::Allocated;
        drop(tables);

        if information.supports_global() && ctx.global().lock().close(information.class(), id).is_none() {
            log::warn!("[OB] {} {} was not in the global table", information.class(), id);
        }

        block.header.unpublish();
        log::debug!("[OB] {} closed {}", information.class(), id);

        Allocated {
            information,
            slot,
            block,
            consumed: false,
        }
    }
}

impl<'a, T> Deref for ObjectGuard<'a, T> {
    type Target = ControlBlock<T>;

    fn deref(&self) -> &ControlBlock<T> {
        &self.block
    }
}

impl<'a, T> DerefMut for ObjectGuard<'a, T> {
    fn deref_mut(&mut self) -> &mut ControlBlock<T> {
        &mut self.block
    }
}
