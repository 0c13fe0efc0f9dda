//! Object Information (per-class registry)
//!
//! One `ObjectInformation` exists per object class. It owns:
//!
//! - the pool of `maximum` control blocks, allocated once
//! - the inactive queue of free pool positions (FIFO)
//! - the local table mapping index to pool position (slot 0 unused)
//! - the name table, for nameable classes
//! - a link to the context's global table, for distributable classes
//!
//! # Locking
//!
//! The tables are behind one spinlock and every control block has its own.
//! A block lock may be held while taking the tables lock or the global
//! table lock, but the tables lock and the global table lock are never held
//! together. Lookups only try a block's lock and never wait for it.
//!
//! Index `i` always lives at pool position `i - 1`.

use alloc::collections::VecDeque;
use alloc::vec::Vec;
use spin::Mutex;

use super::class::ObjectClass;
use super::context::ObjectsContext;
use super::error::FatalError;
use super::header::ControlBlock;
use super::id::{build_id, ObjectId, OBJECTS_MAXIMUM_INDEX};
use super::name::ObjectName;

bitflags::bitflags! {
    /// Per-class information flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct InformationFlags: u32 {
        /// Objects carry a name and can be found by `name_to_id`
        const NAMED = 0x0000_0001;
        /// Objects may be known to other nodes
        const GLOBAL = 0x0000_0002;
    }
}

/// Where a pool block currently is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum BlockState {
    Inactive,
    Allocated,
    Open,
}

/// Which end of the inactive queue a released block goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Requeue {
    /// Abandoned allocation: undo the pop
    Front,
    /// Normal free
    Back,
}

/// Tables guarded by the registry lock
pub(super) struct LocalTables {
    /// Index to pool position; `Some` iff the index is open
    pub(super) local_table: Vec<Option<usize>>,
    /// Index to name, for nameable classes
    pub(super) name_table: Option<Vec<ObjectName>>,
    /// Pool positions neither allocated nor open
    pub(super) inactive: VecDeque<usize>,
    pub(super) states: Vec<BlockState>,
}

/// Registry statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InformationStats {
    pub class: ObjectClass,
    pub maximum: u32,
    /// Blocks on the inactive queue
    pub inactive: u32,
    /// Blocks handed out but not open
    pub allocated: u32,
    /// Blocks currently open
    pub open: u32,
}

/// Per-class object registry
pub struct ObjectInformation<T> {
    class: ObjectClass,
    flags: InformationFlags,
    minimum_id: ObjectId,
    maximum_id: ObjectId,
    maximum: u32,
    pub(super) tables: Mutex<LocalTables>,
    pub(super) pool: Vec<Mutex<ControlBlock<T>>>,
}

fn try_filled<V: Clone>(len: usize, value: V) -> Result<Vec<V>, FatalError> {
    let mut table = Vec::new();
    table
        .try_reserve_exact(len)
        .map_err(|_| FatalError::OutOfWorkspace)?;
    table.resize(len, value);
    Ok(table)
}

impl<T: Default> ObjectInformation<T> {
    /// Initialize the information block for a class
    ///
    /// The pool holds `maximum` blocks, each starting with `T::default()`.
    /// `GLOBAL` only takes effect in a multiprocessor context.
    ///
    /// # Errors
    /// `TooManyObjects` if `maximum` does not fit an id's index field,
    /// `OutOfWorkspace` if the pool or tables cannot be allocated.
    pub fn new(
        ctx: &ObjectsContext,
        class: ObjectClass,
        flags: InformationFlags,
        maximum: u32,
    ) -> Result<Self, FatalError> {
        if maximum > OBJECTS_MAXIMUM_INDEX {
            log::error!("[OB] {} maximum {} exceeds the index field", class, maximum);
            return Err(FatalError::TooManyObjects { maximum });
        }

        let count = maximum as usize;

        let mut pool = Vec::new();
        pool.try_reserve_exact(count)
            .map_err(|_| FatalError::OutOfWorkspace)?;
        pool.extend((0..count).map(|_| Mutex::new(ControlBlock::new(T::default()))));

        let local_table = try_filled(count + 1, None)?;
        let name_table = if flags.contains(InformationFlags::NAMED) {
            Some(try_filled(count + 1, ObjectName::NONE)?)
        } else {
            None
        };
        let states = try_filled(count, BlockState::Inactive)?;

        let mut inactive = VecDeque::new();
        inactive
            .try_reserve_exact(count)
            .map_err(|_| FatalError::OutOfWorkspace)?;
        inactive.extend(0..count);

        let mut flags = flags;
        if flags.contains(InformationFlags::GLOBAL) && !ctx.is_multiprocessing() {
            log::debug!("[OB] {} is local only in a single node system", class);
            flags.remove(InformationFlags::GLOBAL);
        }

        log::info!(
            "[OB] {} information initialized: maximum {}, flags {:?}",
            class,
            maximum,
            flags
        );

        Ok(Self {
            class,
            flags,
            minimum_id: build_id(ctx.local_node(), 1),
            maximum_id: build_id(ctx.local_node(), maximum),
            maximum,
            tables: Mutex::new(LocalTables {
                local_table,
                name_table,
                inactive,
                states,
            }),
            pool,
        })
    }
}

impl<T> ObjectInformation<T> {
    #[inline]
    pub fn class(&self) -> ObjectClass {
        self.class
    }

    /// Effective flags
    #[inline]
    pub fn flags(&self) -> InformationFlags {
        self.flags
    }

    #[inline]
    pub fn maximum(&self) -> u32 {
        self.maximum
    }

    /// Id of index 1 on the local node
    #[inline]
    pub fn minimum_id(&self) -> ObjectId {
        self.minimum_id
    }

    /// Id of index `maximum` on the local node
    #[inline]
    pub fn maximum_id(&self) -> ObjectId {
        self.maximum_id
    }

    #[inline]
    pub fn is_named(&self) -> bool {
        self.flags.contains(InformationFlags::NAMED)
    }

    #[inline]
    pub fn supports_global(&self) -> bool {
        self.flags.contains(InformationFlags::GLOBAL)
    }

    /// Put a block back on the inactive queue
    pub(super) fn release(&self, slot: usize, requeue: Requeue) {
        let mut tables = self.tables.lock();
        debug_assert_eq!(tables.states[slot], BlockState::Allocated);
        debug_assert!(tables.local_table[slot + 1].is_none());

        tables.states[slot] = BlockState::Inactive;
        match requeue {
            Requeue::Front => tables.inactive.push_front(slot),
            Requeue::Back => tables.inactive.push_back(slot),
        }
    }

    /// Snapshot of the registry's occupancy
    pub fn stats(&self) -> InformationStats {
        let tables = self.tables.lock();
        let mut stats = InformationStats {
            class: self.class,
            maximum: self.maximum,
            inactive: 0,
            allocated: 0,
            open: 0,
        };
        for state in tables.states.iter() {
            match state {
                BlockState::Inactive => stats.inactive += 1,
                BlockState::Allocated => stats.allocated += 1,
                BlockState::Open => stats.open += 1,
            }
        }
        stats
    }
}
