//! Object lookup: id to object, enumeration, name to id
//!
//! Every lookup checks the local table before touching a block, then
//! re-checks the block's header under the block lock, so a stale or
//! malformed id can only ever produce `Error`.
//!
//! Lookups never wait for a block. An open object whose lock is held by
//! another context (a preempted task, an outer directive in the same
//! context) is reported as `Busy`.

use super::context::ObjectsContext;
use super::error::ObjectsError;
use super::id::{
    build_id, ObjectId, OBJECT_ID_FINAL, OBJECT_ID_FINAL_INDEX, OBJECT_ID_INITIAL_INDEX,
};
use super::information::ObjectInformation;
use super::lifecycle::ObjectGuard;
use super::mp::NodeSelector;
use super::name::ObjectName;

/// Where an id was found
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// Object is on this node
    Local = 0,
    /// Object is on another node
    Remote = 1,
    /// Id is invalid
    Error = 2,
    /// Object is open on this node but held by another context
    Busy = 3,
}

/// Result of resolving an id
pub enum Lookup<'a, T> {
    /// The object, locked for the caller
    Local(ObjectGuard<'a, T>),
    /// The id names an object on another node; hand it to the transport
    Remote(ObjectId),
    /// Open on this node, locked by someone else
    Busy(ObjectId),
    Error,
}

impl<'a, T> Lookup<'a, T> {
    pub fn location(&self) -> Location {
        match self {
            Lookup::Local(_) => Location::Local,
            Lookup::Remote(_) => Location::Remote,
            Lookup::Busy(_) => Location::Busy,
            Lookup::Error => Location::Error,
        }
    }

    #[inline]
    pub fn is_local(&self) -> bool {
        matches!(self, Lookup::Local(_))
    }

    /// The local object, if any
    pub fn into_local(self) -> Option<ObjectGuard<'a, T>> {
        match self {
            Lookup::Local(object) => Some(object),
            _ => None,
        }
    }
}

impl<T> ObjectInformation<T> {
    /// Resolve a local index
    fn get_local(&self, ctx: &ObjectsContext, index: u32) -> Lookup<'_, T> {
        if index == 0 || index > self.maximum() {
            return Lookup::Error;
        }

        let Some(slot) = self.tables.lock().local_table[index as usize] else {
            return Lookup::Error;
        };

        let id = build_id(ctx.local_node(), index);
        let Some(block) = self.pool[slot].try_lock() else {
            log::trace!("[OB] {} get {}: busy", self.class(), id);
            return Lookup::Busy(id);
        };
        if block.header.id() != Some(id) {
            // Closed between the table check and the block lock.
            return Lookup::Error;
        }
        Lookup::Local(ObjectGuard::new(self, slot, id, block))
    }

    /// Map an id to its object
    ///
    /// `OBJECTS_ID_OF_SELF` resolves to the context's executing object when
    /// it belongs to this class. Node 0 is treated as the local node.
    ///
    /// The returned guard holds the object's lock. Any other lookup of the
    /// same object gets `Busy` until the guard is dropped or closed.
    pub fn get(&self, ctx: &ObjectsContext, id: ObjectId) -> Lookup<'_, T> {
        let id = if id.is_self() {
            match ctx.executing() {
                Some((class, executing)) if class == self.class() => executing,
                _ => return Lookup::Error,
            }
        } else {
            id
        };

        let node = id.node();
        if node == 0 || ctx.is_local_node(node) {
            let lookup = self.get_local(ctx, id.index());
            if let Lookup::Error = lookup {
                log::trace!("[OB] {} get {}: invalid", self.class(), id);
            }
            return lookup;
        }

        match self.mp_is_remote(ctx, id) {
            Location::Remote => Lookup::Remote(id),
            _ => Lookup::Error,
        }
    }

    /// Find the first open object at or after `start`
    ///
    /// Start with index `OBJECT_ID_INITIAL_INDEX` (or 1) and pass the
    /// returned id back in to enumerate every open object in index order.
    /// Once none remain, returns `Error` and `OBJECT_ID_FINAL`. An object
    /// held elsewhere is still visited, as `Busy`.
    pub fn get_next(&self, ctx: &ObjectsContext, start: ObjectId) -> (Lookup<'_, T>, ObjectId) {
        let mut index = match start.index() {
            OBJECT_ID_INITIAL_INDEX => 1,
            index => index,
        };

        while index <= self.maximum() {
            let lookup = self.get_local(ctx, index);
            if !matches!(lookup, Lookup::Error) {
                let next = if index < OBJECT_ID_FINAL_INDEX {
                    build_id(ctx.local_node(), index + 1)
                } else {
                    OBJECT_ID_FINAL
                };
                return (lookup, next);
            }
            index += 1;
        }

        (Lookup::Error, OBJECT_ID_FINAL)
    }

    /// Find the id of an object by name
    ///
    /// The local node is searched in index order and the lowest matching
    /// index wins. Distributable classes then search the global table and
    /// the remote query collaborator, as far as `selector` allows.
    ///
    /// # Errors
    /// `InvalidName` for a zero name, `InvalidNode` for a node outside the
    /// configuration, `NotFound` if nothing matched.
    pub fn name_to_id(
        &self,
        ctx: &ObjectsContext,
        name: ObjectName,
        selector: NodeSelector,
    ) -> Result<ObjectId, ObjectsError> {
        if !name.is_valid() {
            return Err(ObjectsError::InvalidName);
        }
        if let NodeSelector::Node(node) = selector {
            if node == 0 || node > ctx.maximum_nodes() {
                return Err(ObjectsError::InvalidNode);
            }
        }

        let local_only = match selector {
            NodeSelector::LocalNode => true,
            NodeSelector::Node(node) => ctx.is_local_node(node),
            NodeSelector::AllNodes | NodeSelector::OtherNodes => false,
        };
        let search_local = self.maximum() != 0
            && (local_only || selector == NodeSelector::AllNodes);

        if search_local {
            if let Some(index) = self.search_local_names(name) {
                return Ok(build_id(ctx.local_node(), index));
            }
        }

        if local_only || !self.supports_global() {
            return Err(ObjectsError::NotFound);
        }

        self.mp_global_name_search(ctx, name, selector)
    }

    fn search_local_names(&self, name: ObjectName) -> Option<u32> {
        let tables = self.tables.lock();
        let names = tables.name_table.as_ref()?;
        (1..=self.maximum() as usize)
            .find(|&index| tables.local_table[index].is_some() && names[index] == name)
            .map(|index| index as u32)
    }
}
