//! Object Manager Multiprocessing Support
//!
//! In a multiprocessor configuration an id may name a control block that
//! lives on another node. Classes flagged `GLOBAL` keep a record of such
//! objects in the context's global table:
//!
//! - objects opened locally are recorded under the local node
//! - objects announced by other nodes are recorded with `mp_open`
//!
//! The global table is shared by every distributable class. Each entry
//! carries its class so one table serves all of them. Resolution of remote
//! objects belongs to the inter-node transport; this module only classifies
//! ids and answers name searches from what it has recorded.

use alloc::vec::Vec;

use super::class::ObjectClass;
use super::context::ObjectsContext;
use super::error::{FatalError, ObjectsError};
use super::id::ObjectId;
use super::information::ObjectInformation;
use super::lookup::Location;
use super::name::ObjectName;

/// Raw node value: search every node
pub const SEARCH_ALL_NODES: u32 = 0;

/// Raw node value: search every node except the local one
pub const SEARCH_OTHER_NODES: u32 = 0x7FFF_FFFE;

/// Raw node value: search only the local node
pub const SEARCH_LOCAL_NODE: u32 = 0x7FFF_FFFF;

/// Raw node value used by ident directives to ask for the caller itself
pub const WHO_AM_I: u32 = 0;

/// Extent of a name search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeSelector {
    AllNodes,
    OtherNodes,
    LocalNode,
    /// One specific node
    Node(u32),
}

impl NodeSelector {
    /// Decode the raw node argument of an ident directive
    pub const fn from_raw(raw: u32) -> Self {
        match raw {
            SEARCH_ALL_NODES => NodeSelector::AllNodes,
            SEARCH_OTHER_NODES => NodeSelector::OtherNodes,
            SEARCH_LOCAL_NODE => NodeSelector::LocalNode,
            node => NodeSelector::Node(node),
        }
    }

    /// Raw node argument for this selector
    pub const fn raw(self) -> u32 {
        match self {
            NodeSelector::AllNodes => SEARCH_ALL_NODES,
            NodeSelector::OtherNodes => SEARCH_OTHER_NODES,
            NodeSelector::LocalNode => SEARCH_LOCAL_NODE,
            NodeSelector::Node(node) => node,
        }
    }

    /// Check if an object on `node` is within the extent
    fn admits(self, node: u32, local_node: u32) -> bool {
        match self {
            NodeSelector::AllNodes => true,
            NodeSelector::OtherNodes => node != local_node,
            NodeSelector::LocalNode => node == local_node,
            NodeSelector::Node(wanted) => node == wanted,
        }
    }
}

/// Result of one poll of a remote name query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteQueryStatus {
    /// The query is still in flight
    Pending,
    Found(ObjectId),
    NotFound,
}

/// Collaborator that asks other nodes for a name.
///
/// `query` is called repeatedly, with no object manager lock held, until it
/// stops returning `Pending` or the context's poll limit is reached.
pub trait RemoteNameQuery: Send + Sync {
    fn query(
        &self,
        class: ObjectClass,
        name: ObjectName,
        selector: NodeSelector,
    ) -> RemoteQueryStatus;
}

/// Global table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalObject {
    pub class: ObjectClass,
    pub id: ObjectId,
    pub name: ObjectName,
}

/// Global table statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalTableStats {
    /// Configured maximum number of global objects
    pub maximum: usize,
    /// Entries in use
    pub active: usize,
    /// Entries whose node is the local node
    pub local: usize,
}

/// Objects known across nodes, in the order they were recorded.
///
/// Storage is reserved once for `maximum_global_objects` entries and never
/// grows.
pub struct GlobalTable {
    objects: Vec<GlobalObject>,
    maximum: usize,
}

impl GlobalTable {
    pub(super) fn new(maximum_global_objects: u32) -> Result<Self, FatalError> {
        let maximum = maximum_global_objects as usize;
        let mut objects = Vec::new();
        objects
            .try_reserve_exact(maximum)
            .map_err(|_| FatalError::OutOfWorkspace)?;
        Ok(Self { objects, maximum })
    }

    pub(super) fn open(&mut self, object: GlobalObject) -> Result<(), ObjectsError> {
        if self.objects.len() >= self.maximum {
            return Err(ObjectsError::TooMany);
        }
        self.objects.push(object);
        Ok(())
    }

    pub(super) fn close(&mut self, class: ObjectClass, id: ObjectId) -> Option<GlobalObject> {
        let position = self
            .objects
            .iter()
            .position(|o| o.class == class && o.id == id)?;
        Some(self.objects.remove(position))
    }

    pub(super) fn find(&self, class: ObjectClass, id: ObjectId) -> Option<&GlobalObject> {
        self.objects.iter().find(|o| o.class == class && o.id == id)
    }

    pub(super) fn search_name(
        &self,
        class: ObjectClass,
        name: ObjectName,
        selector: NodeSelector,
        local_node: u32,
    ) -> Option<ObjectId> {
        self.objects
            .iter()
            .find(|o| o.class == class && o.name == name && selector.admits(o.id.node(), local_node))
            .map(|o| o.id)
    }

    pub(super) fn stats(&self, local_node: u32) -> GlobalTableStats {
        GlobalTableStats {
            maximum: self.maximum,
            active: self.objects.len(),
            local: self.objects.iter().filter(|o| o.id.node() == local_node).count(),
        }
    }
}

fn check_remote_node(ctx: &ObjectsContext, node: u32) -> Result<(), ObjectsError> {
    if node == 0 || node > ctx.maximum_nodes() || ctx.is_local_node(node) {
        return Err(ObjectsError::InvalidNode);
    }
    Ok(())
}

impl<T> ObjectInformation<T> {
    /// Record an object announced by another node
    ///
    /// # Errors
    /// `NotConfigured` if the class is not distributable here, `InvalidNode`
    /// if the id does not name a remote node, `InvalidName` for a zero name,
    /// `TooMany` if the global table is full.
    pub fn mp_open(
        &self,
        ctx: &ObjectsContext,
        name: ObjectName,
        id: ObjectId,
    ) -> Result<(), ObjectsError> {
        if !self.supports_global() {
            return Err(ObjectsError::NotConfigured);
        }
        check_remote_node(ctx, id.node())?;
        if !name.is_valid() {
            return Err(ObjectsError::InvalidName);
        }

        let result = ctx.global().lock().open(GlobalObject {
            class: self.class(),
            id,
            name,
        });
        match result {
            Ok(()) => log::debug!("[OB-MP] {} {} ({}) recorded", self.class(), id, name),
            Err(_) => log::warn!("[OB-MP] global table full, {} {} not recorded", self.class(), id),
        }
        result
    }

    /// Forget an object previously recorded with `mp_open`
    pub fn mp_close(&self, ctx: &ObjectsContext, id: ObjectId) -> Result<(), ObjectsError> {
        if !self.supports_global() {
            return Err(ObjectsError::NotConfigured);
        }
        check_remote_node(ctx, id.node())?;

        match ctx.global().lock().close(self.class(), id) {
            Some(_) => {
                log::debug!("[OB-MP] {} {} forgotten", self.class(), id);
                Ok(())
            }
            None => {
                log::warn!("[OB-MP] {} {} is not in the global table", self.class(), id);
                Err(ObjectsError::InvalidId)
            }
        }
    }

    /// Classify an id naming another node
    ///
    /// Returns `Remote` if the global table knows it, `Error` otherwise.
    pub fn mp_is_remote(&self, ctx: &ObjectsContext, id: ObjectId) -> Location {
        if !self.supports_global() || check_remote_node(ctx, id.node()).is_err() {
            return Location::Error;
        }
        match ctx.global().lock().find(self.class(), id) {
            Some(_) => Location::Remote,
            None => Location::Error,
        }
    }

    /// Search the global table, then the remote query collaborator
    ///
    /// `selector` has already been range-checked by `name_to_id`.
    pub(super) fn mp_global_name_search(
        &self,
        ctx: &ObjectsContext,
        name: ObjectName,
        selector: NodeSelector,
    ) -> Result<ObjectId, ObjectsError> {
        let found = ctx
            .global()
            .lock()
            .search_name(self.class(), name, selector, ctx.local_node());
        if let Some(id) = found {
            return Ok(id);
        }

        ctx.query_remote(self.class(), name, selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ob::context::ObjectsConfig;
    use crate::ob::id::build_id;
    use crate::ob::information::InformationFlags;
    use crate::ob::name::build_name;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn mp_context(maximum_global_objects: u32) -> ObjectsContext {
        ObjectsContext::new(ObjectsConfig::multiprocessing(1, 4, maximum_global_objects)).unwrap()
    }

    fn global_semaphores(ctx: &ObjectsContext) -> ObjectInformation<u32> {
        ObjectInformation::new(
            ctx,
            ObjectClass::Semaphores,
            InformationFlags::NAMED | InformationFlags::GLOBAL,
            4,
        )
        .unwrap()
    }

    #[test]
    fn test_selector_raw_values() {
        assert_eq!(NodeSelector::from_raw(0), NodeSelector::AllNodes);
        assert_eq!(NodeSelector::from_raw(0x7FFF_FFFE), NodeSelector::OtherNodes);
        assert_eq!(NodeSelector::from_raw(0x7FFF_FFFF), NodeSelector::LocalNode);
        assert_eq!(NodeSelector::from_raw(3), NodeSelector::Node(3));
        assert_eq!(NodeSelector::Node(3).raw(), 3);
    }

    #[test]
    fn test_remote_id_classification() {
        let ctx = mp_context(8);
        let sems = global_semaphores(&ctx);
        let remote = build_id(2, 5);

        assert_eq!(sems.get(&ctx, remote).location(), Location::Error);
        sems.mp_open(&ctx, build_name(b'R', b'E', b'M', b'1'), remote).unwrap();
        assert_eq!(sems.get(&ctx, remote).location(), Location::Remote);
        assert_eq!(sems.mp_is_remote(&ctx, remote), Location::Remote);

        sems.mp_close(&ctx, remote).unwrap();
        assert_eq!(sems.get(&ctx, remote).location(), Location::Error);
        assert_eq!(sems.mp_close(&ctx, remote), Err(ObjectsError::InvalidId));
    }

    #[test]
    fn test_mp_open_rejects_bad_nodes() {
        let ctx = mp_context(8);
        let sems = global_semaphores(&ctx);
        let name = build_name(b'B', b'A', b'D', b' ');

        assert_eq!(sems.mp_open(&ctx, name, build_id(1, 1)), Err(ObjectsError::InvalidNode));
        assert_eq!(sems.mp_open(&ctx, name, build_id(5, 1)), Err(ObjectsError::InvalidNode));
        assert_eq!(sems.mp_open(&ctx, name, build_id(0, 1)), Err(ObjectsError::InvalidNode));
    }

    #[test]
    fn test_global_table_exhaustion() {
        let ctx = mp_context(2);
        let sems = global_semaphores(&ctx);
        let name = build_name(b'G', b'L', b'O', b'B');

        sems.mp_open(&ctx, name, build_id(2, 1)).unwrap();
        sems.mp_open(&ctx, name, build_id(3, 1)).unwrap();
        assert_eq!(sems.mp_open(&ctx, name, build_id(4, 1)), Err(ObjectsError::TooMany));

        // A local open that cannot be recorded globally fails and leaves
        // the pool untouched.
        let block = sems.allocate().unwrap();
        assert_eq!(block.open(&ctx, name), Err(ObjectsError::TooMany));
        let stats = sems.stats();
        assert_eq!(stats.inactive, 4);
        assert_eq!(stats.open, 0);
        assert_eq!(sems.allocate().unwrap().index(), 1);
    }

    #[test]
    fn test_local_objects_are_recorded_globally() {
        let ctx = mp_context(8);
        let sems = global_semaphores(&ctx);
        let name = build_name(b'L', b'O', b'C', b'1');

        let id = sems.allocate().unwrap().open(&ctx, name).unwrap();
        let stats = ctx.global_stats();
        assert_eq!(stats.active, 1);
        assert_eq!(stats.local, 1);

        let object = sems.get(&ctx, id).into_local().unwrap();
        object.close(&ctx).free();
        assert_eq!(ctx.global_stats().active, 0);
    }

    #[test]
    fn test_name_search_by_node() {
        let ctx = mp_context(8);
        let sems = global_semaphores(&ctx);
        let name = build_name(b'S', b'H', b'R', b'D');
        let local = sems.allocate().unwrap().open(&ctx, name).unwrap();
        let on_two = build_id(2, 1);
        let on_three = build_id(3, 1);
        sems.mp_open(&ctx, name, on_two).unwrap();
        sems.mp_open(&ctx, name, on_three).unwrap();

        assert_eq!(sems.name_to_id(&ctx, name, NodeSelector::AllNodes), Ok(local));
        assert_eq!(sems.name_to_id(&ctx, name, NodeSelector::LocalNode), Ok(local));
        assert_eq!(sems.name_to_id(&ctx, name, NodeSelector::OtherNodes), Ok(on_two));
        assert_eq!(sems.name_to_id(&ctx, name, NodeSelector::Node(3)), Ok(on_three));
        assert_eq!(
            sems.name_to_id(&ctx, name, NodeSelector::Node(4)),
            Err(ObjectsError::NotFound)
        );
        assert_eq!(
            sems.name_to_id(&ctx, name, NodeSelector::Node(9)),
            Err(ObjectsError::InvalidNode)
        );
    }

    struct SlowQuery {
        polls: AtomicU32,
        ready_after: u32,
        answer: ObjectId,
    }

    impl RemoteNameQuery for SlowQuery {
        fn query(&self, _: ObjectClass, _: ObjectName, _: NodeSelector) -> RemoteQueryStatus {
            let polls = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
            if polls >= self.ready_after {
                RemoteQueryStatus::Found(self.answer)
            } else {
                RemoteQueryStatus::Pending
            }
        }
    }

    #[test]
    fn test_remote_query_polling() {
        let answer = build_id(3, 7);
        let name = build_name(b'F', b'A', b'R', b' ');
        let config = ObjectsConfig::multiprocessing(1, 4, 8).with_remote_poll_attempts(4);

        let ctx = ObjectsContext::new(config).unwrap().with_remote_query(Box::new(SlowQuery {
            polls: AtomicU32::new(0),
            ready_after: 3,
            answer,
        }));
        let sems = global_semaphores(&ctx);
        assert_eq!(sems.name_to_id(&ctx, name, NodeSelector::AllNodes), Ok(answer));

        let ctx = ObjectsContext::new(config).unwrap().with_remote_query(Box::new(SlowQuery {
            polls: AtomicU32::new(0),
            ready_after: 10,
            answer,
        }));
        let sems = global_semaphores(&ctx);
        assert_eq!(
            sems.name_to_id(&ctx, name, NodeSelector::AllNodes),
            Err(ObjectsError::NotFound)
        );
    }
}
