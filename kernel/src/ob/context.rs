//! Object Manager context
//!
//! Process-wide object manager state lives in one `ObjectsContext` that is
//! passed to every registry operation:
//!
//! - the local node number and node count
//! - the global table shared by all distributable classes
//! - the currently executing object (target of `OBJECTS_ID_OF_SELF`)
//! - the optional remote name query collaborator
//!
//! Several independent contexts may coexist, e.g. one per simulated node.

use alloc::boxed::Box;
use spin::Mutex;

use super::class::ObjectClass;
use super::error::{FatalError, ObjectsError};
use super::id::{ObjectId, OBJECTS_MAXIMUM_NODE};
use super::mp::{GlobalTable, GlobalTableStats, NodeSelector, RemoteNameQuery, RemoteQueryStatus};
use super::name::ObjectName;

/// Default number of polls of a pending remote name query
pub const DEFAULT_REMOTE_POLL_ATTEMPTS: u32 = 64;

/// Object manager configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectsConfig {
    /// Number of this node (1-based)
    pub local_node: u32,
    /// Number of nodes in the system
    pub maximum_nodes: u32,
    /// Capacity of the global table
    pub maximum_global_objects: u32,
    /// Polls of a pending remote name query before giving up
    pub remote_poll_attempts: u32,
}

impl ObjectsConfig {
    /// Single processor configuration
    pub const fn single_node() -> Self {
        Self {
            local_node: 1,
            maximum_nodes: 1,
            maximum_global_objects: 0,
            remote_poll_attempts: DEFAULT_REMOTE_POLL_ATTEMPTS,
        }
    }

    /// Multiprocessor configuration
    pub const fn multiprocessing(
        local_node: u32,
        maximum_nodes: u32,
        maximum_global_objects: u32,
    ) -> Self {
        Self {
            local_node,
            maximum_nodes,
            maximum_global_objects,
            remote_poll_attempts: DEFAULT_REMOTE_POLL_ATTEMPTS,
        }
    }

    pub const fn with_remote_poll_attempts(self, remote_poll_attempts: u32) -> Self {
        Self {
            remote_poll_attempts,
            ..self
        }
    }

    pub const fn is_multiprocessing(&self) -> bool {
        self.maximum_nodes > 1
    }
}

impl Default for ObjectsConfig {
    fn default() -> Self {
        Self::single_node()
    }
}

/// Process-wide object manager state
pub struct ObjectsContext {
    config: ObjectsConfig,
    global: Mutex<GlobalTable>,
    executing: Mutex<Option<(ObjectClass, ObjectId)>>,
    remote: Option<Box<dyn RemoteNameQuery>>,
}

impl ObjectsContext {
    /// Initialize the object handler
    ///
    /// # Errors
    /// `InvalidNode` if the local node is outside `1..=maximum_nodes`,
    /// `OutOfWorkspace` if the global table cannot be reserved.
    pub fn new(config: ObjectsConfig) -> Result<Self, FatalError> {
        if config.maximum_nodes == 0
            || config.maximum_nodes > OBJECTS_MAXIMUM_NODE
            || config.local_node == 0
            || config.local_node > config.maximum_nodes
        {
            log::error!(
                "[OB] Invalid node {} (maximum nodes {})",
                config.local_node,
                config.maximum_nodes
            );
            return Err(FatalError::InvalidNode {
                node: config.local_node,
                maximum_nodes: config.maximum_nodes,
            });
        }

        let global = GlobalTable::new(config.maximum_global_objects)?;

        log::info!(
            "[OB] Object handler initialized: node {}/{}, {} global objects",
            config.local_node,
            config.maximum_nodes,
            config.maximum_global_objects
        );

        Ok(Self {
            config,
            global: Mutex::new(global),
            executing: Mutex::new(None),
            remote: None,
        })
    }

    /// Install the collaborator used to ask other nodes for names
    pub fn with_remote_query(mut self, remote: Box<dyn RemoteNameQuery>) -> Self {
        self.remote = Some(remote);
        self
    }

    #[inline]
    pub fn config(&self) -> &ObjectsConfig {
        &self.config
    }

    #[inline]
    pub fn local_node(&self) -> u32 {
        self.config.local_node
    }

    #[inline]
    pub fn maximum_nodes(&self) -> u32 {
        self.config.maximum_nodes
    }

    #[inline]
    pub fn is_multiprocessing(&self) -> bool {
        self.config.is_multiprocessing()
    }

    /// Check if `node` is this node
    #[inline]
    pub fn is_local_node(&self, node: u32) -> bool {
        node == self.config.local_node
    }

    /// Check if `id` names an object on this node
    #[inline]
    pub fn is_local_id(&self, id: ObjectId) -> bool {
        self.is_local_node(id.node())
    }

    /// Record the object now executing (normally a task)
    pub fn set_executing(&self, executing: Option<(ObjectClass, ObjectId)>) {
        *self.executing.lock() = executing;
    }

    /// The object `OBJECTS_ID_OF_SELF` resolves to
    pub fn executing(&self) -> Option<(ObjectClass, ObjectId)> {
        *self.executing.lock()
    }

    /// Global table statistics
    pub fn global_stats(&self) -> GlobalTableStats {
        self.global.lock().stats(self.config.local_node)
    }

    #[inline]
    pub(super) fn global(&self) -> &Mutex<GlobalTable> {
        &self.global
    }

    /// Poll the remote query collaborator. Called with no lock held.
    pub(super) fn query_remote(
        &self,
        class: ObjectClass,
        name: ObjectName,
        selector: NodeSelector,
    ) -> Result<ObjectId, ObjectsError> {
        let Some(remote) = self.remote.as_deref() else {
            return Err(ObjectsError::NotFound);
        };

        for _ in 0..self.config.remote_poll_attempts {
            match remote.query(class, name, selector) {
                RemoteQueryStatus::Found(id) => return Ok(id),
                RemoteQueryStatus::NotFound => return Err(ObjectsError::NotFound),
                RemoteQueryStatus::Pending => core::hint::spin_loop(),
            }
        }

        log::warn!(
            "[OB-MP] {} name {} still pending after {} polls",
            class,
            name,
            self.config.remote_poll_attempts
        );
        Err(ObjectsError::NotFound)
    }
}
