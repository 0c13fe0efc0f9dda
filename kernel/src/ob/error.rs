//! Object Manager error types

use core::fmt;

/// Errors returned by object manager operations and directives.
///
/// None of these are fatal, and every operation that returns one leaves
/// the registry exactly as it found it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectsError {
    /// Id decodes to an index out of range or to an empty slot
    InvalidId,
    /// Name is zero or otherwise unusable
    InvalidName,
    /// Name search exhausted without a match
    NotFound,
    /// Pool (local or global) exhausted
    TooMany,
    /// Class is not configured in this build
    NotConfigured,
    /// Node is outside the configured node range
    InvalidNode,
    /// Object is held by another context
    InUse,
}

impl ObjectsError {
    /// Classic executive status code for this error
    pub const fn status_code(self) -> u32 {
        match self {
            ObjectsError::InvalidName => 3,
            ObjectsError::InvalidId => 4,
            ObjectsError::TooMany => 5,
            // Name searches report an unknown name as an invalid one.
            ObjectsError::NotFound => 3,
            ObjectsError::InvalidNode => 21,
            ObjectsError::NotConfigured => 22,
            ObjectsError::InUse => 12,
        }
    }
}

impl fmt::Display for ObjectsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ObjectsError::InvalidId => "invalid object id",
            ObjectsError::InvalidName => "invalid object name",
            ObjectsError::NotFound => "object name not found",
            ObjectsError::TooMany => "too many objects",
            ObjectsError::NotConfigured => "object class not configured",
            ObjectsError::InvalidNode => "invalid node",
            ObjectsError::InUse => "object in use",
        };
        f.write_str(msg)
    }
}

/// Configuration faults detected while initializing the object manager.
///
/// These happen once at boot and are not recoverable; the caller is
/// expected to halt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalError {
    /// Local node is zero or larger than the node count
    InvalidNode { node: u32, maximum_nodes: u32 },
    /// Backing storage for a pool or table could not be obtained
    OutOfWorkspace,
    /// Configured maximum does not fit the id's index field
    TooManyObjects { maximum: u32 },
}

impl fmt::Display for FatalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FatalError::InvalidNode { node, maximum_nodes } => {
                write!(f, "invalid local node {} (maximum nodes {})", node, maximum_nodes)
            }
            FatalError::OutOfWorkspace => f.write_str("out of workspace"),
            FatalError::TooManyObjects { maximum } => {
                write!(f, "class maximum {} exceeds the id index field", maximum)
            }
        }
    }
}
