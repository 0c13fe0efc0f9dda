//! Object Manager (ob)
//!
//! The object manager is the substrate every executive service uses for its
//! control blocks:
//!
//! - **Ids**: 32-bit node/index identifiers
//! - **Names**: four-character names packed into 32 bits
//! - **Information**: one registry per class with a fixed pool of blocks
//! - **Lifecycle**: allocate, open, close, free
//! - **Lookup**: id to object, enumeration, name to id
//! - **Multiprocessing**: global table and local/remote classification
//!
//! # Usage
//!
//! A create directive allocates a block, fills in its body and opens it
//! under a name. Directives that take an id call `get` first and act only
//! on a `Local` result. Delete closes the object, tears it down, then frees
//! the block.
//!
//! # Key Structures
//!
//! - `ObjectsContext`: node configuration, global table, executing object
//! - `ObjectInformation<T>`: per-class registry (pool, tables, free queue)
//! - `ControlBlock<T>`: `ObjectHeader` plus the class body

// Submodules
pub mod class;
pub mod context;
pub mod error;
pub mod header;
pub mod id;
pub mod information;
pub mod lifecycle;
pub mod lookup;
pub mod mp;
pub mod name;

// Re-exports for convenience
pub use class::ObjectClass;
pub use context::{ObjectsConfig, ObjectsContext, DEFAULT_REMOTE_POLL_ATTEMPTS};
pub use error::{FatalError, ObjectsError};
pub use header::{ControlBlock, ObjectHeader};
pub use id::{
    ObjectId, build_id, node_of, index_of, ids_equal, object_id_initial,
    OBJECTS_ID_OF_SELF, OBJECT_ID_FINAL, OBJECT_ID_INITIAL_INDEX, OBJECT_ID_FINAL_INDEX,
    OBJECTS_MAXIMUM_INDEX, OBJECTS_MAXIMUM_NODE,
};
pub use information::{InformationFlags, InformationStats, ObjectInformation};
pub use lifecycle::{Allocated, ObjectGuard};
pub use lookup::{Location, Lookup};
pub use mp::{
    GlobalObject, GlobalTableStats, NodeSelector, RemoteNameQuery, RemoteQueryStatus,
    SEARCH_ALL_NODES, SEARCH_LOCAL_NODE, SEARCH_OTHER_NODES, WHO_AM_I,
};
pub use name::{ObjectName, build_name, name_is_valid, name_to_characters};
