//! Object Identifiers
//!
//! An object id is an opaque 32-bit value naming one control block:
//!
//! ```text
//!  31            16 15             0
//! +----------------+----------------+
//! |      node      |     index      |
//! +----------------+----------------+
//! ```
//!
//! - **node**: the processor that owns the object
//! - **index**: 1-based slot in the owning class's pool (0 is never assigned)
//!
//! The object class is not encoded; it is implied by the registry that
//! decodes the id.

use core::fmt;

/// Number of bits used by the index field
pub const OBJECTS_INDEX_BITS: u32 = 16;

/// Shift of the node field
pub const OBJECTS_NODE_SHIFT: u32 = OBJECTS_INDEX_BITS;

/// Mask of the index field (after shifting)
pub const OBJECTS_INDEX_MASK: u32 = 0x0000_FFFF;

/// Mask of the node field (after shifting)
pub const OBJECTS_NODE_MASK: u32 = 0x0000_FFFF;

/// Largest index a class may be configured with
pub const OBJECTS_MAXIMUM_INDEX: u32 = OBJECTS_INDEX_MASK;

/// Largest node number
pub const OBJECTS_MAXIMUM_NODE: u32 = OBJECTS_NODE_MASK;

/// Index passed to `get_next` to start an enumeration
pub const OBJECT_ID_INITIAL_INDEX: u32 = 0;

/// Largest index an enumeration can report
pub const OBJECT_ID_FINAL_INDEX: u32 = 0xFFFF;

/// Object identifier
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ObjectId(u32);

/// Id naming the calling task itself
pub const OBJECTS_ID_OF_SELF: ObjectId = ObjectId(0);

/// Id returned by `get_next` once an enumeration is exhausted
pub const OBJECT_ID_FINAL: ObjectId = ObjectId(!0);

impl ObjectId {
    /// Wrap a raw 32-bit id
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw 32-bit value
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Node portion of the id
    #[inline]
    pub const fn node(self) -> u32 {
        node_of(self)
    }

    /// Index portion of the id
    #[inline]
    pub const fn index(self) -> u32 {
        index_of(self)
    }

    /// True for the "self" sentinel
    #[inline]
    pub const fn is_self(self) -> bool {
        self.0 == OBJECTS_ID_OF_SELF.0
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({:#010x} node={} index={})", self.0, self.node(), self.index())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

impl From<ObjectId> for u32 {
    fn from(id: ObjectId) -> u32 {
        id.0
    }
}

/// Build an object id from its node and index
///
/// Both fields must fit in 16 bits.
#[inline]
pub const fn build_id(node: u32, index: u32) -> ObjectId {
    debug_assert!(node <= OBJECTS_NODE_MASK);
    debug_assert!(index <= OBJECTS_INDEX_MASK);
    ObjectId(((node & OBJECTS_NODE_MASK) << OBJECTS_NODE_SHIFT) | (index & OBJECTS_INDEX_MASK))
}

/// Extract the node field
#[inline]
pub const fn node_of(id: ObjectId) -> u32 {
    (id.0 >> OBJECTS_NODE_SHIFT) & OBJECTS_NODE_MASK
}

/// Extract the index field
#[inline]
pub const fn index_of(id: ObjectId) -> u32 {
    id.0 & OBJECTS_INDEX_MASK
}

/// Compare two ids
#[inline]
pub const fn ids_equal(left: ObjectId, right: ObjectId) -> bool {
    left.0 == right.0
}

/// First id of an enumeration on `node`
#[inline]
pub const fn object_id_initial(node: u32) -> ObjectId {
    build_id(node, OBJECT_ID_INITIAL_INDEX)
}
