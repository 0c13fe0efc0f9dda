//! Object classes
//!
//! Each class has exactly one registry. The class is not part of the id;
//! it tags global table entries and the executing object.

use core::fmt;

/// Object class
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectClass {
    Tasks = 1,
    Timers = 2,
    Semaphores = 3,
    MessageQueues = 4,
    Partitions = 5,
    Regions = 6,
    Ports = 7,
    Periods = 8,
    Extensions = 9,
}

impl ObjectClass {
    /// Short name for logs and tooling
    pub const fn name(self) -> &'static str {
        match self {
            ObjectClass::Tasks => "Tasks",
            ObjectClass::Timers => "Timers",
            ObjectClass::Semaphores => "Semaphores",
            ObjectClass::MessageQueues => "MessageQueues",
            ObjectClass::Partitions => "Partitions",
            ObjectClass::Regions => "Regions",
            ObjectClass::Ports => "Ports",
            ObjectClass::Periods => "Periods",
            ObjectClass::Extensions => "Extensions",
        }
    }
}

impl fmt::Display for ObjectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
