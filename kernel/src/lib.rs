//! rtexec Object Manager
//!
//! The generic object substrate of a real-time executive. Every kernel
//! service (tasks, semaphores, message queues, timers, partitions, regions)
//! keeps its control blocks in a per-class registry provided here.
//!
//! # Subsystems
//!
//! - **ob** - Object Manager: ids, names, registries, lookup, multiprocessing
//! - **ex** - Executive directive shell: create/ident/delete sequences that
//!   every concrete manager runs on top of the object manager
//!
//! # Initialization
//!
//! An [`ob::ObjectsContext`] is built once per kernel instance from an
//! [`ob::ObjectsConfig`]. Registries are then created per class against that
//! context and every registry operation takes the context explicitly.

#![cfg_attr(not(test), no_std)]
#![allow(clippy::new_without_default)]
#![allow(clippy::result_unit_err)]

extern crate alloc;

pub mod ex;
pub mod ob;
