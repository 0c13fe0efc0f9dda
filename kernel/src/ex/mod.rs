//! Executive (ex)
//!
//! Directive layer shared by the concrete managers. Each manager wraps its
//! class registry in a `ClassManager` and gets the standard create, ident,
//! delete and id-dispatch sequences from it.

pub mod manager;

pub use manager::{ClassManager, Dispatch};
