//! # Storage Backends
//!
//! Implementazioni concrete degli handle:
//! - `local`: filesystem locale via `tokio::fs`
//! - `memory`: albero in memoria per test e dry run

pub mod local;
pub mod memory;

pub use local::{LocalDirectory, LocalFile};
pub use memory::{MemoryDirectory, MemoryFile};
