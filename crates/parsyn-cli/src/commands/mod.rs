//! CLI command implementations.

pub mod common;
pub mod optimize;
pub mod random;
pub mod reduce;
pub mod topologies;
pub mod version;
