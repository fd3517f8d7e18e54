//! Command implementations.

pub mod install;
pub mod modules;
pub mod resolve;
pub mod versions;
