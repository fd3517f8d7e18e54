//! Operations shared by the commands.

pub mod install;
pub mod resolve;
