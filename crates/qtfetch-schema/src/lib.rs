//! Shared types for qtfetch.
//!
//! Everything here is plain data: the target triple a user asks for, the
//! dotted SDK version, and the validated manifest records the resolution
//! engine in `qtfetch-core` produces and consumes.

pub mod hash;
pub mod host;
pub mod types;
pub mod version;

// Re-exports
pub use hash::*;
pub use host::*;
pub use types::*;
pub use version::*;

/// Value every trusted `Updates.xml` carries in `ApplicationName`.
pub const APPLICATION_NAME: &str = "{AnyApplication}";

/// Value every trusted `Updates.xml` carries in `ApplicationVersion`.
pub const APPLICATION_VERSION: &str = "1.0.0";

/// Value every trusted `Updates.xml` carries in `Checksum`.
pub const CHECKSUM: &str = "true";
