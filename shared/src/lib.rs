pub mod location;
pub mod snapshot;
pub mod species;

pub use location::*;
pub use snapshot::*;
pub use species::*;

/// Snapshot format version - view collaborators must match this exactly
pub const SNAPSHOT_VERSION: u32 = 1;
