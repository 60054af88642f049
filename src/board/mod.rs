//! Board primitives: the only code paths that issue Lua
//! scripts against the backend. Ordering, expiration propagation, and
//! previous-rank capture all live here; [`crate::query`] composes these
//! primitives into paginated/windowed results without touching the
//! backend directly except for the plain reads describes.

pub mod read;
pub mod scripts;
pub mod write;

pub use read::{get_member, get_members, top_percentage};
pub use write::{bulk_increment, bulk_set, into_member, WriteOptions, WriteOutcome, WriteRequest};
