//! Identity resolution: which actor the notification pipeline works for.
//!
//! - [`types`]: [`ActorKind`], [`ActorId`] and the immutable [`ActorDescriptor`].
//! - [`session`]: parsing of the per-role session blobs and the [`SessionRecordProvider`] port.
//! - [`resolver`]: the ordered [`ResolutionRule`] list and [`IdentityResolver`].

pub mod resolver;
pub mod session;
pub mod types;

pub use resolver::{IdentityResolver, ResolutionRule};
pub use session::{InMemorySessionRecords, SessionParseError, SessionRecord, SessionRecordProvider};
pub use types::{ActorDescriptor, ActorId, ActorKind};
