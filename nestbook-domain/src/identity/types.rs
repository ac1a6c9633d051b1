use serde::{Deserialize, Serialize};
use std::fmt;

// --- Enums ---

/// The role on whose behalf notifications are polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorKind {
    User,
    Host,
    Admin,
    /// No active session was found for any role.
    None,
}

impl ActorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorKind::User => "user",
            ActorKind::Host => "host",
            ActorKind::Admin => "admin",
            ActorKind::None => "none",
        }
    }
}

impl fmt::Display for ActorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Identifiers ---

/// Role-specific identifier taken from a session record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActorId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

// --- Descriptor ---

/// The single actor a resolution settled on.
///
/// Descriptors are values: a route change produces a new one instead of
/// mutating the previous one. `kind == None` if and only if `id` is absent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActorDescriptor {
    kind: ActorKind,
    id: Option<ActorId>,
}

impl ActorDescriptor {
    /// Builds a descriptor for an active role. `ActorKind::None` yields [`ActorDescriptor::none`].
    pub fn new(kind: ActorKind, id: ActorId) -> Self {
        match kind {
            ActorKind::None => Self::none(),
            _ => Self { kind, id: Some(id) },
        }
    }

    pub fn none() -> Self {
        Self { kind: ActorKind::None, id: None }
    }

    pub fn user(id: impl Into<String>) -> Self {
        Self::new(ActorKind::User, ActorId::new(id))
    }

    pub fn host(id: impl Into<String>) -> Self {
        Self::new(ActorKind::Host, ActorId::new(id))
    }

    pub fn admin(id: impl Into<String>) -> Self {
        Self::new(ActorKind::Admin, ActorId::new(id))
    }

    pub fn kind(&self) -> ActorKind {
        self.kind
    }

    pub fn id(&self) -> Option<&ActorId> {
        self.id.as_ref()
    }

    pub fn is_none(&self) -> bool {
        self.kind == ActorKind::None
    }
}

impl Default for ActorDescriptor {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Display for ActorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{}:{}", self.kind, id),
            None => f.write_str("none"),
        }
    }
}
