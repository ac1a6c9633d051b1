//! Route-aware actor resolution.
//!
//! The resolver is the only reader of the per-role session records. Everything
//! downstream receives the [`ActorDescriptor`] it produces.

use std::collections::HashMap;
use std::sync::Arc;

use nestbook_core::config::RoutesConfig;
use tracing::{debug, warn};

use super::session::{SessionParseError, SessionRecord, SessionRecordProvider};
use super::types::{ActorDescriptor, ActorId, ActorKind};

/// One step of the resolution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionRule {
    /// Applies when the path lies under `prefix` and a session for `kind` exists.
    RouteScoped { prefix: String, kind: ActorKind },
    /// Applies whenever a session for the kind exists, regardless of the path.
    Fallback(ActorKind),
}

impl ResolutionRule {
    /// Returns the kind this rule would resolve to for `path`, if the rule applies to it at all.
    fn candidate(&self, path: &str) -> Option<ActorKind> {
        match self {
            ResolutionRule::RouteScoped { prefix, kind } if path_has_prefix(path, prefix) => Some(*kind),
            ResolutionRule::RouteScoped { .. } => None,
            ResolutionRule::Fallback(kind) => Some(*kind),
        }
    }
}

/// `true` when `path` is `prefix` itself or continues it at a segment boundary.
/// An empty prefix never matches.
fn path_has_prefix(path: &str, prefix: &str) -> bool {
    if prefix.is_empty() {
        return false;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with(['/', '?', '#']),
        None => false,
    }
}

/// Decides which actor notifications are polled for.
pub struct IdentityResolver {
    rules: Vec<ResolutionRule>,
    sessions: Arc<dyn SessionRecordProvider>,
}

impl IdentityResolver {
    pub fn new(rules: Vec<ResolutionRule>, sessions: Arc<dyn SessionRecordProvider>) -> Self {
        Self { rules, sessions }
    }

    /// Resolver with the route prefixes from the configuration and the
    /// fixed fallback order host, user, admin.
    pub fn from_routes_config(routes: &RoutesConfig, sessions: Arc<dyn SessionRecordProvider>) -> Self {
        Self::new(Self::default_rules(routes), sessions)
    }

    /// Route-scoped rules for the admin, host and user areas, followed by the fallbacks.
    pub fn default_rules(routes: &RoutesConfig) -> Vec<ResolutionRule> {
        vec![
            ResolutionRule::RouteScoped { prefix: routes.admin_prefix.clone(), kind: ActorKind::Admin },
            ResolutionRule::RouteScoped { prefix: routes.host_prefix.clone(), kind: ActorKind::Host },
            ResolutionRule::RouteScoped { prefix: routes.user_prefix.clone(), kind: ActorKind::User },
            ResolutionRule::Fallback(ActorKind::Host),
            ResolutionRule::Fallback(ActorKind::User),
            ResolutionRule::Fallback(ActorKind::Admin),
        ]
    }

    /// Resolves `path` to a single actor, evaluating the rules top to bottom.
    ///
    /// Each role's session record is read at most once per call. Unusable
    /// records count as absent. Returns [`ActorDescriptor::none`] when no
    /// rule matches.
    pub fn resolve(&self, path: &str) -> ActorDescriptor {
        let mut seen: HashMap<ActorKind, Option<ActorId>> = HashMap::new();

        for rule in &self.rules {
            let Some(kind) = rule.candidate(path) else {
                continue;
            };
            if kind == ActorKind::None {
                continue;
            }
            let session_id = seen.entry(kind).or_insert_with(|| self.session_id(kind)).clone();
            if let Some(id) = session_id {
                let descriptor = ActorDescriptor::new(kind, id);
                debug!("[IdentityResolver] '{}' resolved to {} via {:?}", path, descriptor, rule);
                return descriptor;
            }
        }

        debug!("[IdentityResolver] '{}' resolved to no active session", path);
        ActorDescriptor::none()
    }

    fn session_id(&self, kind: ActorKind) -> Option<ActorId> {
        let raw = self.sessions.raw_record(kind)?;
        match SessionRecord::parse(kind, &raw) {
            Ok(record) => Some(record.actor_id),
            Err(e @ SessionParseError::MissingIdentifier(_)) => {
                debug!("[IdentityResolver] {}", e);
                None
            }
            Err(e) => {
                warn!("[IdentityResolver] Ignoring session record: {}", e);
                None
            }
        }
    }
}

impl std::fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityResolver").field("rules", &self.rules).finish_non_exhaustive()
    }
}
