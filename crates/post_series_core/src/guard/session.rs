//! Guard contract and in-process session guard.
//!
//! # Invariants
//! - Tokens are derived from the session id and the action, so a token for
//!   one action never verifies for another.
//! - `EditPosts` implies `EditPost(id)` for every item.

use crate::error::ErrorKind;
use crate::guard::capability::{Capability, NonceAction};
use log::warn;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Request-scoped authorization supplied by the hosting environment.
pub trait RequestGuard {
    /// Returns whether `token` is the valid anti-forgery token for `action`.
    fn verify_nonce(&self, action: NonceAction, token: &str) -> bool;
    /// Returns whether the caller holds `capability`.
    fn current_user_can(&self, capability: Capability) -> bool;
}

/// Guard failure; always reported as permission denied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardError {
    MissingNonce(NonceAction),
    InvalidNonce(NonceAction),
    CapabilityDenied(Capability),
}

impl GuardError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::PermissionDenied
    }
}

impl Display for GuardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingNonce(action) => write!(f, "missing nonce for `{}`", action.as_str()),
            Self::InvalidNonce(action) => write!(f, "invalid nonce for `{}`", action.as_str()),
            Self::CapabilityDenied(capability) => write!(f, "permission denied: {capability}"),
        }
    }
}

impl Error for GuardError {}

/// Verifies the token for `action`, then the optional `capability`.
///
/// Token verification comes first so a forged request learns nothing about
/// the caller's capabilities.
pub fn authorize(
    guard: &impl RequestGuard,
    action: NonceAction,
    nonce: Option<&str>,
    capability: Option<Capability>,
) -> Result<(), GuardError> {
    let token = nonce.map(str::trim).filter(|value| !value.is_empty());
    let Some(token) = token else {
        warn!(
            "event=guard_check module=guard status=denied action={} reason=missing_nonce",
            action.as_str()
        );
        return Err(GuardError::MissingNonce(action));
    };

    if !guard.verify_nonce(action, token) {
        warn!(
            "event=guard_check module=guard status=denied action={} reason=invalid_nonce",
            action.as_str()
        );
        return Err(GuardError::InvalidNonce(action));
    }

    if let Some(capability) = capability {
        if !guard.current_user_can(capability) {
            warn!(
                "event=guard_check module=guard status=denied action={} reason=capability capability={}",
                action.as_str(),
                capability
            );
            return Err(GuardError::CapabilityDenied(capability));
        }
    }

    Ok(())
}

/// Session-bound guard holding a granted capability set.
#[derive(Debug, Clone)]
pub struct SessionGuard {
    session: Uuid,
    granted: BTreeSet<Capability>,
}

impl SessionGuard {
    /// Starts a fresh session with a random id and no capabilities.
    pub fn new() -> Self {
        Self::with_session(Uuid::new_v4())
    }

    /// Resumes a session with a known id, e.g. one shared with a front end.
    pub fn with_session(session: Uuid) -> Self {
        Self {
            session,
            granted: BTreeSet::new(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session
    }

    /// Grants one capability; returns `self` for chaining.
    pub fn grant(mut self, capability: Capability) -> Self {
        self.granted.insert(capability);
        self
    }

    /// Issues the token a client must send back for `action`.
    pub fn issue_nonce(&self, action: NonceAction) -> String {
        Uuid::new_v5(&self.session, action.as_str().as_bytes())
            .simple()
            .to_string()
    }
}

impl Default for SessionGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestGuard for SessionGuard {
    fn verify_nonce(&self, action: NonceAction, token: &str) -> bool {
        match Uuid::parse_str(token.trim()) {
            Ok(presented) => presented == Uuid::new_v5(&self.session, action.as_str().as_bytes()),
            Err(_) => false,
        }
    }

    fn current_user_can(&self, capability: Capability) -> bool {
        if self.granted.contains(&capability) {
            return true;
        }
        matches!(capability, Capability::EditPost(_))
            && self.granted.contains(&Capability::EditPosts)
    }
}
