//! Collision guard for handle changes
//!
//! [`CollisionGuard::check`] is called once per handle-change request,
//! before the host commits the change:
//!
//! 1. A proposal equivalent to the requester's current handle is accepted
//!    without scanning (changing case or representation of one's own
//!    handle is always allowed).
//! 2. Otherwise the registry is scanned and the first equivalent handle
//!    rejects the proposal with [`RejectReason::HandleInUse`].
//! 3. A full scan without a match accepts.
//!
//! The active rules live in an immutable [`GuardSnapshot`]. A reload builds
//! a new snapshot completely and swaps it in under a write lock, so a check
//! always runs against one whole generation.

use crate::canonical::decode_handle;
use crate::config::GuardConfig;
use crate::error::{ConfigError, ConversionFailure};
use crate::identity::IdentityComparator;
use crate::registry::HandleRegistry;
use parking_lot::RwLock;
use serde::Serialize;
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// Outcome of a collision check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    /// Host may apply the change
    Accept,

    /// Host must refuse the change
    Reject(Rejection),
}

impl Verdict {
    /// Whether the change may proceed
    #[inline]
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accept)
    }

    /// Rejection details, if rejected
    #[inline]
    #[must_use]
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Accept => None,
            Self::Reject(rejection) => Some(rejection),
        }
    }

    /// Convert into `Result` for `?` propagation in hosts
    ///
    /// # Errors
    /// The [`Rejection`] when the verdict is [`Verdict::Reject`].
    #[inline]
    pub fn into_result(self) -> Result<(), Rejection> {
        match self {
            Self::Accept => Ok(()),
            Self::Reject(rejection) => Err(rejection),
        }
    }
}

/// Why a handle change was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// An existing handle is equivalent to the proposal
    HandleInUse,
}

impl Display for RejectReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::HandleInUse => f.write_str("handle is already in use"),
        }
    }
}

/// Refused handle change, naming the handle it collided with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{proposed}: {reason} (collides with {conflicting})")]
pub struct Rejection {
    /// Reason code
    pub reason: RejectReason,

    /// Handle that was requested
    pub proposed: String,

    /// Existing handle judged equivalent
    pub conflicting: String,
}

impl Rejection {
    /// Create a handle-in-use rejection
    #[must_use]
    pub fn handle_in_use(proposed: impl Into<String>, conflicting: impl Into<String>) -> Self {
        Self {
            reason: RejectReason::HandleInUse,
            proposed: proposed.into(),
            conflicting: conflicting.into(),
        }
    }
}

/// One immutable configuration generation
#[derive(Debug)]
pub struct GuardSnapshot {
    generation: u64,
    identity: IdentityComparator,
}

impl GuardSnapshot {
    /// Wrap an identity comparator as generation `generation`
    #[inline]
    #[must_use]
    pub fn new(generation: u64, identity: IdentityComparator) -> Self {
        Self {
            generation,
            identity,
        }
    }

    /// Generation number, starting at 1 for the first activation
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Equivalence rules of this generation
    #[inline]
    #[must_use]
    pub fn identity(&self) -> &IdentityComparator {
        &self.identity
    }

    /// Check a proposal against any iterable of handles
    #[must_use]
    pub fn check_iter<I, S>(&self, proposed: &str, current_owner: &str, registry: I) -> Verdict
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let canonical = self.fold_proposed(proposed);

        if self.same_handle(proposed, canonical.as_deref(), current_owner) {
            tracing::trace!(proposed, current_owner, "self-rename accepted");
            return Verdict::Accept;
        }

        for existing in registry {
            let existing = existing.as_ref();
            if self.same_handle(proposed, canonical.as_deref(), existing) {
                return self.reject(proposed, existing);
            }
        }

        Verdict::Accept
    }

    /// Check raw handle bytes from a wire-level host
    ///
    /// A proposal that is not UTF-8 can only collide with a byte-identical
    /// registry entry. Registry entries that are not UTF-8 never match a
    /// UTF-8 proposal.
    #[must_use]
    pub fn check_bytes<I, S>(&self, proposed: &[u8], current_owner: &[u8], registry: I) -> Verdict
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let proposed_str = match decode_handle(proposed) {
            Ok(p) => p,
            Err(failure) => {
                tracing::debug!(%failure, "proposed handle not decodable, only exact duplicates collide");
                return self.check_exact_bytes(proposed, current_owner, registry);
            }
        };

        let canonical = self.fold_proposed(proposed_str);

        let self_rename = decode_handle(current_owner)
            .is_ok_and(|owner| self.same_handle(proposed_str, canonical.as_deref(), owner));
        if self_rename {
            tracing::trace!(proposed = proposed_str, "self-rename accepted");
            return Verdict::Accept;
        }

        for existing in registry {
            let Ok(existing) = decode_handle(existing.as_ref()) else {
                continue;
            };
            if self.same_handle(proposed_str, canonical.as_deref(), existing) {
                return self.reject(proposed_str, existing);
            }
        }

        Verdict::Accept
    }

    /// Byte-exact scan for a proposal that cannot be decoded
    fn check_exact_bytes<I, S>(&self, proposed: &[u8], current_owner: &[u8], registry: I) -> Verdict
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        if proposed == current_owner {
            return Verdict::Accept;
        }

        for existing in registry {
            if existing.as_ref() == proposed {
                let existing = String::from_utf8_lossy(existing.as_ref()).into_owned();
                return self.reject(&String::from_utf8_lossy(proposed), &existing);
            }
        }

        Verdict::Accept
    }

    /// Canonical form of the proposal, `None` when it cannot be folded
    fn fold_proposed(&self, proposed: &str) -> Option<String> {
        match self.identity.canonicalize(proposed) {
            Ok(canonical) => Some(canonical),
            Err(failure) => {
                tracing::debug!(
                    proposed,
                    %failure,
                    "proposed handle not canonicalizable, only exact duplicates collide"
                );
                None
            }
        }
    }

    /// `equivalent(proposed, other)` with the proposal already folded
    fn same_handle(&self, proposed: &str, canonical: Option<&str>, other: &str) -> bool {
        if proposed == other {
            return true;
        }
        canonical.is_some_and(|c| self.identity.equivalent_to_canonical(c, other))
    }

    fn reject(&self, proposed: &str, existing: &str) -> Verdict {
        tracing::debug!(
            proposed,
            conflicting = existing,
            generation = self.generation,
            "handle change rejected"
        );
        Verdict::Reject(Rejection::handle_in_use(proposed, existing))
    }
}

/// Entry point used by the host on every handle-change request
///
/// Holds the active [`GuardSnapshot`]; checks read it, reloads replace it.
#[derive(Debug)]
pub struct CollisionGuard {
    active: RwLock<Arc<GuardSnapshot>>,
}

impl CollisionGuard {
    /// Activate an already-built identity comparator as generation 1
    #[must_use]
    pub fn new(identity: IdentityComparator) -> Self {
        Self {
            active: RwLock::new(Arc::new(GuardSnapshot::new(1, identity))),
        }
    }

    /// Validate `config` and activate it as generation 1
    ///
    /// # Errors
    /// Any [`ConfigError`]; the guard is not created.
    pub fn from_config(config: &GuardConfig) -> Result<Self, ConfigError> {
        let identity = config.build()?;
        let guard = Self::new(identity);
        tracing::info!(
            generation = 1,
            groups = config.groups.len(),
            strength = %config.strength,
            "handle guard activated"
        );
        Ok(guard)
    }

    /// Current generation
    ///
    /// The returned snapshot stays valid even if a reload happens while it
    /// is held.
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> Arc<GuardSnapshot> {
        Arc::clone(&*self.active.read())
    }

    /// Active generation number
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.active.read().generation()
    }

    /// Replace the active rules with a freshly built generation
    ///
    /// The new comparator is built before the lock is taken; on error the
    /// previous generation stays active.
    ///
    /// # Errors
    /// Any [`ConfigError`] from building `config`.
    pub fn reload(&self, config: &GuardConfig) -> Result<u64, ConfigError> {
        let identity = config.build()?;

        let mut active = self.active.write();
        let generation = active.generation() + 1;
        *active = Arc::new(GuardSnapshot::new(generation, identity));
        drop(active);

        tracing::info!(
            generation,
            groups = config.groups.len(),
            strength = %config.strength,
            "handle guard reloaded"
        );
        Ok(generation)
    }

    /// Decide whether `proposed` may replace `current_owner`
    #[must_use]
    pub fn check<R>(&self, proposed: &str, current_owner: &str, registry: &R) -> Verdict
    where
        R: HandleRegistry + ?Sized,
    {
        self.snapshot()
            .check_iter(proposed, current_owner, registry.handles())
    }

    /// [`CollisionGuard::check`] over any iterable of handles
    #[must_use]
    pub fn check_iter<I, S>(&self, proposed: &str, current_owner: &str, registry: I) -> Verdict
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.snapshot().check_iter(proposed, current_owner, registry)
    }

    /// [`CollisionGuard::check`] over raw bytes
    #[must_use]
    pub fn check_bytes<I, S>(&self, proposed: &[u8], current_owner: &[u8], registry: I) -> Verdict
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        self.snapshot()
            .check_bytes(proposed, current_owner, registry)
    }

    /// Whether two handles are equivalent under the active rules
    #[must_use]
    pub fn equivalent(&self, a: &str, b: &str) -> bool {
        self.snapshot().identity().equivalent(a, b)
    }

    /// Canonical form of `handle` under the active rules
    ///
    /// # Errors
    /// See [`crate::Canonicalizer::canonicalize`].
    pub fn canonical_form(&self, handle: &str) -> Result<String, ConversionFailure> {
        self.snapshot().identity().canonicalize(handle)
    }
}
