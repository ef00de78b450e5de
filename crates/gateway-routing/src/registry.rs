//! Active routing profile set.
//!
//! The active set is an immutable [`ProfileSnapshot`] behind a single
//! [`ArcSwap`]. Readers load the current snapshot without locking; a
//! replacement is validated in full before it is swapped in, so readers only
//! ever see complete, valid sets.

use crate::backends::ConfiguredProviders;
use crate::error::RoutingResult;
use crate::profile::RoutingProfile;
use crate::validator::validate_profiles;
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{info, warn};

/// An immutable, validated profile set
#[derive(Debug, Default)]
pub struct ProfileSnapshot {
    profiles: Vec<Arc<RoutingProfile>>,
    version: u64,
}

impl ProfileSnapshot {
    /// Monotonic version, 0 for the initial empty set
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Profiles in declared order
    #[must_use]
    pub fn profiles(&self) -> &[Arc<RoutingProfile>] {
        &self.profiles
    }

    /// Number of profiles
    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Whether the set is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// First enabled profile whose alias matches, in declared order
    #[must_use]
    pub fn find_by_alias(&self, alias: &str) -> Option<Arc<RoutingProfile>> {
        self.profiles
            .iter()
            .find(|p| p.enabled && p.matches_alias(alias))
            .cloned()
    }

    /// First enabled profile bound to the virtual key, in declared order
    #[must_use]
    pub fn find_by_virtual_key_id(&self, virtual_key_id: &str) -> Option<Arc<RoutingProfile>> {
        self.profiles
            .iter()
            .find(|p| p.enabled && p.matches_virtual_key(virtual_key_id))
            .cloned()
    }

    /// Owned copy of the profiles, e.g. for export or simulation
    #[must_use]
    pub fn to_vec(&self) -> Vec<RoutingProfile> {
        self.profiles.iter().map(|p| RoutingProfile::clone(p)).collect()
    }
}

/// Process-wide holder of the active profile set
pub struct ProfileRegistry {
    active: ArcSwap<ProfileSnapshot>,
    providers: Arc<dyn ConfiguredProviders>,
    writer: Mutex<()>,
}

impl ProfileRegistry {
    /// Create an empty registry validating aliases against `providers`
    pub fn new(providers: Arc<dyn ConfiguredProviders>) -> Self {
        Self {
            active: ArcSwap::from_pointee(ProfileSnapshot::default()),
            providers,
            writer: Mutex::new(()),
        }
    }

    /// Validate `profiles` and, only if valid, publish them as the active set.
    ///
    /// # Errors
    /// Returns the first validation error; the active set is left untouched
    pub fn replace(&self, profiles: Vec<RoutingProfile>) -> RoutingResult<u64> {
        let _writer = self.writer.lock();

        if let Err(e) = validate_profiles(&profiles, self.providers.as_ref()) {
            warn!(
                error = %e,
                active_version = self.active.load().version,
                "Rejected routing profile set; keeping active set"
            );
            return Err(e);
        }

        let version = self.active.load().version + 1;
        let count = profiles.len();
        self.active.store(Arc::new(ProfileSnapshot {
            profiles: profiles.into_iter().map(Arc::new).collect(),
            version,
        }));

        info!(profiles = count, version, "Routing profile set published");
        Ok(version)
    }

    /// Current snapshot
    #[must_use]
    pub fn snapshot(&self) -> Arc<ProfileSnapshot> {
        self.active.load_full()
    }

    /// First enabled profile whose alias matches
    #[must_use]
    pub fn find_by_alias(&self, alias: &str) -> Option<Arc<RoutingProfile>> {
        self.active.load().find_by_alias(alias)
    }

    /// First enabled profile bound to the virtual key
    #[must_use]
    pub fn find_by_virtual_key_id(&self, virtual_key_id: &str) -> Option<Arc<RoutingProfile>> {
        self.active.load().find_by_virtual_key_id(virtual_key_id)
    }

    /// Configured real providers the registry validates against
    #[must_use]
    pub fn providers(&self) -> &Arc<dyn ConfiguredProviders> {
        &self.providers
    }
}

impl std::fmt::Debug for ProfileRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.active.load();
        f.debug_struct("ProfileRegistry")
            .field("version", &snapshot.version)
            .field("profiles", &snapshot.len())
            .finish()
    }
}
