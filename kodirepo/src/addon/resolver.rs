//! Latest-version resolution across fresh add-ons.
//!
//! Fresh sources compete per identifier and only the newest survives.
//! Already-packaged archives never compete: every packaged version stays
//! listed in the repository.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tracing::{debug, info, warn};

use super::Addon;
use crate::version::VersionKey;

/// Outcome of offering a fresh add-on to the [`Resolver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Offer {
    /// First add-on seen with this identifier.
    Inserted,
    /// Replaced an older candidate.
    Replaced { previous: VersionKey },
    /// Dropped because an equal or newer candidate is held.
    Skipped { kept: VersionKey },
}

/// Holds the winning fresh add-on per identifier plus all packaged add-ons.
#[derive(Debug, Default)]
pub struct Resolver {
    latest: HashMap<String, Addon>,
    packaged: Vec<Addon>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve complete fresh and packaged sets in one go.
    pub fn resolve(
        fresh: impl IntoIterator<Item = Addon>,
        packaged: impl IntoIterator<Item = Addon>,
    ) -> Self {
        let mut resolver = Self::new();
        for addon in fresh {
            resolver.offer_fresh(addon);
        }
        for addon in packaged {
            resolver.add_packaged(addon);
        }
        resolver
    }

    /// Offer a fresh add-on; it wins only with a strictly greater version.
    pub fn offer_fresh(&mut self, addon: Addon) -> Offer {
        match self.latest.entry(addon.id().to_string()) {
            Entry::Vacant(slot) => {
                debug!(id = addon.id(), version = %addon.version(), "New add-on");
                slot.insert(addon);
                Offer::Inserted
            }
            Entry::Occupied(mut slot) => {
                let held = slot.get().version().clone();
                if addon.version().is_greater_than(&held) {
                    info!(
                        id = addon.id(),
                        previous = %held,
                        version = %addon.version(),
                        "Replacing add-on with newer version"
                    );
                    slot.insert(addon);
                    Offer::Replaced { previous: held }
                } else {
                    warn!(
                        path = %addon.source().path().display(),
                        kept = %held,
                        "Skipping add-on because a newer version is present"
                    );
                    Offer::Skipped { kept: held }
                }
            }
        }
    }

    /// Record an add-on that is already published.
    pub fn add_packaged(&mut self, addon: Addon) {
        debug!(id = addon.id(), version = %addon.version(), "Packaged add-on");
        self.packaged.push(addon);
    }

    /// Winning add-on for an identifier.
    pub fn winner(&self, id: &str) -> Option<&Addon> {
        self.latest.get(id)
    }

    /// Winning fresh add-ons ordered by identifier.
    pub fn fresh_winners(&self) -> Vec<&Addon> {
        let mut winners: Vec<&Addon> = self.latest.values().collect();
        winners.sort_by(|a, b| a.id().cmp(b.id()));
        winners
    }

    /// Packaged add-ons in the order they were added.
    pub fn packaged(&self) -> &[Addon] {
        &self.packaged
    }
}
