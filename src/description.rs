//! Description Resolver
//!
//! Maps a stock code to its descriptive attributes through an ordered chain of
//! catalog tiers: primary catalog, then backup catalog, then the
//! "No Description Found" sentinel. Matching is exact string equality.

use crate::relations::{DescriptionEntry, RelationStore};
use tracing::debug;

pub const NOT_FOUND_DESCRIPTION: &str = "No Description Found";

/// One lookup tier in the resolution chain
pub trait DescriptionTier {
    fn name(&self) -> &str;

    fn lookup(&self, id: &str) -> Option<DescriptionEntry>;
}

/// Primary catalog: description, unit of issue and price
pub struct PrimaryCatalog<'a> {
    store: &'a RelationStore,
}

impl<'a> PrimaryCatalog<'a> {
    pub fn new(store: &'a RelationStore) -> Self {
        Self { store }
    }
}

impl DescriptionTier for PrimaryCatalog<'_> {
    fn name(&self) -> &str {
        "primary"
    }

    fn lookup(&self, id: &str) -> Option<DescriptionEntry> {
        self.store.primary_entry(id).cloned()
    }
}

/// Backup catalog: description only, unit and price come back empty
pub struct BackupCatalog<'a> {
    store: &'a RelationStore,
}

impl<'a> BackupCatalog<'a> {
    pub fn new(store: &'a RelationStore) -> Self {
        Self { store }
    }
}

impl DescriptionTier for BackupCatalog<'_> {
    fn name(&self) -> &str {
        "backup"
    }

    fn lookup(&self, id: &str) -> Option<DescriptionEntry> {
        self.store.backup_entry(id).map(|entry| DescriptionEntry {
            id: entry.id.clone(),
            description: entry.description.clone(),
            unit_of_issue: String::new(),
            price: String::new(),
        })
    }
}

/// Ordered tier chain ending in the not-found sentinel
pub struct DescriptionResolver<'a> {
    tiers: Vec<Box<dyn DescriptionTier + 'a>>,
}

impl<'a> DescriptionResolver<'a> {
    /// Primary then backup catalog of the given store
    pub fn new(store: &'a RelationStore) -> Self {
        Self::with_tiers(vec![
            Box::new(PrimaryCatalog::new(store)),
            Box::new(BackupCatalog::new(store)),
        ])
    }

    pub fn with_tiers(tiers: Vec<Box<dyn DescriptionTier + 'a>>) -> Self {
        Self { tiers }
    }

    /// Append a lower-priority tier
    pub fn push_tier(&mut self, tier: Box<dyn DescriptionTier + 'a>) {
        self.tiers.push(tier);
    }

    pub fn resolve(&self, terminal_id: &str) -> DescriptionEntry {
        for tier in &self.tiers {
            if let Some(entry) = tier.lookup(terminal_id) {
                debug!("Stock code {} resolved by {} catalog", terminal_id, tier.name());
                return entry;
            }
        }
        debug!("Stock code {} has no description", terminal_id);
        not_found(terminal_id)
    }
}

pub fn not_found(id: &str) -> DescriptionEntry {
    DescriptionEntry {
        id: id.to_string(),
        description: NOT_FOUND_DESCRIPTION.to_string(),
        unit_of_issue: String::new(),
        price: String::new(),
    }
}
