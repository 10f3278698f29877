//! Relation Store
//!
//! Holds the four cleaned relations (listings, breakdown edges, primary and backup
//! description catalogs) for the lifetime of the process. Built once from raw
//! tables, read-only afterwards.

use crate::error::Result;
use crate::identifier::{normalize_cell, stock_code_cell};
use crate::ingestion::{read_table, RawTable, SourcePaths};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};

/// Column names in the source exports
pub mod columns {
    pub const CU: &str = "CU";
    pub const CHILD_CU: &str = "CHILD CU";
    pub const STOCK_CODE: &str = "STOCK CODE";
    pub const QTY: &str = "QTY";

    pub const PRIMARY_ID: &str = "Stock Code1";
    pub const PRIMARY_DESCRIPTION: &str = "Description";
    pub const PRIMARY_UOI: &str = "UOI";
    pub const PRIMARY_PRICE: &str = "Price";

    pub const BACKUP_ID: &str = "SC_backup";
    pub const BACKUP_DESCRIPTION: &str = "backupDescrip";

    /// Component-code attribute of a listing record
    pub const LISTING_CU: &str = "Description 2";
}

/// One row of the breakdown relation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentEdge {
    pub parent_id: String,
    pub child_id: Option<String>,
    pub leaf_id: Option<String>,
    pub quantity: Option<f64>,
}

/// How the expansion engine treats an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind<'a> {
    /// Leaf present: the edge itself is a result (wins over a child id)
    Terminal(&'a str),
    /// Only a child id: expand further
    Descend(&'a str),
    /// Neither: skipped
    DeadEnd,
}

impl ComponentEdge {
    pub fn new(
        parent_id: impl Into<String>,
        child_id: Option<&str>,
        leaf_id: Option<&str>,
        quantity: Option<f64>,
    ) -> Self {
        Self {
            parent_id: parent_id.into(),
            child_id: child_id.map(str::to_string),
            leaf_id: leaf_id.map(str::to_string),
            quantity,
        }
    }

    pub fn kind(&self) -> EdgeKind<'_> {
        match (&self.leaf_id, &self.child_id) {
            (Some(leaf), _) => EdgeKind::Terminal(leaf),
            (None, Some(child)) => EdgeKind::Descend(child),
            (None, None) => EdgeKind::DeadEnd,
        }
    }
}

/// parent id -> edges in source order
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    edges_by_parent: HashMap<String, Vec<ComponentEdge>>,
    edge_count: usize,
}

impl ComponentRegistry {
    pub fn from_edges(edges: impl IntoIterator<Item = ComponentEdge>) -> Self {
        let mut edges_by_parent: HashMap<String, Vec<ComponentEdge>> = HashMap::new();
        let mut edge_count = 0;
        for edge in edges {
            edges_by_parent
                .entry(edge.parent_id.clone())
                .or_insert_with(Vec::new)
                .push(edge);
            edge_count += 1;
        }
        Self {
            edges_by_parent,
            edge_count,
        }
    }

    pub fn edges(&self, parent_id: &str) -> Option<&[ComponentEdge]> {
        self.edges_by_parent.get(parent_id).map(Vec::as_slice)
    }

    pub fn parent_count(&self) -> usize {
        self.edges_by_parent.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }
}

/// Primary catalog record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptionEntry {
    pub id: String,
    pub description: String,
    pub unit_of_issue: String,
    pub price: String,
}

/// Backup catalog record: description only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupDescriptionEntry {
    pub id: String,
    pub description: String,
}

/// A listing row. Columns are shared across all records of the relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRecord {
    columns: Arc<[String]>,
    values: Vec<String>,
}

impl ListingRecord {
    pub fn new(columns: Arc<[String]>, values: Vec<String>) -> Self {
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|idx| self.values.get(idx))
            .map(String::as_str)
    }

    /// The `Description 2` attribute
    pub fn component_code(&self) -> Option<&str> {
        self.get(columns::LISTING_CU)
    }
}

/// Which optional breakdown columns the source carried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BreakdownColumns {
    pub child_cu: bool,
    pub qty: bool,
}

/// The four relations after cleanup
#[derive(Debug, Clone, Default)]
pub struct RelationStore {
    listings: Vec<ListingRecord>,
    listing_columns: Vec<String>,
    registry: ComponentRegistry,
    breakdown_columns: BreakdownColumns,
    primary: HashMap<String, DescriptionEntry>,
    backup: HashMap<String, BackupDescriptionEntry>,
}

impl RelationStore {
    /// Build the store from raw tables, applying identifier cleanup
    pub fn from_tables(
        listings: RawTable,
        breakdowns: RawTable,
        primary: RawTable,
        backup: RawTable,
    ) -> Result<Self> {
        let (listing_columns, listings) = Self::clean_listings(listings);
        let (registry, breakdown_columns) = Self::build_registry(&breakdowns)?;
        let primary = Self::build_primary(&primary)?;
        let backup = Self::build_backup(&backup)?;

        info!(
            "Relation store ready: {} listings, {} edges under {} parents, {} primary / {} backup descriptions",
            listings.len(),
            registry.edge_count(),
            registry.parent_count(),
            primary.len(),
            backup.len()
        );

        Ok(Self {
            listings,
            listing_columns: listing_columns.to_vec(),
            registry,
            breakdown_columns,
            primary,
            backup,
        })
    }

    /// Read and build from located source files
    pub fn load(paths: &SourcePaths) -> Result<Self> {
        let listings = read_table(&paths.listings)?;
        let breakdowns = read_table(&paths.breakdowns)?;
        let primary = read_table(&paths.primary_descriptions)?;
        let backup = read_table(&paths.backup_descriptions)?;
        Self::from_tables(listings, breakdowns, primary, backup)
    }

    fn clean_listings(table: RawTable) -> (Arc<[String]>, Vec<ListingRecord>) {
        let keep: Vec<usize> = table
            .headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !is_presentation_column(h))
            .map(|(idx, _)| idx)
            .collect();

        let dropped = table.headers.len() - keep.len();
        if dropped > 0 {
            info!("Dropped {} presentation columns from listings", dropped);
        }

        let listing_columns: Arc<[String]> = keep
            .iter()
            .map(|&idx| table.headers[idx].clone())
            .collect::<Vec<_>>()
            .into();

        let records = table
            .rows
            .into_iter()
            .map(|row| {
                let values = keep
                    .iter()
                    .map(|&idx| row.get(idx).cloned().unwrap_or_default())
                    .collect();
                ListingRecord::new(Arc::clone(&listing_columns), values)
            })
            .collect();

        (listing_columns, records)
    }

    fn build_registry(table: &RawTable) -> Result<(ComponentRegistry, BreakdownColumns)> {
        let cu_idx = table.require_column("breakdowns", columns::CU)?;
        let leaf_idx = table.require_column("breakdowns", columns::STOCK_CODE)?;
        let child_idx = table.column_index(columns::CHILD_CU);
        let qty_idx = table.column_index(columns::QTY);

        if table.is_empty() {
            warn!("Breakdown relation has no rows, every CU will expand to nothing");
        }

        let mut edges = Vec::with_capacity(table.len());
        for (line, row) in table.rows.iter().enumerate() {
            let Some(parent_id) = normalize_cell(RawTable::cell(row, Some(cu_idx))) else {
                warn!("Breakdown row {} has no CU, skipped", line + 1);
                continue;
            };
            let quantity = match RawTable::cell(row, qty_idx) {
                None => None,
                Some(raw) => match raw.parse::<f64>() {
                    Ok(q) if q.is_finite() => Some(q),
                    _ => {
                        warn!("Breakdown row {} has non-numeric QTY '{}'", line + 1, raw);
                        None
                    }
                },
            };
            edges.push(ComponentEdge {
                parent_id,
                child_id: normalize_cell(RawTable::cell(row, child_idx)),
                leaf_id: stock_code_cell(RawTable::cell(row, Some(leaf_idx))),
                quantity,
            });
        }

        let columns = BreakdownColumns {
            child_cu: child_idx.is_some(),
            qty: qty_idx.is_some(),
        };
        Ok((ComponentRegistry::from_edges(edges), columns))
    }

    fn build_primary(table: &RawTable) -> Result<HashMap<String, DescriptionEntry>> {
        let id_idx = table.require_column("primary descriptions", columns::PRIMARY_ID)?;
        let desc_idx = table.require_column("primary descriptions", columns::PRIMARY_DESCRIPTION)?;
        let uoi_idx = table.column_index(columns::PRIMARY_UOI);
        let price_idx = table.column_index(columns::PRIMARY_PRICE);

        let mut catalog = HashMap::new();
        for row in &table.rows {
            let Some(id) = stock_code_cell(RawTable::cell(row, Some(id_idx))) else {
                continue;
            };
            let text = |idx| RawTable::cell(row, idx).unwrap_or("").to_string();
            catalog.entry(id.clone()).or_insert_with(|| DescriptionEntry {
                id,
                description: text(Some(desc_idx)),
                unit_of_issue: text(uoi_idx),
                price: text(price_idx),
            });
        }
        Ok(catalog)
    }

    fn build_backup(table: &RawTable) -> Result<HashMap<String, BackupDescriptionEntry>> {
        let id_idx = table.require_column("backup descriptions", columns::BACKUP_ID)?;
        let desc_idx = table.require_column("backup descriptions", columns::BACKUP_DESCRIPTION)?;

        let mut catalog = HashMap::new();
        for row in &table.rows {
            let Some(id) = RawTable::cell(row, Some(id_idx)).map(str::to_string) else {
                continue;
            };
            let description = RawTable::cell(row, Some(desc_idx)).unwrap_or("").to_string();
            catalog
                .entry(id.clone())
                .or_insert_with(|| BackupDescriptionEntry { id, description });
        }
        Ok(catalog)
    }

    pub fn listings(&self) -> &[ListingRecord] {
        &self.listings
    }

    pub fn listing_columns(&self) -> &[String] {
        &self.listing_columns
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn breakdown_columns(&self) -> BreakdownColumns {
        self.breakdown_columns
    }

    pub fn primary_entry(&self, id: &str) -> Option<&DescriptionEntry> {
        self.primary.get(id)
    }

    pub fn backup_entry(&self, id: &str) -> Option<&BackupDescriptionEntry> {
        self.backup.get(id)
    }
}

/// Index-echo and unnamed columns left behind by spreadsheet exports
fn is_presentation_column(header: &str) -> bool {
    header.is_empty() || header.contains("Unnamed:")
}

/// Load-once holder for the relation store
#[derive(Debug, Default)]
pub struct RelationCache {
    store: OnceLock<Arc<RelationStore>>,
}

impl RelationCache {
    pub const fn new() -> Self {
        Self {
            store: OnceLock::new(),
        }
    }

    /// Return the cached store, running `load` only on the first call
    pub fn get_or_load<F>(&self, load: F) -> Result<Arc<RelationStore>>
    where
        F: FnOnce() -> Result<RelationStore>,
    {
        if let Some(store) = self.store.get() {
            return Ok(Arc::clone(store));
        }
        let loaded = Arc::new(load()?);
        Ok(Arc::clone(self.store.get_or_init(|| loaded)))
    }

    pub fn is_loaded(&self) -> bool {
        self.store.get().is_some()
    }
}

static PROCESS_RELATIONS: RelationCache = RelationCache::new();

/// The process-wide cache: sources are read once per run
pub fn load_relations(paths: &SourcePaths) -> Result<Arc<RelationStore>> {
    PROCESS_RELATIONS.get_or_load(|| RelationStore::load(paths))
}
