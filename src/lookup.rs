//! Lookup Facade
//!
//! The operations the presentation layer needs: free-text search over listings,
//! and "expand this CU and describe every stock code" for a chosen CU.

use crate::description::DescriptionResolver;
use crate::error::Result;
use crate::hierarchy::HierarchyExpander;
use crate::identifier::normalize_id;
use crate::observability::AuditSink;
use crate::relations::{
    BreakdownColumns, ComponentEdge, DescriptionEntry, ListingRecord, RelationStore,
};
use serde::Serialize;
use tracing::{info, warn};

/// A terminal breakdown edge joined with its description
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedLeaf {
    pub edge: ComponentEdge,
    pub description: String,
    pub unit_of_issue: String,
    pub price: String,
}

impl ResolvedLeaf {
    pub fn new(edge: ComponentEdge, entry: DescriptionEntry) -> Self {
        Self {
            edge,
            description: entry.description,
            unit_of_issue: entry.unit_of_issue,
            price: entry.price,
        }
    }

    /// The CU row this stock code was listed under
    pub fn cu(&self) -> &str {
        &self.edge.parent_id
    }

    pub fn child_cu(&self) -> Option<&str> {
        self.edge.child_id.as_deref()
    }

    pub fn stock_code(&self) -> &str {
        self.edge.leaf_id.as_deref().unwrap_or("")
    }

    pub fn quantity(&self) -> Option<f64> {
        self.edge.quantity
    }
}

/// Legend and resolved breakdown for one CU
#[derive(Debug, Clone)]
pub struct CuLookupResult {
    pub cu_id: String,
    pub legend: Vec<ListingRecord>,
    pub breakdown: Vec<ResolvedLeaf>,
    /// Optional breakdown columns present in the source, for export
    pub columns: BreakdownColumns,
}

pub struct CuLookup<'a> {
    store: &'a RelationStore,
    resolver: DescriptionResolver<'a>,
    audit: Option<&'a dyn AuditSink>,
}

impl<'a> CuLookup<'a> {
    pub fn new(store: &'a RelationStore) -> Self {
        Self {
            store,
            resolver: DescriptionResolver::new(store),
            audit: None,
        }
    }

    /// Report every search to `audit`
    pub fn with_audit(store: &'a RelationStore, audit: &'a dyn AuditSink) -> Self {
        Self {
            audit: Some(audit),
            ..Self::new(store)
        }
    }

    /// Case-insensitive substring match against every attribute of every
    /// listing. An empty query matches everything.
    pub fn search(&self, query: &str) -> Vec<&'a ListingRecord> {
        if let Some(audit) = self.audit {
            if let Err(e) = audit.record_search(query) {
                warn!("Failed to record search audit entry: {}", e);
            }
        }

        let needle = query.to_lowercase();
        let results: Vec<&ListingRecord> = self
            .store
            .listings()
            .iter()
            .filter(|record| {
                record
                    .values()
                    .iter()
                    .any(|value| value.to_lowercase().contains(&needle))
            })
            .collect();
        info!("Search '{}' matched {} listings", query, results.len());
        results
    }

    /// Listing records whose component code equals `cu_id`, in stored order
    pub fn legend(&self, cu_id: &str) -> Vec<&'a ListingRecord> {
        let cu_id = cu_id.trim();
        self.store
            .listings()
            .iter()
            .filter(|record| record.component_code() == Some(cu_id))
            .collect()
    }

    /// Terminal edges under `cu_id`. The id is normalized the way breakdown
    /// parents were at load time, so `0456` and `SC000456` both find `456`.
    pub fn expand(&self, cu_id: &str) -> Result<Vec<&'a ComponentEdge>> {
        match normalize_id(cu_id) {
            Some(root) => HierarchyExpander::new(self.store.registry()).expand(&root),
            None => Ok(Vec::new()),
        }
    }

    pub fn resolve(&self, stock_code: &str) -> DescriptionEntry {
        self.resolver.resolve(stock_code)
    }

    /// Terminal edges under `cu_id`, each annotated with its description
    pub fn breakdown(&self, cu_id: &str) -> Result<Vec<ResolvedLeaf>> {
        let edges = self.expand(cu_id)?;
        Ok(edges
            .into_iter()
            .map(|edge| {
                let entry = self.resolve(edge.leaf_id.as_deref().unwrap_or(""));
                ResolvedLeaf::new(edge.clone(), entry)
            })
            .collect())
    }

    pub fn lookup_cu(&self, cu_id: &str) -> Result<CuLookupResult> {
        let cu_id = cu_id.trim();
        let breakdown = self.breakdown(cu_id)?;
        let legend = self.legend(cu_id).into_iter().cloned().collect::<Vec<_>>();
        info!(
            "CU {}: {} legend rows, {} stock code rows",
            cu_id,
            legend.len(),
            breakdown.len()
        );
        Ok(CuLookupResult {
            cu_id: cu_id.to_string(),
            legend,
            breakdown,
            columns: self.store.breakdown_columns(),
        })
    }
}

/// The CU a chosen search result points at: its `Description 2` value, or the
/// first column when that is empty or missing.
pub fn selected_cu(record: &ListingRecord) -> Option<String> {
    record
        .component_code()
        .filter(|code| !code.is_empty())
        .or_else(|| record.values().first().map(String::as_str))
        .filter(|code| !code.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::description::NOT_FOUND_DESCRIPTION;
    use crate::observability::SearchAuditLog;
    use crate::relations::fixtures::{sample, store};

    #[test]
    fn test_search_is_case_insensitive() {
        let store = sample();
        let lookup = CuLookup::new(&store);

        let results = lookup.search("abc");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].component_code(), Some("ABC123"));

        assert_eq!(lookup.search("POLE").len(), 2);
        assert!(lookup.search("nothing like this").is_empty());
    }

    #[test]
    fn test_empty_search_returns_everything() {
        let store = sample();
        let lookup = CuLookup::new(&store);
        assert_eq!(lookup.search("").len(), store.listings().len());
    }

    #[test]
    fn test_search_ignores_dropped_columns() {
        let store = sample();
        let lookup = CuLookup::new(&store);
        // "Unnamed: 0" held the row index, it must not match
        assert!(lookup.search("Unnamed").is_empty());
    }

    #[test]
    fn test_search_records_audit_entry() {
        let store = sample();
        let audit = SearchAuditLog::in_memory(10);
        let lookup = CuLookup::with_audit(&store, &audit);

        lookup.search("bolt");
        lookup.search("");

        let queries: Vec<_> = audit.recent().into_iter().map(|e| e.query).collect();
        assert_eq!(queries, vec!["bolt", ""]);
    }

    #[test]
    fn test_legend_matches_component_code_exactly() {
        let store = sample();
        let lookup = CuLookup::new(&store);

        let legend = lookup.legend("10");
        assert_eq!(legend.len(), 2);
        assert_eq!(legend[0].get("Description"), Some("Pole top assembly"));
        assert_eq!(legend[1].get("Description"), Some("Second pole legend"));
        assert!(lookup.legend("1").is_empty());
    }

    #[test]
    fn test_lookup_cu_resolves_breakdown_in_order() {
        let store = sample();
        let result = CuLookup::new(&store).lookup_cu("10").unwrap();

        assert_eq!(result.cu_id, "10");
        assert_eq!(result.legend.len(), 2);
        assert_eq!(result.breakdown.len(), 2);

        let bolt = &result.breakdown[0];
        assert_eq!(bolt.cu(), "20");
        assert_eq!(bolt.stock_code(), "500");
        assert_eq!(bolt.quantity(), Some(3.0));
        assert_eq!(bolt.description, "Bolt");
        assert_eq!(bolt.unit_of_issue, "EA");

        let bracket = &result.breakdown[1];
        assert_eq!(bracket.stock_code(), "501");
        assert_eq!(bracket.description, "Bracket");
        assert_eq!(bracket.unit_of_issue, "");
        assert_eq!(bracket.price, "");
    }

    #[test]
    fn test_padded_component_code_from_search_expands() {
        let store = store(
            "Description,Description 2\nService drop,0456\nRiser kit,SC000123\nBlank,000\n",
            "CU,STOCK CODE,QTY\n0456,0500,2\nSC000123,SC000777,1\n",
            "Stock Code1,Description\n500,Bolt\n",
            "SC_backup,backupDescrip\n",
        );
        let lookup = CuLookup::new(&store);

        let cu = selected_cu(lookup.search("service drop")[0]).unwrap();
        assert_eq!(cu, "0456");
        let result = lookup.lookup_cu(&cu).unwrap();
        assert_eq!(result.cu_id, "0456");
        assert_eq!(result.legend.len(), 1);
        assert_eq!(result.breakdown.len(), 1);
        assert_eq!(result.breakdown[0].stock_code(), "500");
        assert_eq!(result.breakdown[0].description, "Bolt");

        let cu = selected_cu(lookup.search("riser")[0]).unwrap();
        let result = lookup.lookup_cu(&cu).unwrap();
        assert_eq!(result.legend.len(), 1);
        assert_eq!(result.breakdown[0].stock_code(), "SC000777");

        // all-zero CU normalizes to nothing
        let result = lookup.lookup_cu("000").unwrap();
        assert_eq!(result.legend.len(), 1);
        assert!(result.breakdown.is_empty());
    }

    #[test]
    fn test_stock_code_prefix_does_not_borrow_description() {
        let store = store(
            "Description 2\n10\n",
            "CU,STOCK CODE,QTY\n10,sc000500,1\n10,501,1\n",
            "Stock Code1,Description\n500,Bolt\n",
            "SC_backup,backupDescrip\n0501,Bracket\n",
        );
        let result = CuLookup::new(&store).lookup_cu("10").unwrap();

        assert_eq!(result.breakdown[0].stock_code(), "sc000500");
        assert_eq!(result.breakdown[0].description, NOT_FOUND_DESCRIPTION);
        assert_eq!(result.breakdown[1].stock_code(), "501");
        assert_eq!(result.breakdown[1].description, NOT_FOUND_DESCRIPTION);
    }

    #[test]
    fn test_lookup_unknown_cu_is_empty_not_error() {
        let store = sample();
        let result = CuLookup::new(&store).lookup_cu("nope").unwrap();
        assert!(result.legend.is_empty());
        assert!(result.breakdown.is_empty());
    }

    #[test]
    fn test_lookup_cycle_is_scoped_to_that_cu() {
        let store = store(
            "Description 2\nA\n",
            "CU,CHILD CU,STOCK CODE\nA,B,\nB,A,\nC,,12\n",
            "Stock Code1,Description\n",
            "SC_backup,backupDescrip\n",
        );
        let lookup = CuLookup::new(&store);

        assert!(lookup.lookup_cu("A").is_err());
        let other = lookup.lookup_cu("C").unwrap();
        assert_eq!(other.breakdown.len(), 1);
        assert_eq!(other.breakdown[0].description, NOT_FOUND_DESCRIPTION);
    }

    #[test]
    fn test_selected_cu_prefers_component_code() {
        let listed = sample();
        assert_eq!(selected_cu(&listed.listings()[1]), Some("ABC123".to_string()));

        let store = store(
            "Code,Description 2\nX9,\n,\n",
            "CU,STOCK CODE\n",
            "Stock Code1,Description\n",
            "SC_backup,backupDescrip\n",
        );
        assert_eq!(selected_cu(&store.listings()[0]), Some("X9".to_string()));
        assert_eq!(selected_cu(&store.listings()[1]), None);
    }
}
