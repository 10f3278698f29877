pub mod config;
pub mod description;
pub mod error;
pub mod export;
pub mod hierarchy;
pub mod identifier;
pub mod ingestion;
pub mod lookup;
pub mod observability;
pub mod relations;
pub mod render;

pub use description::{DescriptionResolver, DescriptionTier, NOT_FOUND_DESCRIPTION};
pub use error::{LookupError, Result};
pub use hierarchy::HierarchyExpander;
pub use lookup::{selected_cu, CuLookup, CuLookupResult, ResolvedLeaf};
pub use relations::{
    load_relations, ComponentEdge, ComponentRegistry, ListingRecord, RelationCache, RelationStore,
};
