#![forbid(unsafe_code)]

/// One persisted recipe row. `fork_count` is derived and lives on
/// [`RecipeSummary`], never here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecipeRecord {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub ingredients: String,
    pub instructions: String,
    pub author: String,
    pub changes: Option<String>,
    pub created_at_ms: i64,
}

/// A recipe as read back from the store: the record plus the derived
/// children count and, when a parent exists, its title for display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecipeSummary {
    pub record: RecipeRecord,
    pub fork_count: i64,
    pub parent_title: Option<String>,
}

/// One step of an ancestor chain, root-to-leaf order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainEntry {
    pub id: i64,
    pub title: String,
    pub parent_id: Option<i64>,
}

/// One node of a level-order subtree expansion. Depth is relative to the
/// queried root (root = 0).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubtreeEntry {
    pub record: RecipeRecord,
    pub depth: usize,
}
