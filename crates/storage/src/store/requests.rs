#![forbid(unsafe_code)]

use fb_core::recipe::RecipeId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateRecipeRequest {
    pub title: String,
    pub description: Option<String>,
    pub ingredients: String,
    pub instructions: String,
    pub author: Option<String>,
    pub changes: Option<String>,
    pub parent_id: Option<RecipeId>,
    pub created_at_ms: i64,
}

/// Fork overrides: any omitted or blank content field falls back to the
/// parent's value, so a caller may supply only `changes`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForkRecipeRequest {
    pub parent_id: RecipeId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub ingredients: Option<String>,
    pub instructions: Option<String>,
    pub author: Option<String>,
    pub changes: Option<String>,
    pub created_at_ms: i64,
}

/// Field-level merge: only provided fields change, everything else keeps its
/// prior value. `parent_id`, `author`, `id`, and `created_at_ms` are never
/// touched by update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateRecipeRequest {
    pub id: RecipeId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub ingredients: Option<String>,
    pub instructions: Option<String>,
    pub changes: Option<String>,
}
