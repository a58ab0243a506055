#![forbid(unsafe_code)]

use crate::envelope::{ApiError, ApiResponse};
use crate::inputs::{CreateRecipeInput, ForkRecipeInput, UpdateRecipeInput};
use crate::payload::{chain_value, recipe_list_value, recipe_value, subtree_value};
use crate::support::now_ms_i64;
use fb_core::recipe::RecipeId;
use fb_storage::{
    CreateRecipeRequest, ForkRecipeRequest, SqliteStore, StoreError, UpdateRecipeRequest,
};
use serde_json::{Value, json};
use std::path::Path;

/// Transport-agnostic recipe operations. Every method returns a finished
/// response envelope; the external transport only maps it onto the wire.
pub struct RecipeService {
    store: SqliteStore,
}

impl RecipeService {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        Ok(Self {
            store: SqliteStore::open(storage_dir)?,
        })
    }

    pub fn from_store(store: SqliteStore) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Value {
        match self.store.list_recipes() {
            Ok(summaries) => ApiResponse::success(recipe_list_value(&summaries)).into_value(),
            Err(err) => failure(err),
        }
    }

    pub fn get(&self, id: i64) -> Value {
        let id = match lookup_id(id) {
            Ok(id) => id,
            Err(err) => return ApiResponse::failure(err).into_value(),
        };
        match self.store.get_recipe(id) {
            Ok(summary) => ApiResponse::success(recipe_value(&summary)).into_value(),
            Err(err) => failure(err),
        }
    }

    pub fn create(&mut self, input: CreateRecipeInput) -> Value {
        let forked = input.parent_id.is_some();
        let parent_id = match input.parent_id {
            Some(raw) => match parent_lookup_id(raw) {
                Ok(id) => Some(id),
                Err(err) => return ApiResponse::failure(err).into_value(),
            },
            None => None,
        };

        let request = CreateRecipeRequest {
            title: input.title,
            description: input.description,
            ingredients: input.ingredients,
            instructions: input.instructions,
            author: input.author,
            changes: input.changes,
            parent_id,
            created_at_ms: now_ms_i64(),
        };

        match self.store.create_recipe(request) {
            Ok(summary) => ApiResponse::success(recipe_value(&summary))
                .with_message(if forked {
                    "Recipe forked successfully"
                } else {
                    "Recipe created successfully"
                })
                .into_value(),
            Err(err) => failure(err),
        }
    }

    pub fn fork(&mut self, parent_id: i64, input: ForkRecipeInput) -> Value {
        let parent_id = match parent_lookup_id(parent_id) {
            Ok(id) => id,
            Err(err) => return ApiResponse::failure(err).into_value(),
        };

        let request = ForkRecipeRequest {
            parent_id,
            title: input.title,
            description: input.description,
            ingredients: input.ingredients,
            instructions: input.instructions,
            author: input.author,
            changes: input.changes,
            created_at_ms: now_ms_i64(),
        };

        match self.store.fork_recipe(request) {
            Ok(summary) => ApiResponse::success(recipe_value(&summary))
                .with_message("Recipe forked successfully")
                .into_value(),
            Err(err) => failure(err),
        }
    }

    pub fn update(&mut self, id: i64, input: UpdateRecipeInput) -> Value {
        let id = match lookup_id(id) {
            Ok(id) => id,
            Err(err) => return ApiResponse::failure(err).into_value(),
        };

        let request = UpdateRecipeRequest {
            id,
            title: input.title,
            description: input.description,
            ingredients: input.ingredients,
            instructions: input.instructions,
            changes: input.changes,
        };

        match self.store.update_recipe(request) {
            Ok(summary) => ApiResponse::success(recipe_value(&summary))
                .with_message("Recipe updated successfully")
                .into_value(),
            Err(err) => failure(err),
        }
    }

    pub fn delete(&mut self, id: i64) -> Value {
        let id = match lookup_id(id) {
            Ok(id) => id,
            Err(err) => return ApiResponse::failure(err).into_value(),
        };
        match self.store.delete_recipe(id) {
            Ok(()) => ApiResponse::success(json!({ "id": id.as_i64() }))
                .with_message("Recipe deleted successfully")
                .into_value(),
            Err(err) => failure(err),
        }
    }

    pub fn chain(&self, id: i64) -> Value {
        let id = match lookup_id(id) {
            Ok(id) => id,
            Err(err) => return ApiResponse::failure(err).into_value(),
        };
        match self.store.chain(id) {
            Ok(entries) => ApiResponse::success(chain_value(&entries)).into_value(),
            Err(err) => failure(err),
        }
    }

    pub fn children(&self, id: i64) -> Value {
        let id = match lookup_id(id) {
            Ok(id) => id,
            Err(err) => return ApiResponse::failure(err).into_value(),
        };
        match self.store.children(id) {
            Ok(summaries) => ApiResponse::success(recipe_list_value(&summaries)).into_value(),
            Err(err) => failure(err),
        }
    }

    pub fn subtree(&self, id: i64) -> Value {
        let id = match lookup_id(id) {
            Ok(id) => id,
            Err(err) => return ApiResponse::failure(err).into_value(),
        };
        match self.store.subtree(id) {
            Ok(entries) => ApiResponse::success(subtree_value(&entries)).into_value(),
            Err(err) => failure(err),
        }
    }
}

fn failure(err: StoreError) -> Value {
    ApiResponse::failure(ApiError::from_store(err)).into_value()
}

// A non-positive path id cannot reference any row, so it surfaces as the
// same not-found the lookup itself would produce.
fn lookup_id(raw: i64) -> Result<RecipeId, ApiError> {
    RecipeId::try_new(raw).map_err(|_| ApiError::from_store(StoreError::RecipeNotFound))
}

fn parent_lookup_id(raw: i64) -> Result<RecipeId, ApiError> {
    RecipeId::try_new(raw).map_err(|_| ApiError::from_store(StoreError::ParentNotFound))
}
