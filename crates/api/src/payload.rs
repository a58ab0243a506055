#![forbid(unsafe_code)]

use crate::support::ts_ms_to_rfc3339;
use fb_core::recipe::{ChainEntry, RecipeSummary, SubtreeEntry};
use serde_json::{Value, json};

pub(crate) fn recipe_value(summary: &RecipeSummary) -> Value {
    let record = &summary.record;
    json!({
        "id": record.id,
        "parent_id": record.parent_id,
        "title": record.title,
        "description": record.description,
        "ingredients": record.ingredients,
        "instructions": record.instructions,
        "author": record.author,
        "changes": record.changes,
        "created_at": ts_ms_to_rfc3339(record.created_at_ms),
        "fork_count": summary.fork_count,
        "parent_title": summary.parent_title,
    })
}

pub(crate) fn recipe_list_value(summaries: &[RecipeSummary]) -> Value {
    Value::Array(summaries.iter().map(recipe_value).collect())
}

pub(crate) fn chain_value(entries: &[ChainEntry]) -> Value {
    Value::Array(
        entries
            .iter()
            .map(|entry| {
                json!({
                    "id": entry.id,
                    "title": entry.title,
                    "parent_id": entry.parent_id,
                })
            })
            .collect(),
    )
}

pub(crate) fn subtree_value(entries: &[SubtreeEntry]) -> Value {
    Value::Array(
        entries
            .iter()
            .map(|entry| {
                let record = &entry.record;
                json!({
                    "id": record.id,
                    "parent_id": record.parent_id,
                    "title": record.title,
                    "ingredients": record.ingredients,
                    "author": record.author,
                    "depth": entry.depth,
                    "created_at": ts_ms_to_rfc3339(record.created_at_ms),
                })
            })
            .collect(),
    )
}
