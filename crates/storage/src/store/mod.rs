#![forbid(unsafe_code)]

mod error;
mod requests;

pub use error::StoreError;
pub use requests::*;

use fb_core::recipe::{
    ChainEntry, RecipeFieldError, RecipeId, RecipeRecord, RecipeSummary, RequiredField,
    SubtreeEntry, canonical_author, canonical_changes, canonical_description, canonical_required,
};
use rusqlite::{Connection, ErrorCode, OptionalExtension, params};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

const SCHEMA_VERSION: i64 = 1;
const MAX_LINEAGE_DEPTH: usize = 128;

const SUMMARY_SELECT: &str = "SELECT r.id, r.parent_id, r.title, r.description, r.ingredients, \
     r.instructions, r.author, r.changes, r.created_at_ms, p.title, \
     (SELECT COUNT(1) FROM recipes c WHERE c.parent_id = r.id) \
     FROM recipes r LEFT JOIN recipes p ON p.id = r.parent_id";

const RECORD_SELECT: &str = "SELECT id, parent_id, title, description, ingredients, \
     instructions, author, changes, created_at_ms FROM recipes";

#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    storage_dir: PathBuf,
}

impl SqliteStore {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let storage_dir = storage_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&storage_dir)?;

        let db_path = storage_dir.join("forkbook.db");
        let conn = Connection::open(db_path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        preflight_gate(&conn)?;
        install_schema(&conn)?;

        Ok(Self { conn, storage_dir })
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    pub fn create_recipe(
        &mut self,
        request: CreateRecipeRequest,
    ) -> Result<RecipeSummary, StoreError> {
        let title = canonical_required(RequiredField::Title, &request.title).map_err(invalid)?;
        let ingredients =
            canonical_required(RequiredField::Ingredients, &request.ingredients).map_err(invalid)?;
        let instructions = canonical_required(RequiredField::Instructions, &request.instructions)
            .map_err(invalid)?;
        let description = canonical_description(request.description.as_deref()).map_err(invalid)?;
        let author = canonical_author(request.author.as_deref()).map_err(invalid)?;
        let changes = canonical_changes(request.changes.as_deref()).map_err(invalid)?;

        let tx = self.conn.transaction()?;

        let parent_title = match request.parent_id {
            Some(parent_id) => {
                let parent = load_summary(&tx, parent_id.as_i64())?
                    .ok_or(StoreError::ParentNotFound)?;
                ensure_depth_allows_child(&tx, parent_id.as_i64())?;
                Some(parent.record.title)
            }
            None => None,
        };

        tx.execute(
            "INSERT INTO recipes(parent_id, title, description, ingredients, instructions, author, changes, created_at_ms) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                request.parent_id.map(RecipeId::as_i64),
                title,
                description,
                ingredients,
                instructions,
                author,
                changes,
                request.created_at_ms,
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(RecipeSummary {
            record: RecipeRecord {
                id,
                parent_id: request.parent_id.map(RecipeId::as_i64),
                title,
                description,
                ingredients,
                instructions,
                author,
                changes,
                created_at_ms: request.created_at_ms,
            },
            fork_count: 0,
            parent_title,
        })
    }

    pub fn fork_recipe(
        &mut self,
        request: ForkRecipeRequest,
    ) -> Result<RecipeSummary, StoreError> {
        let author = canonical_author(request.author.as_deref()).map_err(invalid)?;
        let changes = canonical_changes(request.changes.as_deref()).map_err(invalid)?;

        let tx = self.conn.transaction()?;

        let parent = load_summary(&tx, request.parent_id.as_i64())?
            .ok_or(StoreError::ParentNotFound)?;
        ensure_depth_allows_child(&tx, request.parent_id.as_i64())?;

        let title = override_or_parent(
            RequiredField::Title,
            request.title.as_deref(),
            &parent.record.title,
        )?;
        let ingredients = override_or_parent(
            RequiredField::Ingredients,
            request.ingredients.as_deref(),
            &parent.record.ingredients,
        )?;
        let instructions = override_or_parent(
            RequiredField::Instructions,
            request.instructions.as_deref(),
            &parent.record.instructions,
        )?;
        let description = match request.description.as_deref() {
            Some(value) if !value.trim().is_empty() => {
                canonical_description(Some(value)).map_err(invalid)?
            }
            _ => parent.record.description.clone(),
        };

        tx.execute(
            "INSERT INTO recipes(parent_id, title, description, ingredients, instructions, author, changes, created_at_ms) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                request.parent_id.as_i64(),
                title,
                description,
                ingredients,
                instructions,
                author,
                changes,
                request.created_at_ms,
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(RecipeSummary {
            record: RecipeRecord {
                id,
                parent_id: Some(request.parent_id.as_i64()),
                title,
                description,
                ingredients,
                instructions,
                author,
                changes,
                created_at_ms: request.created_at_ms,
            },
            fork_count: 0,
            parent_title: Some(parent.record.title),
        })
    }

    pub fn get_recipe(&self, id: RecipeId) -> Result<RecipeSummary, StoreError> {
        load_summary(&self.conn, id.as_i64())?.ok_or(StoreError::RecipeNotFound)
    }

    pub fn list_recipes(&self) -> Result<Vec<RecipeSummary>, StoreError> {
        let sql = format!("{SUMMARY_SELECT} ORDER BY r.created_at_ms DESC, r.id DESC");
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(summary_from_row(row)?);
        }
        Ok(out)
    }

    /// Ancestor path from the forest root down to `id`, inclusive.
    pub fn chain(&self, id: RecipeId) -> Result<Vec<ChainEntry>, StoreError> {
        let first = chain_entry(&self.conn, id.as_i64())?.ok_or(StoreError::RecipeNotFound)?;

        let mut seen = BTreeSet::from([first.id]);
        let mut current = first.parent_id;
        let mut entries = vec![first];

        while let Some(node) = current {
            if !seen.insert(node) {
                return Err(StoreError::LineageCycle);
            }
            if entries.len() > MAX_LINEAGE_DEPTH {
                return Err(StoreError::LineageDepthExceeded);
            }
            // A dangling parent pointer terminates the walk at the last
            // reachable ancestor.
            let Some(entry) = chain_entry(&self.conn, node)? else {
                break;
            };
            current = entry.parent_id;
            entries.push(entry);
        }

        entries.reverse();
        Ok(entries)
    }

    pub fn children(&self, id: RecipeId) -> Result<Vec<RecipeSummary>, StoreError> {
        ensure_recipe_exists(&self.conn, id.as_i64())?;

        let sql = format!(
            "{SUMMARY_SELECT} WHERE r.parent_id = ?1 ORDER BY r.created_at_ms DESC, r.id DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params![id.as_i64()])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(summary_from_row(row)?);
        }
        Ok(out)
    }

    /// Level-order expansion of `id` and all of its descendants. Within a
    /// depth level entries are ordered by id ascending.
    pub fn subtree(&self, id: RecipeId) -> Result<Vec<SubtreeEntry>, StoreError> {
        let root = load_record(&self.conn, id.as_i64())?.ok_or(StoreError::RecipeNotFound)?;

        let mut seen = BTreeSet::from([root.id]);
        let mut frontier = vec![root.id];
        let mut entries = vec![SubtreeEntry {
            record: root,
            depth: 0,
        }];
        let mut depth = 0usize;

        while !frontier.is_empty() {
            depth += 1;
            if depth > MAX_LINEAGE_DEPTH {
                return Err(StoreError::LineageDepthExceeded);
            }

            let mut level = Vec::new();
            for parent in &frontier {
                collect_children_records(&self.conn, *parent, &mut level)?;
            }
            level.sort_by_key(|record| record.id);

            frontier = Vec::new();
            for record in level {
                if !seen.insert(record.id) {
                    return Err(StoreError::LineageCycle);
                }
                frontier.push(record.id);
                entries.push(SubtreeEntry { record, depth });
            }
        }

        Ok(entries)
    }

    pub fn update_recipe(
        &mut self,
        request: UpdateRecipeRequest,
    ) -> Result<RecipeSummary, StoreError> {
        let tx = self.conn.transaction()?;

        let current =
            load_summary(&tx, request.id.as_i64())?.ok_or(StoreError::RecipeNotFound)?;
        let mut record = current.record;

        if let Some(title) = request.title.as_deref() {
            record.title = canonical_required(RequiredField::Title, title).map_err(invalid)?;
        }
        if let Some(ingredients) = request.ingredients.as_deref() {
            record.ingredients =
                canonical_required(RequiredField::Ingredients, ingredients).map_err(invalid)?;
        }
        if let Some(instructions) = request.instructions.as_deref() {
            record.instructions =
                canonical_required(RequiredField::Instructions, instructions).map_err(invalid)?;
        }
        if let Some(description) = request.description.as_deref() {
            record.description = canonical_description(Some(description)).map_err(invalid)?;
        }
        if let Some(changes) = request.changes.as_deref() {
            record.changes = canonical_changes(Some(changes)).map_err(invalid)?;
        }

        tx.execute(
            "UPDATE recipes SET title=?2, description=?3, ingredients=?4, instructions=?5, changes=?6 \
             WHERE id=?1",
            params![
                record.id,
                record.title,
                record.description,
                record.ingredients,
                record.instructions,
                record.changes,
            ],
        )?;
        tx.commit()?;

        Ok(RecipeSummary {
            record,
            fork_count: current.fork_count,
            parent_title: current.parent_title,
        })
    }

    pub fn delete_recipe(&mut self, id: RecipeId) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        ensure_recipe_exists(&tx, id.as_i64())?;

        let forks = tx.query_row(
            "SELECT COUNT(1) FROM recipes WHERE parent_id = ?1",
            params![id.as_i64()],
            |row| row.get::<_, i64>(0),
        )?;
        if forks > 0 {
            return Err(StoreError::RecipeHasForks);
        }

        let deleted = tx.execute("DELETE FROM recipes WHERE id = ?1", params![id.as_i64()]);
        if let Err(err) = deleted {
            return Err(map_delete_conflict(err));
        }

        tx.commit()?;
        Ok(())
    }
}

fn preflight_gate(conn: &Connection) -> Result<(), StoreError> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
    )?;
    let mut rows = stmt.query([])?;
    let mut tables = BTreeSet::new();
    while let Some(row) = rows.next()? {
        tables.insert(row.get::<_, String>(0)?);
    }

    if tables.is_empty() {
        return Ok(());
    }

    let required: BTreeSet<&str> = ["store_state", "recipes"].into_iter().collect();

    if tables
        .iter()
        .any(|table| !required.contains(table.as_str()))
    {
        return Err(StoreError::InvalidInput(
            "RESET_REQUIRED: unsupported tables detected",
        ));
    }

    for table in required {
        if !tables.contains(table) {
            return Err(StoreError::InvalidInput(
                "RESET_REQUIRED: required table is missing",
            ));
        }
    }

    let version = conn
        .query_row(
            "SELECT schema_version FROM store_state WHERE singleton=1",
            [],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;

    match version {
        Some(v) if v == SCHEMA_VERSION => Ok(()),
        Some(_) => Err(StoreError::InvalidInput(
            "RESET_REQUIRED: schema version mismatch",
        )),
        None => Err(StoreError::InvalidInput(
            "RESET_REQUIRED: schema state row is missing",
        )),
    }
}

fn install_schema(conn: &Connection) -> Result<(), StoreError> {
    let now_ms = now_ms();

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS store_state (
          singleton INTEGER PRIMARY KEY CHECK(singleton = 1),
          schema_version INTEGER NOT NULL,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS recipes (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          parent_id INTEGER,
          title TEXT NOT NULL,
          description TEXT,
          ingredients TEXT NOT NULL,
          instructions TEXT NOT NULL,
          author TEXT NOT NULL,
          changes TEXT,
          created_at_ms INTEGER NOT NULL,
          FOREIGN KEY(parent_id)
            REFERENCES recipes(id)
            ON DELETE RESTRICT,
          CHECK(parent_id IS NULL OR parent_id <> id)
        );

        CREATE INDEX IF NOT EXISTS idx_recipes_parent
          ON recipes(parent_id);

        CREATE INDEX IF NOT EXISTS idx_recipes_created
          ON recipes(created_at_ms, id);
        "#,
    )?;

    conn.execute(
        "INSERT INTO store_state(singleton, schema_version, created_at_ms, updated_at_ms) \
         VALUES (1, ?1, ?2, ?2) \
         ON CONFLICT(singleton) DO UPDATE SET schema_version=excluded.schema_version, updated_at_ms=excluded.updated_at_ms",
        params![SCHEMA_VERSION, now_ms],
    )?;

    Ok(())
}

fn summary_from_row(row: &rusqlite::Row<'_>) -> Result<RecipeSummary, rusqlite::Error> {
    Ok(RecipeSummary {
        record: RecipeRecord {
            id: row.get(0)?,
            parent_id: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            ingredients: row.get(4)?,
            instructions: row.get(5)?,
            author: row.get(6)?,
            changes: row.get(7)?,
            created_at_ms: row.get(8)?,
        },
        parent_title: row.get(9)?,
        fork_count: row.get(10)?,
    })
}

fn record_from_row(row: &rusqlite::Row<'_>) -> Result<RecipeRecord, rusqlite::Error> {
    Ok(RecipeRecord {
        id: row.get(0)?,
        parent_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        ingredients: row.get(4)?,
        instructions: row.get(5)?,
        author: row.get(6)?,
        changes: row.get(7)?,
        created_at_ms: row.get(8)?,
    })
}

fn load_summary(conn: &Connection, id: i64) -> Result<Option<RecipeSummary>, StoreError> {
    let sql = format!("{SUMMARY_SELECT} WHERE r.id = ?1");
    Ok(conn
        .query_row(&sql, params![id], summary_from_row)
        .optional()?)
}

fn load_record(conn: &Connection, id: i64) -> Result<Option<RecipeRecord>, StoreError> {
    let sql = format!("{RECORD_SELECT} WHERE id = ?1");
    Ok(conn
        .query_row(&sql, params![id], record_from_row)
        .optional()?)
}

fn collect_children_records(
    conn: &Connection,
    parent_id: i64,
    out: &mut Vec<RecipeRecord>,
) -> Result<(), StoreError> {
    let sql = format!("{RECORD_SELECT} WHERE parent_id = ?1 ORDER BY id ASC");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params![parent_id])?;
    while let Some(row) = rows.next()? {
        out.push(record_from_row(row)?);
    }
    Ok(())
}

fn chain_entry(conn: &Connection, id: i64) -> Result<Option<ChainEntry>, StoreError> {
    Ok(conn
        .query_row(
            "SELECT id, title, parent_id FROM recipes WHERE id = ?1",
            params![id],
            |row| {
                Ok(ChainEntry {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    parent_id: row.get(2)?,
                })
            },
        )
        .optional()?)
}

fn recipe_exists(conn: &Connection, id: i64) -> Result<bool, StoreError> {
    Ok(conn
        .query_row(
            "SELECT 1 FROM recipes WHERE id = ?1",
            params![id],
            |row| row.get::<_, i64>(0),
        )
        .optional()?
        .is_some())
}

fn ensure_recipe_exists(conn: &Connection, id: i64) -> Result<(), StoreError> {
    if recipe_exists(conn, id)? {
        Ok(())
    } else {
        Err(StoreError::RecipeNotFound)
    }
}

/// Walks parent links upward and counts edges to the root, rejecting cycles
/// and runaway depth (both imply out-of-band corruption).
fn lineage_depth(conn: &Connection, id: i64) -> Result<usize, StoreError> {
    let mut current = Some(id);
    let mut depth = 0usize;
    let mut seen = BTreeSet::new();

    while let Some(node) = current {
        if !seen.insert(node) {
            return Err(StoreError::LineageCycle);
        }

        let parent = conn
            .query_row(
                "SELECT parent_id FROM recipes WHERE id = ?1",
                params![node],
                |row| row.get::<_, Option<i64>>(0),
            )
            .optional()?
            .flatten();

        current = parent;
        if current.is_some() {
            depth = depth.saturating_add(1);
            if depth > MAX_LINEAGE_DEPTH {
                return Err(StoreError::LineageDepthExceeded);
            }
        }
    }

    Ok(depth)
}

fn ensure_depth_allows_child(conn: &Connection, parent_id: i64) -> Result<(), StoreError> {
    let depth = lineage_depth(conn, parent_id)?;
    if depth + 1 > MAX_LINEAGE_DEPTH {
        return Err(StoreError::InvalidInput("lineage depth limit reached"));
    }
    Ok(())
}

fn map_delete_conflict(err: rusqlite::Error) -> StoreError {
    if is_constraint_violation(&err) {
        return StoreError::RecipeHasForks;
    }
    StoreError::Sql(err)
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(code, message) => {
            code.code == ErrorCode::ConstraintViolation
                || message.as_deref().is_some_and(|value| {
                    value.contains("FOREIGN KEY constraint failed")
                        || value.contains("UNIQUE constraint failed")
                })
        }
        _ => false,
    }
}

fn invalid(err: RecipeFieldError) -> StoreError {
    StoreError::InvalidInput(err.message())
}

fn override_or_parent(
    field: RequiredField,
    value: Option<&str>,
    parent_value: &str,
) -> Result<String, StoreError> {
    match value {
        Some(value) if !value.trim().is_empty() => {
            canonical_required(field, value).map_err(invalid)
        }
        _ => Ok(parent_value.to_string()),
    }
}

fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(duration) => duration,
        Err(_) => return 0,
    };

    i64::try_from(now.as_millis()).unwrap_or(i64::MAX)
}
