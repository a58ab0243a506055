#![forbid(unsafe_code)]

use fb_api::{CreateRecipeInput, ForkRecipeInput, RecipeService, UpdateRecipeInput};
use serde_json::{Value, json};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_storage_dir(label: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be monotonic enough for tests")
        .as_nanos();
    path.push(format!("fb-api-{label}-{}-{nanos}", std::process::id()));
    std::fs::create_dir_all(&path).expect("temp storage dir must be creatable");
    path
}

fn soup_input() -> CreateRecipeInput {
    CreateRecipeInput {
        title: "Tomato Soup".to_string(),
        description: Some("hearty".to_string()),
        ingredients: "tomatoes, salt".to_string(),
        instructions: "simmer for an hour".to_string(),
        author: None,
        changes: None,
        parent_id: None,
    }
}

fn created_id(response: &Value) -> i64 {
    response["data"]["id"].as_i64().expect("created id")
}

#[test]
fn create_and_get_round_trip() {
    let dir = temp_storage_dir("create-get");
    let mut service = RecipeService::open(&dir).expect("open service");

    let created = service.create(soup_input());
    assert_eq!(created["success"], json!(true));
    assert_eq!(created["message"], json!("Recipe created successfully"));
    assert_eq!(created["error"], Value::Null);
    assert_eq!(created["data"]["title"], json!("Tomato Soup"));
    assert_eq!(created["data"]["author"], json!("Anonymous"));
    assert_eq!(created["data"]["fork_count"], json!(0));
    assert_eq!(created["data"]["parent_id"], Value::Null);
    assert!(created["timestamp"].is_string());
    assert!(created["data"]["created_at"].is_string());

    let fetched = service.get(created_id(&created));
    assert_eq!(fetched["success"], json!(true));
    assert_eq!(fetched["data"]["title"], json!("Tomato Soup"));
    assert_eq!(fetched["data"]["parent_title"], Value::Null);
}

#[test]
fn errors_carry_the_taxonomy() {
    let dir = temp_storage_dir("error-taxonomy");
    let mut service = RecipeService::open(&dir).expect("open service");

    let missing = service.get(777);
    assert_eq!(missing["success"], json!(false));
    assert_eq!(missing["data"], Value::Null);
    assert_eq!(missing["error"]["code"], json!("RECIPE_NOT_FOUND"));
    assert_eq!(missing["error"]["status"], json!(404));

    // Non-positive path ids cannot reference a row.
    let bogus = service.get(0);
    assert_eq!(bogus["error"]["code"], json!("RECIPE_NOT_FOUND"));

    let mut blank = soup_input();
    blank.title = "   ".to_string();
    let invalid = service.create(blank);
    assert_eq!(invalid["error"]["code"], json!("VALIDATION_ERROR"));
    assert_eq!(invalid["error"]["status"], json!(400));
    assert_eq!(
        invalid["error"]["message"],
        json!("invalid input: title must not be empty")
    );

    let mut dangling = soup_input();
    dangling.parent_id = Some(999);
    let orphan = service.create(dangling);
    assert_eq!(orphan["error"]["code"], json!("PARENT_NOT_FOUND"));
    assert_eq!(orphan["error"]["status"], json!(404));

    let created = service.create(soup_input());
    let parent_id = created_id(&created);
    let forked = service.fork(
        parent_id,
        ForkRecipeInput {
            changes: Some("salted".to_string()),
            ..ForkRecipeInput::default()
        },
    );
    assert_eq!(forked["success"], json!(true));

    let conflict = service.delete(parent_id);
    assert_eq!(conflict["error"]["code"], json!("RECIPE_HAS_FORKS"));
    assert_eq!(conflict["error"]["status"], json!(409));
    assert_eq!(
        conflict["error"]["message"],
        json!("cannot delete a recipe with existing forks")
    );
}

#[test]
fn fork_copies_parent_content_and_counts() {
    let dir = temp_storage_dir("fork");
    let mut service = RecipeService::open(&dir).expect("open service");

    let created = service.create(soup_input());
    let parent_id = created_id(&created);

    let forked = service.fork(
        parent_id,
        ForkRecipeInput {
            changes: Some("doubled the salt".to_string()),
            ..ForkRecipeInput::default()
        },
    );
    assert_eq!(forked["success"], json!(true));
    assert_eq!(forked["message"], json!("Recipe forked successfully"));
    assert_eq!(forked["data"]["title"], json!("Tomato Soup"));
    assert_eq!(forked["data"]["ingredients"], json!("tomatoes, salt"));
    assert_eq!(forked["data"]["parent_id"], json!(parent_id));
    assert_eq!(forked["data"]["parent_title"], json!("Tomato Soup"));
    assert_eq!(forked["data"]["changes"], json!("doubled the salt"));

    let parent = service.get(parent_id);
    assert_eq!(parent["data"]["fork_count"], json!(1));

    let unknown = service.fork(777, ForkRecipeInput::default());
    assert_eq!(unknown["error"]["code"], json!("PARENT_NOT_FOUND"));
}

#[test]
fn lineage_payloads_expose_order_and_depth() {
    let dir = temp_storage_dir("lineage");
    let mut service = RecipeService::open(&dir).expect("open service");

    let r1 = created_id(&service.create(soup_input()));
    let r2 = created_id(&service.fork(
        r1,
        ForkRecipeInput {
            changes: Some("added salt".to_string()),
            ..ForkRecipeInput::default()
        },
    ));
    let r3 = created_id(&service.fork(
        r2,
        ForkRecipeInput {
            changes: Some("less salt".to_string()),
            ..ForkRecipeInput::default()
        },
    ));

    let chain = service.chain(r3);
    let chain_ids: Vec<i64> = chain["data"]
        .as_array()
        .expect("chain array")
        .iter()
        .map(|entry| entry["id"].as_i64().expect("chain id"))
        .collect();
    assert_eq!(chain_ids, vec![r1, r2, r3]);

    let subtree = service.subtree(r1);
    let depths: Vec<(i64, u64)> = subtree["data"]
        .as_array()
        .expect("subtree array")
        .iter()
        .map(|entry| {
            (
                entry["id"].as_i64().expect("subtree id"),
                entry["depth"].as_u64().expect("subtree depth"),
            )
        })
        .collect();
    assert_eq!(depths, vec![(r1, 0), (r2, 1), (r3, 2)]);

    let children = service.children(r1);
    let child_ids: Vec<i64> = children["data"]
        .as_array()
        .expect("children array")
        .iter()
        .map(|entry| entry["id"].as_i64().expect("child id"))
        .collect();
    assert_eq!(child_ids, vec![r2]);

    let listed = service.list();
    let listed_ids: Vec<i64> = listed["data"]
        .as_array()
        .expect("list array")
        .iter()
        .map(|entry| entry["id"].as_i64().expect("listed id"))
        .collect();
    assert_eq!(listed_ids, vec![r3, r2, r1]);
}

#[test]
fn update_merges_and_delete_confirms() {
    let dir = temp_storage_dir("update-delete");
    let mut service = RecipeService::open(&dir).expect("open service");

    let id = created_id(&service.create(soup_input()));

    let updated = service.update(
        id,
        UpdateRecipeInput {
            description: Some("brand new description".to_string()),
            ..UpdateRecipeInput::default()
        },
    );
    assert_eq!(updated["success"], json!(true));
    assert_eq!(updated["message"], json!("Recipe updated successfully"));
    assert_eq!(
        updated["data"]["description"],
        json!("brand new description")
    );
    assert_eq!(updated["data"]["title"], json!("Tomato Soup"));

    let deleted = service.delete(id);
    assert_eq!(deleted["success"], json!(true));
    assert_eq!(deleted["message"], json!("Recipe deleted successfully"));
    assert_eq!(deleted["data"]["id"], json!(id));

    let gone = service.get(id);
    assert_eq!(gone["error"]["code"], json!("RECIPE_NOT_FOUND"));
}

#[test]
fn inputs_deserialize_with_defaults() {
    let input: CreateRecipeInput = serde_json::from_value(json!({
        "title": "Bread",
        "ingredients": "flour, water",
        "instructions": "bake",
    }))
    .expect("minimal create input");
    assert_eq!(input.title, "Bread");
    assert_eq!(input.author, None);
    assert_eq!(input.parent_id, None);

    // A transport may pass an empty body; validation happens in the store.
    let empty: CreateRecipeInput =
        serde_json::from_value(json!({})).expect("empty create input");
    assert_eq!(empty.title, "");

    let fork: ForkRecipeInput = serde_json::from_value(json!({
        "changes": "new take",
    }))
    .expect("fork input");
    assert_eq!(fork.changes.as_deref(), Some("new take"));
    assert_eq!(fork.title, None);
}
