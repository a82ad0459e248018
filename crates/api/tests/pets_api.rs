//! HTTP-level integration tests for the pet endpoints.
//!
//! Uses tower::ServiceExt to send requests directly to the router without
//! an actual TCP listener.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, create_pet, delete, get, patch_json, pet_body, post_json, send_raw};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_pet_returns_201_with_nested_detail(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/pets",
        pet_body("Rex", "Canis familiaris", &["friendly", "loud"]),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert!(json["id"].is_number());
    assert_eq!(json["name"], "Rex");
    assert_eq!(json["age"], 3);
    assert_eq!(json["weight"], 12.5);
    assert_eq!(json["sex"], "Female");
    assert!(json["created_at"].is_string());
    assert!(json["updated_at"].is_string());
    assert!(json.get("group_id").is_none());
    assert_eq!(json["group"]["scientific_name"], "Canis familiaris");
    assert!(json["group"]["id"].is_number());
    assert_eq!(json["traits"][0]["name"], "friendly");
    assert_eq!(json["traits"][1]["name"], "loud");
    assert_eq!(json["traits_count"], 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_pet_defaults_sex(pool: PgPool) {
    let mut body = pet_body("Tom", "Felis catus", &[]);
    body.as_object_mut().unwrap().remove("sex");

    let response = post_json(common::build_test_app(pool), "/api/pets", body).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["sex"], "Not Informed");
    assert_eq!(json["traits"], json!([]));
    assert_eq!(json["traits_count"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_reuses_group_and_traits_ignoring_case(pool: PgPool) {
    let first = create_pet(&pool, pet_body("A", "Canis familiaris", &["Friendly"])).await;
    let second = create_pet(&pool, pet_body("B", "canis FAMILIARIS", &["friendly"])).await;

    let a = body_json(get(common::build_test_app(pool.clone()), &format!("/api/pets/{first}")).await).await;
    let b = body_json(get(common::build_test_app(pool.clone()), &format!("/api/pets/{second}")).await).await;

    assert_eq!(a["group"]["id"], b["group"]["id"]);
    // The stored casing is the first one seen.
    assert_eq!(b["group"]["scientific_name"], "Canis familiaris");
    assert_eq!(a["traits"][0]["id"], b["traits"][0]["id"]);
    assert_eq!(b["traits"][0]["name"], "Friendly");

    let groups: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM groups")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(groups, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_with_repeated_trait_links_once(pool: PgPool) {
    let response = post_json(
        common::build_test_app(pool),
        "/api/pets",
        pet_body("Rex", "Canis familiaris", &["calm", "CALM", "calm"]),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["traits_count"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_missing_fields_reports_each(pool: PgPool) {
    let response = post_json(common::build_test_app(pool), "/api/pets", json!({})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    for field in ["name", "age", "weight", "group", "traits"] {
        assert_eq!(json["fields"][field][0], "This field is required.", "{field}");
    }
    assert!(json["fields"].get("sex").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_invalid_values_returns_400_and_writes_nothing(pool: PgPool) {
    let body = json!({
        "name": "Rex",
        "age": -1,
        "weight": 4.0,
        "sex": "Unknown",
        "group": {"scientific_name": "Canis familiaris"},
        "traits": [{"name": "a-very-long-trait-name-indeed"}]
    });

    let response = post_json(common::build_test_app(pool.clone()), "/api/pets", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["fields"]["age"].is_array());
    assert_eq!(json["fields"]["sex"][0], "\"Unknown\" is not a valid choice.");
    assert_eq!(
        json["fields"]["traits[0].name"][0],
        "Ensure this field has no more than 20 characters."
    );

    let groups: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM groups")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(groups, 0, "a rejected body must not create a group");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_malformed_json_returns_400(pool: PgPool) {
    let response = send_raw(
        common::build_test_app(pool),
        Method::POST,
        "/api/pets",
        "{\"name\": ",
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_wrong_types_report_every_field(pool: PgPool) {
    let mut body = pet_body("Rex", "Canis familiaris", &[]);
    body["name"] = json!(null);
    body["age"] = json!("three");
    body["traits"] = json!({"name": "calm"});

    let response = post_json(common::build_test_app(pool), "/api/pets", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["fields"]["name"][0], "This field may not be null.");
    assert_eq!(json["fields"]["age"][0], "A valid integer is required.");
    assert_eq!(
        json["fields"]["traits"][0],
        "Expected a list of items but got type \"dict\"."
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_accepts_numeric_strings(pool: PgPool) {
    let mut body = pet_body("Rex", "Canis familiaris", &[]);
    body["age"] = json!("3");
    body["weight"] = json!("7.25");

    let response = post_json(common::build_test_app(pool), "/api/pets", body).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["age"], 3);
    assert_eq!(json["weight"], 7.25);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_nul_character_returns_400(pool: PgPool) {
    let body = pet_body("Re\u{0}x", "Canis familiaris", &["ca\u{0}lm"]);

    let response = post_json(common::build_test_app(pool.clone()), "/api/pets", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["fields"]["name"][0], "Null characters are not allowed.");
    assert_eq!(
        json["fields"]["traits[0].name"][0],
        "Null characters are not allowed."
    );

    let pets: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pets")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(pets, 0);
}

// ---------------------------------------------------------------------------
// Retrieve
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_pet_by_id(pool: PgPool) {
    let id = create_pet(&pool, pet_body("Rex", "Canis familiaris", &["calm"])).await;

    let response = get(common::build_test_app(pool), &format!("/api/pets/{id}")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["id"], id);
    assert_eq!(json["name"], "Rex");
    assert_eq!(json["traits_count"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_nonexistent_pet_returns_404(pool: PgPool) {
    let response = get(common::build_test_app(pool), "/api/pets/999999").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_non_integer_id_returns_404(pool: PgPool) {
    let response = get(common::build_test_app(pool), "/api/pets/abc").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_empty(pool: PgPool) {
    let response = get(common::build_test_app(pool), "/api/pets").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["count"], 0);
    assert!(json["next"].is_null());
    assert!(json["previous"].is_null());
    assert_eq!(json["results"], json!([]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_paginates_in_creation_order(pool: PgPool) {
    for name in ["One", "Two", "Three"] {
        create_pet(&pool, pet_body(name, "Canis familiaris", &[])).await;
    }

    let first = body_json(get(common::build_test_app(pool.clone()), "/api/pets").await).await;
    assert_eq!(first["count"], 3);
    assert_eq!(first["results"].as_array().unwrap().len(), 2);
    assert_eq!(first["results"][0]["name"], "One");
    assert_eq!(first["results"][1]["name"], "Two");
    assert_eq!(first["next"], "http://localhost/api/pets?page=2");
    assert!(first["previous"].is_null());

    let second = body_json(get(common::build_test_app(pool), "/api/pets?page=2").await).await;
    assert_eq!(second["results"].as_array().unwrap().len(), 1);
    assert_eq!(second["results"][0]["name"], "Three");
    assert!(second["next"].is_null());
    assert_eq!(second["previous"], "http://localhost/api/pets");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_last_page_keyword(pool: PgPool) {
    for name in ["One", "Two", "Three"] {
        create_pet(&pool, pet_body(name, "Canis familiaris", &[])).await;
    }

    let response = get(common::build_test_app(pool), "/api/pets?page=last").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["results"][0]["name"], "Three");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_invalid_page_returns_404(pool: PgPool) {
    create_pet(&pool, pet_body("One", "Canis familiaris", &[])).await;

    for page in ["0", "2", "-1", "abc"] {
        let response = get(
            common::build_test_app(pool.clone()),
            &format!("/api/pets?page={page}"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "page={page}");
        let json = body_json(response).await;
        assert_eq!(json["error"], "Invalid page.");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_filters_by_trait_and_keeps_filter_in_links(pool: PgPool) {
    create_pet(&pool, pet_body("One", "Canis familiaris", &["calm"])).await;
    create_pet(&pool, pet_body("Two", "Canis familiaris", &["loud"])).await;
    create_pet(&pool, pet_body("Three", "Canis familiaris", &["calm", "loud"])).await;
    create_pet(&pool, pet_body("Four", "Canis familiaris", &["calm"])).await;

    let json = body_json(get(common::build_test_app(pool.clone()), "/api/pets?trait=calm").await).await;

    assert_eq!(json["count"], 3);
    assert_eq!(json["results"][0]["name"], "One");
    assert_eq!(json["results"][1]["name"], "Three");
    // A filtered pet still shows every one of its traits.
    assert_eq!(json["results"][1]["traits_count"], 2);
    assert_eq!(json["next"], "http://localhost/api/pets?page=2&trait=calm");

    let page2 = body_json(
        get(common::build_test_app(pool), "/api/pets?trait=calm&page=2").await,
    )
    .await;
    assert_eq!(page2["results"][0]["name"], "Four");
    assert_eq!(page2["previous"], "http://localhost/api/pets?trait=calm");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_trait_filter_is_exact(pool: PgPool) {
    create_pet(&pool, pet_body("One", "Canis familiaris", &["Calm"])).await;

    let json = body_json(get(common::build_test_app(pool), "/api/pets?trait=calm").await).await;

    assert_eq!(json["count"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_unknown_trait_returns_empty_page(pool: PgPool) {
    create_pet(&pool, pet_body("One", "Canis familiaris", &["calm"])).await;

    let response = get(common::build_test_app(pool), "/api/pets?trait=nonexistent").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["count"], 0);
    assert_eq!(json["results"], json!([]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_repeated_query_keys_use_last_value(pool: PgPool) {
    create_pet(&pool, pet_body("One", "Canis familiaris", &["calm"])).await;
    create_pet(&pool, pet_body("Two", "Canis familiaris", &["loud"])).await;

    let response = get(
        common::build_test_app(pool),
        "/api/pets?trait=calm&trait=loud&page=9&page=1",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["results"][0]["name"], "Two");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_percent_encoded_filter(pool: PgPool) {
    for name in ["One", "Two", "Three"] {
        create_pet(&pool, pet_body(name, "Canis familiaris", &["very calm"])).await;
    }

    let json = body_json(
        get(common::build_test_app(pool), "/api/pets?trait=very%20calm").await,
    )
    .await;

    assert_eq!(json["count"], 3);
    assert_eq!(json["next"], "http://localhost/api/pets?page=2&trait=very+calm");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_uses_public_base_url(pool: PgPool) {
    for name in ["One", "Two", "Three"] {
        create_pet(&pool, pet_body(name, "Canis familiaris", &[])).await;
    }
    let mut config = common::test_config();
    config.public_base_url = Some("https://pets.example.com".to_string());

    let app = common::build_test_app_with(pool, config);
    let json = body_json(get(app, "/api/pets").await).await;

    assert_eq!(json["next"], "https://pets.example.com/api/pets?page=2");
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_patch_updates_only_sent_fields(pool: PgPool) {
    let id = create_pet(&pool, pet_body("Rex", "Canis familiaris", &["calm"])).await;

    let response = patch_json(
        common::build_test_app(pool),
        &format!("/api/pets/{id}"),
        json!({"age": 7}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["age"], 7);
    assert_eq!(json["name"], "Rex");
    assert_eq!(json["weight"], 12.5);
    assert_eq!(json["group"]["scientific_name"], "Canis familiaris");
    assert_eq!(json["traits"][0]["name"], "calm");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_patch_group_switches_to_existing_or_new(pool: PgPool) {
    let id = create_pet(&pool, pet_body("Rex", "Canis familiaris", &[])).await;
    let other = create_pet(&pool, pet_body("Tom", "Felis catus", &[])).await;
    let cat = body_json(get(common::build_test_app(pool.clone()), &format!("/api/pets/{other}")).await).await;

    let json = body_json(
        patch_json(
            common::build_test_app(pool.clone()),
            &format!("/api/pets/{id}"),
            json!({"group": {"scientific_name": "FELIS CATUS"}}),
        )
        .await,
    )
    .await;
    assert_eq!(json["group"]["id"], cat["group"]["id"]);

    let json = body_json(
        patch_json(
            common::build_test_app(pool),
            &format!("/api/pets/{id}"),
            json!({"group": {"scientific_name": "Mustela furo"}}),
        )
        .await,
    )
    .await;
    assert_eq!(json["group"]["scientific_name"], "Mustela furo");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_patch_traits_replaces_set(pool: PgPool) {
    let id = create_pet(&pool, pet_body("Rex", "Canis familiaris", &["calm", "loud"])).await;

    let json = body_json(
        patch_json(
            common::build_test_app(pool.clone()),
            &format!("/api/pets/{id}"),
            json!({"traits": [{"name": "playful"}]}),
        )
        .await,
    )
    .await;
    assert_eq!(json["traits_count"], 1);
    assert_eq!(json["traits"][0]["name"], "playful");

    let json = body_json(
        patch_json(
            common::build_test_app(pool),
            &format!("/api/pets/{id}"),
            json!({"traits": []}),
        )
        .await,
    )
    .await;
    assert_eq!(json["traits_count"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_patch_empty_body_returns_unchanged(pool: PgPool) {
    let id = create_pet(&pool, pet_body("Rex", "Canis familiaris", &["calm"])).await;

    let response = patch_json(
        common::build_test_app(pool),
        &format!("/api/pets/{id}"),
        json!({}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["name"], "Rex");
    assert_eq!(json["traits_count"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_patch_null_or_invalid_returns_400_and_keeps_pet(pool: PgPool) {
    let id = create_pet(&pool, pet_body("Rex", "Canis familiaris", &[])).await;

    let response = patch_json(
        common::build_test_app(pool.clone()),
        &format!("/api/pets/{id}"),
        json!({"name": null, "weight": -2.0}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["fields"]["name"][0], "This field may not be null.");
    assert!(json["fields"]["weight"].is_array());

    let json = body_json(get(common::build_test_app(pool), &format!("/api/pets/{id}")).await).await;
    assert_eq!(json["name"], "Rex");
    assert_eq!(json["weight"], 12.5);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_patch_nonexistent_pet_returns_404_before_validation(pool: PgPool) {
    let response = patch_json(
        common::build_test_app(pool),
        "/api/pets/999999",
        json!({"age": -5}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_patch_non_integer_id_returns_404(pool: PgPool) {
    let response = patch_json(
        common::build_test_app(pool),
        "/api/pets/abc",
        json!({"age": 1}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_pet_returns_204_and_keeps_catalog(pool: PgPool) {
    let id = create_pet(&pool, pet_body("Rex", "Canis familiaris", &["calm"])).await;

    let response = delete(common::build_test_app(pool.clone()), &format!("/api/pets/{id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(common::build_test_app(pool.clone()), &format!("/api/pets/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let traits: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM traits")
        .fetch_one(&pool)
        .await
        .unwrap();
    let groups: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM groups")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!((traits, groups), (1, 1));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_nonexistent_pet_returns_404(pool: PgPool) {
    let response = delete(common::build_test_app(pool), "/api/pets/999999").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_twice_returns_404(pool: PgPool) {
    let id = create_pet(&pool, pet_body("Rex", "Canis familiaris", &[])).await;

    let first = delete(common::build_test_app(pool.clone()), &format!("/api/pets/{id}")).await;
    let second = delete(common::build_test_app(pool), &format!("/api/pets/{id}")).await;

    assert_eq!(first.status(), StatusCode::NO_CONTENT);
    assert_eq!(second.status(), StatusCode::NOT_FOUND);
}
