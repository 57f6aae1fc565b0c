use std::time::Duration;

use at_core::{CatalogQuery, ItemDraft, ItemId, ObjectStore, PortfolioRepo};
use at_supabase::{SupabaseClient, SupabaseConfig};
use bytes::Bytes;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> SupabaseClient {
    SupabaseClient::new(SupabaseConfig {
        url: server.uri(),
        anon_key: SecretString::from("anon-key".to_string()),
        table: "portfolio_items".into(),
        bucket: "portfolio-images".into(),
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

fn row(id: i64, category: &str) -> serde_json::Value {
    json!({
        "id": id,
        "created_at": "2024-05-01T12:00:00+00:00",
        "category": category,
        "title": format!("piece {id}"),
        "description": null,
        "image_url": format!("https://cdn.example/{id}.png"),
        "video_url": null,
        "order": null,
        "is_featured": true
    })
}

#[tokio::test]
async fn test_featured_read_sends_filter_order_and_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/portfolio_items"))
        .and(query_param("select", "*"))
        .and(query_param("is_featured", "eq.true"))
        .and(query_param("order", "created_at.desc.nullslast"))
        .and(header("apikey", "anon-key"))
        .and(header("authorization", "Bearer anon-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row(1, "Logo"), row(2, "Emotes")])))
        .expect(1)
        .mount(&server)
        .await;

    let items = client(&server).list(&CatalogQuery::featured()).await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id, ItemId::new("1"));
    assert_eq!(items[1].category, "Emotes");
}

#[tokio::test]
async fn test_read_failure_surfaces_backend_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/portfolio_items"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "code": "42P01",
            "message": "relation \"public.portfolio_items\" does not exist"
        })))
        .mount(&server)
        .await;

    let err = client(&server).list(&CatalogQuery::full_catalog()).await.unwrap_err();
    assert_eq!(err.status, Some(404));
    assert_eq!(err.message, "relation \"public.portfolio_items\" does not exist");
}

#[tokio::test]
async fn test_insert_posts_the_draft_and_returns_the_row() {
    let server = MockServer::start().await;
    let draft = ItemDraft {
        category: "Logo".into(),
        title: "piece 3".into(),
        image_url: "https://cdn.example/3.png".into(),
        is_featured: true,
        ..ItemDraft::default()
    };
    Mock::given(method("POST"))
        .and(path("/rest/v1/portfolio_items"))
        .and(header("prefer", "return=representation"))
        .and(body_json(json!([{
            "category": "Logo",
            "title": "piece 3",
            "description": null,
            "image_url": "https://cdn.example/3.png",
            "video_url": null,
            "order": null,
            "is_featured": true
        }])))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([row(3, "Logo")])))
        .expect(1)
        .mount(&server)
        .await;

    let saved = client(&server).insert(&draft).await.unwrap();
    assert_eq!(saved.id.as_str(), "3");
}

#[tokio::test]
async fn test_update_and_delete_target_the_id() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/portfolio_items"))
        .and(query_param("id", "eq.7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row(7, "Banner")])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/portfolio_items"))
        .and(query_param("id", "eq.7"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let id = ItemId::new("7");
    let updated = client.update(&id, &ItemDraft::default()).await.unwrap();
    assert_eq!(updated.category, "Banner");
    client.delete(&id).await.unwrap();
}

#[tokio::test]
async fn test_update_of_a_missing_row_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let err = client(&server).update(&ItemId::new("404"), &ItemDraft::default()).await.unwrap_err();
    assert_eq!(err.status, Some(404));
}

#[tokio::test]
async fn test_upload_never_overwrites() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/storage/v1/object/portfolio-images/public/abc.png"))
        .and(header("x-upsert", "false"))
        .and(header("cache-control", "max-age=3600"))
        .and(header("content-type", "image/png"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Key": "portfolio-images/public/abc.png" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    client
        .upload("public/abc.png", Bytes::from_static(b"PNG"), "image/png")
        .await
        .unwrap();
    assert_eq!(
        client.public_url("public/abc.png"),
        Some(format!("{}/storage/v1/object/public/portfolio-images/public/abc.png", server.uri()))
    );
}

#[tokio::test]
async fn test_upload_collision_reports_storage_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "statusCode": "409",
            "error": "Duplicate",
            "message": "The resource already exists"
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .upload("public/abc.png", Bytes::from_static(b"PNG"), "image/png")
        .await
        .unwrap_err();
    assert_eq!(err.message, "The resource already exists");
}
