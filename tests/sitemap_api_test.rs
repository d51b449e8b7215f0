mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn update_sitemap_regenerates_and_persists_the_document() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json(
            "/update-sitemap",
            json!({
                "products": [
                    { "id": 1, "name": "Sodium Hydroxide", "description": "Caustic soda", "quantity": "40,000 lbs" }
                ]
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["productCount"], json!(1));

    let sitemap = body["sitemap"].as_str().unwrap();
    assert_eq!(sitemap.matches("<url>").count(), 3);
    assert!(sitemap.contains("<loc>https://tychem.net/products/sodium-hydroxide</loc>"));

    // the document was written where the publisher points
    let on_disk = std::fs::read_to_string(app.state.publisher.path()).unwrap();
    assert_eq!(on_disk, sitemap);
}

#[tokio::test]
async fn update_sitemap_with_no_products_keeps_the_fixed_entries() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json("/update-sitemap", json!({ "products": [] }))
        .await;

    assert_eq!(status, StatusCode::OK);
    let sitemap = body["sitemap"].as_str().unwrap();
    assert_eq!(sitemap.matches("<url>").count(), 2);
    assert!(sitemap.contains("<loc>https://tychem.net/</loc>"));
    assert!(sitemap.contains("<loc>https://tychem.net/products</loc>"));
}

#[tokio::test]
async fn sitemap_xml_serves_the_live_catalog() {
    let app = TestApp::seeded();

    let (status, content_type, body) = app.get_raw("/sitemap.xml").await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.starts_with("application/xml"));
    assert!(body.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    // ten products plus the two fixed entries
    assert_eq!(body.matches("<url>").count(), 12);
    assert!(body.contains("<loc>https://tychem.net/products/sodium-hydroxide</loc>"));
}

#[tokio::test]
async fn sitemap_xml_still_serves_when_the_store_is_down() {
    let app = TestApp::unreachable();

    let (status, _content_type, body) = app.get_raw("/sitemap.xml").await;

    assert_eq!(status, StatusCode::OK);
    // fallback catalog keeps the sitemap populated
    assert_eq!(body.matches("<url>").count(), 12);
}
