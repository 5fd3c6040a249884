mod common;

use axum::http::StatusCode;

use common::TestApp;

#[tokio::test]
async fn products_list_and_category_filter() {
    let app = TestApp::spawn().await;

    let (status, body) = app.get("/api/products").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["products"].as_array().unwrap().len(), 12);

    let (status, body) = app.get("/api/products?category=bags").await;
    assert_eq!(status, StatusCode::OK);
    let products = body["products"].as_array().unwrap();
    assert_eq!(products.len(), 4);
    assert!(products.iter().all(|p| p["category"] == "bags"));
}

#[tokio::test]
async fn search_matches_english_name_case_insensitively() {
    let app = TestApp::spawn().await;

    let (status, body) = app.get("/api/products/search?q=LeAtHeR").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    let ids: Vec<u64> = body["products"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 12]);
}

#[tokio::test]
async fn search_combines_filters() {
    let app = TestApp::spawn().await;

    let (status, body) = app
        .get("/api/products/search?category=shirts&max_price=300")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);

    let (status, body) = app
        .get("/api/products/search?q=jacket&min_price=1000")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["products"][0]["nameEn"], "Luxury Leather Jacket");
}

#[tokio::test]
async fn search_with_no_match_returns_empty_set() {
    let app = TestApp::spawn().await;

    let (status, body) = app.get("/api/products/search?q=submarine").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
    assert!(body["products"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn product_detail_and_unknown_id() {
    let app = TestApp::spawn().await;

    let (status, body) = app.get("/api/products/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["nameEn"], "Luxury Leather Bag");
    assert_eq!(body["isNew"], true);

    let (status, _) = app.get("/api/products/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn categories_are_bilingual() {
    let app = TestApp::spawn().await;

    let (status, body) = app.get("/api/categories").await;
    assert_eq!(status, StatusCode::OK);
    let categories = body["categories"].as_array().unwrap();
    assert_eq!(categories.len(), 4);
    assert_eq!(categories[0]["id"], "bags");
    assert_eq!(categories[0]["nameEn"], "Bags");
    assert_eq!(categories[0]["name"], "الحقائب");
}
