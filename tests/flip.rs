mod common;

use image::GenericImageView;
use reqwest::StatusCode;
use serde_json::{Value, json};

use common::{gradient_image, png_bytes, spawn_app};

#[tokio::test]
async fn horizontal_flip_mirrors_columns() {
    let app = spawn_app().await;
    let source = app.upload_ok("/upload_image", "g.png", png_bytes(30, 20)).await;

    let response = app
        .post_json(
            "/flip_image",
            &json!({ "filename": source, "flip_horizontal": true, "flip_vertical": false }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(
        body["flips_applied"],
        json!({ "horizontal": true, "vertical": false })
    );

    let flipped = body["flipped_filename"].as_str().unwrap();
    assert_eq!(flipped, source.replace(".png", "_flipped.png"));
    assert_eq!(body["flipped_url"], format!("/image/{flipped}"));

    let image = app.fetch_image(flipped).await.to_rgb8();
    let original = gradient_image(30, 20);
    for (x, y) in [(0, 0), (5, 7), (29, 19)] {
        assert_eq!(image.get_pixel(x, y), original.get_pixel(29 - x, y));
    }
}

#[tokio::test]
async fn vertical_flip_mirrors_rows() {
    let app = spawn_app().await;
    let source = app.upload_ok("/upload_image", "g.png", png_bytes(30, 20)).await;

    let response = app
        .post_json(
            "/flip_image",
            &json!({ "filename": source, "flip_vertical": true }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    let image = app
        .fetch_image(body["flipped_filename"].as_str().unwrap())
        .await
        .to_rgb8();
    let original = gradient_image(30, 20);
    assert_eq!(image.get_pixel(3, 0), original.get_pixel(3, 19));
}

#[tokio::test]
async fn flipping_twice_restores_the_original() {
    let app = spawn_app().await;
    let source = app.upload_ok("/upload_image", "g.png", png_bytes(25, 25)).await;
    let flips = |filename: &str| {
        json!({ "filename": filename, "flip_horizontal": true, "flip_vertical": true })
    };

    let first: Value = app
        .post_json("/flip_image", &flips(&source))
        .await
        .json()
        .await
        .unwrap();
    let once = first["flipped_filename"].as_str().unwrap().to_string();

    let second: Value = app
        .post_json("/flip_image", &flips(&once))
        .await
        .json()
        .await
        .unwrap();
    let twice = second["flipped_filename"].as_str().unwrap();
    assert!(twice.ends_with("_flipped_flipped.png"));

    let restored = app.fetch_image(twice).await;
    let original = app.fetch_image(&source).await;
    assert_eq!(restored.dimensions(), original.dimensions());
    assert_eq!(restored.to_rgb8(), original.to_rgb8());
}

#[tokio::test]
async fn no_flip_still_writes_a_new_file() {
    let app = spawn_app().await;
    let source = app.upload_ok("/upload_image", "g.png", png_bytes(10, 10)).await;

    let response = app.post_json("/flip_image", &json!({ "filename": source })).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["flips_applied"],
        json!({ "horizontal": false, "vertical": false })
    );
    assert_eq!(app.stored_files().len(), 2);
}

#[tokio::test]
async fn flip_of_unknown_file_returns_404() {
    let app = spawn_app().await;

    let response = app
        .post_json(
            "/flip_image",
            &json!({ "filename": "nope.png", "flip_horizontal": true }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Image file not found");
}

#[tokio::test]
async fn flip_without_filename_is_rejected() {
    let app = spawn_app().await;

    let response = app
        .post_json("/flip_image", &json!({ "flip_horizontal": true }))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "No filename provided");
}

#[tokio::test]
async fn malformed_flag_is_reported_as_invalid_body() {
    let app = spawn_app().await;

    let response = app
        .post_json(
            "/flip_image",
            &json!({ "filename": "a.png", "flip_horizontal": "yes" }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid request body");
}

#[tokio::test]
async fn body_without_json_content_type_is_reported_as_missing() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(format!("{}/flip_image", app.address))
        .body(r#"{"filename":"a.png"}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "No data provided");
}
