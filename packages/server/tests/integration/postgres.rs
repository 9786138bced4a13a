//! The same flows against a real PostgreSQL metadata store.
//!
//! Run with `cargo test -- --ignored` on a host with docker.

use crate::common::{TestApp, routes};

#[tokio::test]
#[ignore = "requires docker"]
async fn lifecycle_against_postgres() {
    let app = TestApp::spawn_with_postgres().await;

    let created = app
        .upload("a.png", vec![0x01, 0x02, 0x03], Some("image/png"))
        .await;
    assert_eq!(created.status, 201, "{}", created.text);
    let id = created.body["id"].as_i64().unwrap();
    assert_eq!(created.body["size"], 3);

    let listed = app.get(routes::IMAGES).await;
    assert_eq!(listed.body.as_array().unwrap().len(), 1);
    assert_eq!(listed.body[0]["object_key"], created.body["object_key"]);

    let downloaded = app.get(&routes::download(id)).await;
    assert_eq!(downloaded.bytes, vec![0x01, 0x02, 0x03]);
    assert_eq!(downloaded.header("content-type"), "image/png");

    assert_eq!(app.delete(&routes::image(id)).await.status, 204);
    assert_eq!(app.delete(&routes::image(id)).await.status, 404);
    assert_eq!(app.get(routes::IMAGES).await.body, serde_json::json!([]));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn empty_content_type_round_trips_as_empty_string() {
    let app = TestApp::spawn_with_postgres().await;

    let created = app.upload("raw.zzqq", b"??".to_vec(), None).await;
    assert_eq!(created.status, 201, "{}", created.text);

    let listed = app.get(routes::IMAGES).await;
    assert_eq!(listed.body[0]["content_type"], "");
}

#[tokio::test]
#[ignore = "requires docker"]
async fn ids_increase_across_inserts() {
    let app = TestApp::spawn_with_postgres().await;

    let a = app.create_image("a.png", b"a").await;
    let b = app.create_image("b.png", b"b").await;
    app.delete(&routes::image(a)).await;
    let c = app.create_image("c.png", b"c").await;

    assert!(a < b && b < c);
}
