use crate::common::{TestApp, routes};

mod health {
    use super::*;

    #[tokio::test]
    async fn health_reports_running() {
        let app = TestApp::spawn().await;

        let res = app.get(routes::HEALTH).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.text, "System is Running");
    }

    #[tokio::test]
    async fn openapi_document_lists_image_routes() {
        let app = TestApp::spawn().await;

        let res = app.get(routes::OPENAPI).await;

        assert_eq!(res.status, 200);
        assert!(res.body["paths"]["/images"].is_object());
        assert!(res.body["paths"]["/images/{id}"].is_object());
        assert!(res.body["paths"]["/download/{id}"].is_object());
    }
}

mod upload {
    use super::*;

    #[tokio::test]
    async fn upload_returns_created_record() {
        let app = TestApp::spawn_with_filename_keys().await;

        let res = app
            .upload("a.png", vec![0x01, 0x02, 0x03], Some("image/png"))
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["id"], 1);
        assert_eq!(res.body["filename"], "a.png");
        assert_eq!(res.body["size"], 3);
        assert_eq!(res.body["object_key"], "a.png");
        assert_eq!(res.body["content_type"], "image/png");
        assert!(res.body["created_at"].as_str().is_some());
    }

    #[tokio::test]
    async fn unique_keys_keep_the_filename_as_suffix() {
        let app = TestApp::spawn().await;

        let res = app.upload("cat.jpg", b"JPEG".to_vec(), None).await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["filename"], "cat.jpg");
        let key = res.body["object_key"].as_str().unwrap();
        assert!(key.ends_with("-cat.jpg"), "unexpected key {key}");
        assert_ne!(key, "cat.jpg");
    }

    #[tokio::test]
    async fn content_type_is_guessed_from_the_filename() {
        let app = TestApp::spawn().await;

        let res = app.upload("photo.jpg", b"JPEG".to_vec(), None).await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["content_type"], "image/jpeg");
    }

    #[tokio::test]
    async fn unknown_type_is_stored_empty() {
        let app = TestApp::spawn().await;

        let res = app.upload("raw.zzqq", b"????".to_vec(), None).await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["content_type"], "");
    }

    #[tokio::test]
    async fn missing_image_field_is_rejected() {
        let app = TestApp::spawn().await;
        let part = reqwest::multipart::Part::bytes(b"data".to_vec()).file_name("a.png");
        let form = reqwest::multipart::Form::new().part("file", part);

        let res = app.post_form(routes::IMAGES, form).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert_eq!(app.get(routes::IMAGES).await.body, serde_json::json!([]));
    }

    #[tokio::test]
    async fn empty_file_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.upload("a.png", Vec::new(), None).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert!(app.blobs.is_empty());
    }

    #[tokio::test]
    async fn hidden_filename_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.upload(".htaccess", b"deny".to_vec(), None).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert!(app.blobs.is_empty());
    }

    #[tokio::test]
    async fn oversized_file_is_rejected() {
        let app = TestApp::spawn().await;
        let data = vec![0u8; 1024 * 1024 + 1];

        let res = app.upload("big.png", data, None).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert!(app.blobs.is_empty());
    }
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn empty_catalog_lists_nothing() {
        let app = TestApp::spawn().await;

        let res = app.get(routes::IMAGES).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body, serde_json::json!([]));
    }

    #[tokio::test]
    async fn records_are_listed_in_id_order() {
        let app = TestApp::spawn().await;
        for name in ["one.png", "two.png", "three.png"] {
            app.create_image(name, b"img").await;
        }

        let res = app.get(routes::IMAGES).await;

        assert_eq!(res.status, 200);
        let records = res.body.as_array().unwrap();
        let ids: Vec<i64> = records.iter().map(|r| r["id"].as_i64().unwrap()).collect();
        let names: Vec<&str> = records
            .iter()
            .map(|r| r["filename"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(names, vec!["one.png", "two.png", "three.png"]);
    }
}

mod deletion {
    use super::*;

    #[tokio::test]
    async fn delete_removes_record_and_blob() {
        let app = TestApp::spawn().await;
        let id = app.create_image("a.png", b"abc").await;
        assert_eq!(app.blobs.len(), 1);

        let res = app.delete(&routes::image(id)).await;

        assert_eq!(res.status, 204);
        assert!(res.text.is_empty());
        assert!(app.blobs.is_empty());
        assert_eq!(app.get(routes::IMAGES).await.body, serde_json::json!([]));
    }

    #[tokio::test]
    async fn deleting_twice_reports_not_found() {
        let app = TestApp::spawn().await;
        let id = app.create_image("a.png", b"abc").await;
        assert_eq!(app.delete(&routes::image(id)).await.status, 204);

        let res = app.delete(&routes::image(id)).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn unknown_id_is_not_found_and_changes_nothing() {
        let app = TestApp::spawn().await;
        app.create_image("keep.png", b"abc").await;

        let res = app.delete(&routes::image(999)).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
        assert_eq!(app.blobs.len(), 1);
        assert_eq!(app.get(routes::IMAGES).await.body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn non_numeric_id_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.delete(&routes::image("abc")).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let app = TestApp::spawn().await;
        let first = app.create_image("a.png", b"abc").await;
        app.delete(&routes::image(first)).await;

        let second = app.create_image("b.png", b"def").await;

        assert!(second > first);
    }
}

mod key_collisions {
    use super::*;

    #[tokio::test]
    async fn filename_keys_share_one_blob() {
        let app = TestApp::spawn_with_filename_keys().await;
        let first = app.create_image("dup.png", b"first").await;
        let second = app.create_image("dup.png", b"second").await;

        assert_ne!(first, second);
        assert_eq!(app.blobs.len(), 1);
        // Last writer wins for both rows.
        let res = app.get(&routes::download(first)).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.bytes, b"second");
    }

    #[tokio::test]
    async fn unique_keys_keep_both_blobs() {
        let app = TestApp::spawn().await;
        let first = app.create_image("dup.png", b"first").await;
        let second = app.create_image("dup.png", b"second").await;

        assert_eq!(app.blobs.len(), 2);
        assert_eq!(app.get(&routes::download(first)).await.bytes, b"first");
        assert_eq!(app.get(&routes::download(second)).await.bytes, b"second");
    }
}
