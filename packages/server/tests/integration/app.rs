use crate::common::{TestApp, routes};

mod routing {
    use super::*;

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get("/api/v2/nothing").await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["status"], "fail");
        assert_eq!(res.body["code"], "ROUTE_NOT_FOUND");
        assert_eq!(res.body["message"], "Can't find /api/v2/nothing on this server!");
    }

    #[tokio::test]
    async fn unsupported_method_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.delete(routes::KEGIATAN).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "ROUTE_NOT_FOUND");
    }

    #[tokio::test]
    async fn serves_openapi_document() {
        let app = TestApp::spawn().await;

        let res = app.get("/api-docs/openapi.json").await;

        assert_eq!(res.status, 200);
        assert!(res.body["paths"]["/api/v1/handicrafts"].is_object());
        assert!(res.body["paths"]["/api/v1/kegiatan/{id}"].is_object());
    }

    #[tokio::test]
    async fn serves_static_files_before_falling_back() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>ReWaste</h1>").unwrap();
        let static_dir = dir.path().to_path_buf();
        let app = TestApp::spawn_with(|config| config.server.static_dir = Some(static_dir)).await;

        let res = app.get("/index.html").await;
        assert_eq!(res.status, 200);
        assert_eq!(res.text, "<h1>ReWaste</h1>");

        let missing = app.get("/missing.html").await;
        assert_eq!(missing.status, 404);
        assert_eq!(missing.body["code"], "ROUTE_NOT_FOUND");
    }
}

mod middleware {
    use super::*;

    #[tokio::test]
    async fn responses_carry_security_headers() {
        let app = TestApp::spawn().await;

        let res = app.get(routes::KEGIATAN).await;

        assert_eq!(res.headers["x-content-type-options"], "nosniff");
        assert_eq!(res.headers["x-frame-options"], "SAMEORIGIN");
        assert!(res.headers.contains_key("content-security-policy"));
    }

    #[tokio::test]
    async fn rate_limit_rejects_excess_requests() {
        let app = TestApp::spawn_with(|config| {
            config.server.rate_limit.max_requests = 2;
            config.server.rate_limit.window_secs = 3600;
        })
        .await;

        let first = app.get(routes::KEGIATAN).await;
        assert_eq!(first.status, 200);
        assert_eq!(first.headers["x-ratelimit-remaining"], "1");
        assert_eq!(app.get(routes::KEGIATAN).await.status, 200);

        let res = app.get(routes::KEGIATAN).await;
        assert_eq!(res.status, 429);
        assert_eq!(res.body["code"], "RATE_LIMITED");
        let retry_after: u64 = res.headers["retry-after"].to_str().unwrap().parse().unwrap();
        assert!(retry_after > 0 && retry_after <= 3600);
    }

    #[tokio::test]
    async fn rate_limit_counts_unmatched_api_paths_only() {
        let app = TestApp::spawn_with(|config| {
            config.server.rate_limit.max_requests = 2;
            config.server.rate_limit.window_secs = 3600;
        })
        .await;

        let missing = app.get("/api/v2/nothing").await;
        assert_eq!(missing.status, 404);
        assert_eq!(missing.headers["x-ratelimit-remaining"], "1");

        let outside = app.get("/api-docs/openapi.json").await;
        assert_eq!(outside.status, 200);
        assert!(!outside.headers.contains_key("x-ratelimit-remaining"));

        assert_eq!(app.get(routes::KEGIATAN).await.status, 200);
        let res = app.get("/api/v2/nothing").await;
        assert_eq!(res.status, 429);
        assert_eq!(res.body["code"], "RATE_LIMITED");
        assert_eq!(res.headers["x-content-type-options"], "nosniff");
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let app = TestApp::spawn_with(|config| config.server.max_upload_bytes = 1024).await;

        let big = reqwest::multipart::Part::bytes(vec![0u8; 64 * 1024])
            .file_name("big.jpg")
            .mime_str("image/jpeg")
            .unwrap();
        let form = crate::common::form(&[("title", "Big"), ("description", "Too big")])
            .part("photo_url", big);

        let res = app.post_form(routes::KEGIATAN, form).await;

        assert_eq!(res.status, 413);
        assert_eq!(res.body["code"], "PAYLOAD_TOO_LARGE");
        assert!(app.store.is_empty().await);
    }
}

mod schema {
    use super::*;
    use rewaste_server::database;

    #[tokio::test]
    async fn reset_leaves_every_table_empty() {
        let app = TestApp::spawn().await;
        app.create_handicraft("Shelf", "wood,eco").await;
        app.create_kegiatan("Beach cleanup").await;

        database::reset_schema(&app.db).await.unwrap();

        let handicrafts = app.get(routes::HANDICRAFTS).await;
        assert_eq!(handicrafts.status, 200, "{}", handicrafts.text);
        assert_eq!(handicrafts.body["results"], 0);
        let kegiatan = app.get(routes::KEGIATAN).await;
        assert_eq!(kegiatan.status, 200, "{}", kegiatan.text);
        assert_eq!(kegiatan.body["results"], 0);

        // Old tags went with their table, and the recreated schema accepts writes.
        let res = app.get(&format!("{}?tags=wood", routes::HANDICRAFTS)).await;
        assert_eq!(res.body["code"], "TAG_NOT_FOUND");
        app.create_handicraft("Lamp", "wood").await;
        assert_eq!(app.get(routes::HANDICRAFTS).await.body["results"], 1);
    }

    #[tokio::test]
    async fn reset_is_repeatable() {
        let app = TestApp::spawn().await;

        database::reset_schema(&app.db).await.unwrap();
        database::reset_schema(&app.db).await.unwrap();

        assert_eq!(app.get(routes::KEGIATAN).await.body["results"], 0);
    }
}
