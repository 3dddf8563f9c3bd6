use serde_json::json;

use crate::common::{TestApp, form, photo, routes};

mod create {
    use super::*;

    #[tokio::test]
    async fn creates_with_tags_and_steps() {
        let app = TestApp::spawn().await;

        let res = app
            .post_form(
                routes::HANDICRAFTS,
                form(&[
                    ("name", "Bottle vase"),
                    ("description", "A vase from a plastic bottle"),
                    ("tags", "wood,eco"),
                    ("steps", "Cut\nSand\nFinish"),
                ])
                .part("photo_url", photo("vase.jpg")),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["status"], "success");
        let handicraft = &res.body["data"]["handicraft"];
        assert_eq!(handicraft["name"], "Bottle vase");
        assert_eq!(handicraft["tags"], json!(["wood", "eco"]));
        assert_eq!(handicraft["steps"], json!(["Cut", "Sand", "Finish"]));
        assert_eq!(res.body["data"]["tags"], json!(["wood", "eco"]));

        let url = handicraft["photo_url"].as_str().unwrap();
        assert!(url.starts_with("https://storage.test/test-bucket/"), "{url}");
        assert!(url.ends_with(".jpg"), "{url}");
        assert!(app.store.contains(&res.photo_key("/data/handicraft/photo_url")).await);
    }

    #[tokio::test]
    async fn duplicate_tags_collapse_on_the_record() {
        let app = TestApp::spawn().await;

        let res = app
            .post_form(
                routes::HANDICRAFTS,
                form(&[
                    ("name", "Rope basket"),
                    ("description", "Woven from old rope"),
                    ("tags", "rope, Rope ,rope"),
                    ("steps", "Coil\r\nStitch\r\n"),
                ])
                .part("photo_url", photo("basket.png")),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["data"]["handicraft"]["tags"], json!(["rope", "Rope"]));
        assert_eq!(res.body["data"]["tags"], json!(["rope", "Rope", "rope"]));
        assert_eq!(res.body["data"]["handicraft"]["steps"], json!(["Coil", "Stitch"]));
    }

    #[tokio::test]
    async fn missing_photo_is_rejected_before_upload() {
        let app = TestApp::spawn().await;

        let res = app
            .post_form(
                routes::HANDICRAFTS,
                form(&[
                    ("name", "Bottle vase"),
                    ("description", "A vase"),
                    ("tags", "eco"),
                    ("steps", "Cut"),
                ]),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["status"], "fail");
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert!(app.store.is_empty().await);
    }

    #[tokio::test]
    async fn blank_field_is_rejected_before_upload() {
        let app = TestApp::spawn().await;

        let res = app
            .post_form(
                routes::HANDICRAFTS,
                form(&[
                    ("name", "   "),
                    ("description", "A vase"),
                    ("tags", "eco"),
                    ("steps", "Cut"),
                ])
                .part("photo_url", photo("vase.jpg")),
            )
            .await;

        assert_eq!(res.status, 400);
        assert!(res.body["message"].as_str().unwrap().contains("name"));
        assert!(app.store.is_empty().await);
    }

    #[tokio::test]
    async fn upload_failure_writes_no_row() {
        let app = TestApp::spawn().await;
        app.store.fail_writes(true);

        let res = app
            .post_form(
                routes::HANDICRAFTS,
                form(&[
                    ("name", "Bottle vase"),
                    ("description", "A vase"),
                    ("tags", "eco"),
                    ("steps", "Cut"),
                ])
                .part("photo_url", photo("vase.jpg")),
            )
            .await;

        assert_eq!(res.status, 502);
        assert_eq!(res.body["status"], "error");
        assert_eq!(res.body["code"], "UPLOAD_ERROR");

        let list = app.get(routes::HANDICRAFTS).await;
        assert_eq!(list.body["results"], 0);
    }

    #[tokio::test]
    async fn script_markup_is_stripped() {
        let app = TestApp::spawn().await;

        let res = app
            .post_form(
                routes::HANDICRAFTS,
                form(&[
                    ("name", "Vase<script>alert(1)</script>"),
                    ("description", "A vase"),
                    ("tags", "eco"),
                    ("steps", "Cut"),
                ])
                .part("photo_url", photo("vase.jpg")),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["data"]["handicraft"]["name"], "Vase");
    }

    #[tokio::test]
    async fn ampersands_and_angle_brackets_are_stored_as_typed() {
        let app = TestApp::spawn().await;

        let res = app
            .post_form(
                routes::HANDICRAFTS,
                form(&[
                    ("name", "<i>Jar</i> & lid"),
                    ("description", "Fits jars < 5cm"),
                    ("tags", "glue & paint,size < 5cm"),
                    ("steps", "Mix <b>glue</b> & water\nCut to < 5cm"),
                ])
                .part("photo_url", photo("jar.jpg")),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        let handicraft = &res.body["data"]["handicraft"];
        assert_eq!(handicraft["name"], "Jar & lid");
        assert_eq!(handicraft["description"], "Fits jars < 5cm");
        assert_eq!(handicraft["tags"], json!(["glue & paint", "size < 5cm"]));
        assert_eq!(handicraft["steps"], json!(["Mix glue & water", "Cut to < 5cm"]));
    }
}

mod read {
    use super::*;

    #[tokio::test]
    async fn lists_all_with_flattened_tags() {
        let app = TestApp::spawn().await;
        app.create_handicraft("First", "wood,eco").await;
        app.create_handicraft("Second", "glass").await;

        let res = app.get(routes::HANDICRAFTS).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["status"], "success");
        assert_eq!(res.body["results"], 2);
        assert_eq!(res.body["data"][0]["name"], "First");
        assert_eq!(res.body["data"][0]["tags"], json!(["wood", "eco"]));
        assert_eq!(res.body["data"][1]["tags"], json!(["glass"]));
    }

    #[tokio::test]
    async fn tag_filter_returns_intersecting_records() {
        let app = TestApp::spawn().await;
        let wood = app.create_handicraft("Shelf", "wood,eco").await;
        app.create_handicraft("Lamp", "glass").await;

        let res = app.get(&format!("{}?tags=wood", routes::HANDICRAFTS)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["results"], 1);
        assert_eq!(res.body["data"][0]["id"], wood.as_str());
        assert_eq!(res.body["data"][0]["tags"], json!(["wood", "eco"]));
    }

    #[tokio::test]
    async fn tag_filter_matches_any_of_the_names() {
        let app = TestApp::spawn().await;
        app.create_handicraft("Shelf", "wood").await;
        app.create_handicraft("Lamp", "glass").await;
        app.create_handicraft("Rug", "fabric").await;

        let res = app
            .get(&format!("{}?tags=wood,glass", routes::HANDICRAFTS))
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["results"], 2);
    }

    #[tokio::test]
    async fn tag_filter_matches_names_with_special_characters() {
        let app = TestApp::spawn().await;
        let jar = app.create_handicraft("Jar", "glue & paint,size < 5cm").await;
        app.create_handicraft("Shelf", "<b>glue</b> & paint").await;
        app.create_handicraft("Lamp", "glass").await;

        let res = app
            .get(&format!(
                "{}?tags=size%20%3C%205cm,glue%20%26%20paint",
                routes::HANDICRAFTS
            ))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["results"], 2);
        assert_eq!(res.body["data"][0]["id"], jar.as_str());
        assert_eq!(res.body["data"][1]["tags"], json!(["glue & paint"]));
    }

    #[tokio::test]
    async fn unknown_tag_is_not_found() {
        let app = TestApp::spawn().await;
        app.create_handicraft("Shelf", "wood").await;

        let res = app
            .get(&format!("{}?tags=wood,nonexistent", routes::HANDICRAFTS))
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "TAG_NOT_FOUND");
        assert!(res.body["message"].as_str().unwrap().contains("nonexistent"));
    }

    #[tokio::test]
    async fn reads_one_by_id() {
        let app = TestApp::spawn().await;
        let id = app.create_handicraft("Shelf", "wood,eco").await;

        let res = app.get(&routes::handicraft(&id)).await;

        assert_eq!(res.status, 200);
        assert!(res.body.get("results").is_none());
        assert_eq!(res.body["data"]["name"], "Shelf");
        assert_eq!(res.body["data"]["tags"], json!(["wood", "eco"]));
    }

    #[tokio::test]
    async fn missing_record_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app
            .get(&routes::handicraft("0b1c2d3e-4f50-4617-8899-aabbccddeeff"))
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn malformed_id_is_a_validation_error() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::handicraft("not-a-uuid")).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod update {
    use super::*;

    #[tokio::test]
    async fn description_only_leaves_the_rest_unchanged() {
        let app = TestApp::spawn().await;
        let id = app.create_handicraft("Shelf", "wood,eco").await;
        let before = app.get(&routes::handicraft(&id)).await;

        let res = app
            .patch_form(
                &routes::handicraft(&id),
                form(&[("description", "Now sturdier"), ("name", "")]),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let (old, new) = (&before.body["data"], &res.body["data"]);
        assert_eq!(new["description"], "Now sturdier");
        assert_eq!(new["name"], old["name"]);
        assert_eq!(new["steps"], old["steps"]);
        assert_eq!(new["tags"], old["tags"]);
        assert_eq!(new["photo_url"], old["photo_url"]);
    }

    #[tokio::test]
    async fn tags_replace_the_whole_set() {
        let app = TestApp::spawn().await;
        let id = app.create_handicraft("Shelf", "wood,eco").await;

        let res = app
            .patch_form(&routes::handicraft(&id), form(&[("tags", "metal,eco,metal")]))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["data"]["tags"], json!(["metal", "eco"]));

        let by_old_tag = app.get(&format!("{}?tags=wood", routes::HANDICRAFTS)).await;
        assert_eq!(by_old_tag.body["results"], 0);
        let by_new_tag = app.get(&format!("{}?tags=metal", routes::HANDICRAFTS)).await;
        assert_eq!(by_new_tag.body["results"], 1);
    }

    #[tokio::test]
    async fn new_photo_replaces_the_old_blob() {
        let app = TestApp::spawn().await;
        let id = app.create_handicraft("Shelf", "wood").await;
        let before = app.get(&routes::handicraft(&id)).await;
        let old_key = before.photo_key("/data/photo_url");

        let res = app
            .patch_form(
                &routes::handicraft(&id),
                form(&[]).part("photo_url", photo("new.png")),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let new_key = res.photo_key("/data/photo_url");
        assert_ne!(new_key, old_key);
        assert!(new_key.ends_with(".png"));
        assert!(app.store.contains(&new_key).await);
        assert!(!app.store.contains(&old_key).await);
    }

    #[tokio::test]
    async fn empty_update_returns_current_record() {
        let app = TestApp::spawn().await;
        let id = app.create_handicraft("Shelf", "wood").await;

        let res = app
            .patch_form(&routes::handicraft(&id), form(&[("name", " ")]))
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["data"]["name"], "Shelf");
        assert_eq!(res.body["data"]["tags"], json!(["wood"]));
    }

    #[tokio::test]
    async fn missing_record_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app
            .patch_form(
                &routes::handicraft("0b1c2d3e-4f50-4617-8899-aabbccddeeff"),
                form(&[("name", "Ghost")]).part("photo_url", photo("ghost.jpg")),
            )
            .await;

        assert_eq!(res.status, 404);
        assert!(app.store.is_empty().await);
    }
}

mod delete {
    use super::*;

    #[tokio::test]
    async fn removes_row_and_blob() {
        let app = TestApp::spawn().await;
        let id = app.create_handicraft("Shelf", "wood").await;
        let key = app.get(&routes::handicraft(&id)).await.photo_key("/data/photo_url");

        let res = app.delete(&routes::handicraft(&id)).await;

        assert_eq!(res.status, 204);
        assert!(res.text.is_empty());
        assert!(!app.store.contains(&key).await);
        assert_eq!(app.get(&routes::handicraft(&id)).await.status, 404);
    }

    #[tokio::test]
    async fn tags_survive_the_record() {
        let app = TestApp::spawn().await;
        let id = app.create_handicraft("Shelf", "wood").await;
        app.delete(&routes::handicraft(&id)).await;

        let res = app.get(&format!("{}?tags=wood", routes::HANDICRAFTS)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["results"], 0);
    }

    #[tokio::test]
    async fn missing_record_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app
            .delete(&routes::handicraft("0b1c2d3e-4f50-4617-8899-aabbccddeeff"))
            .await;

        assert_eq!(res.status, 404);
    }
}
