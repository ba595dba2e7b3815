use super::*;

fn catalog_paths(json: &serde_json::Value) -> Vec<String> {
    json["groups"]
        .as_array()
        .unwrap()
        .iter()
        .flat_map(|g| g["entries"].as_array().unwrap().iter())
        .map(|e| e["path"].as_str().unwrap().to_string())
        .collect()
}

/// Health reports the number of catalog chapters.
#[tokio::test]
async fn health_reports_chapter_count() {
    let lib_dir = tempfile::tempdir().unwrap();
    write_library(lib_dir.path(), NOVEL);
    let app = test_router(test_app_state(lib_dir.path()).await);

    let resp = get(app, "/health").await;
    assert_eq!(resp.status(), 200);
    let json = body_json(resp).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["chapters"], 6);
    assert!(json["source"].as_str().unwrap().starts_with("local:"));
}

/// The catalog lists chapters in reading order, grouped by volume.
#[tokio::test]
async fn catalog_is_in_reading_order() {
    let lib_dir = tempfile::tempdir().unwrap();
    write_library(lib_dir.path(), NOVEL);
    let app = test_router(test_app_state(lib_dir.path()).await);

    let resp = get(app, "/api/catalog").await;
    assert_eq!(resp.status(), 200);
    let json = body_json(resp).await;
    assert_eq!(json["total"], 6);

    let folders: Vec<&str> = json["groups"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["folder"].as_str().unwrap())
        .collect();
    assert_eq!(
        folders,
        vec!["章稿/卷一", "章稿/卷二", "章稿/卷十", "章稿/番外"]
    );
    assert_eq!(
        catalog_paths(&json),
        vec![
            "章稿/卷一/第一章.md",
            "章稿/卷一/第二章.md",
            "章稿/卷一/第十章.md",
            "章稿/卷二/第一章.md",
            "章稿/卷十/第三章.md",
            "章稿/番外/後記.md",
        ]
    );

    let first = &json["groups"][0]["entries"][0];
    assert_eq!(first["title"], "第一章");
    assert_eq!(first["title_resolved"], false);
}

/// The search filter matches paths and titles.
#[tokio::test]
async fn catalog_filter() {
    let lib_dir = tempfile::tempdir().unwrap();
    write_library(lib_dir.path(), NOVEL);
    let app = test_router(test_app_state(lib_dir.path()).await);

    let resp = get(app.clone(), &format!("/api/catalog?q={}", q("後記"))).await;
    let json = body_json(resp).await;
    assert_eq!(catalog_paths(&json), vec!["章稿/番外/後記.md"]);
    assert_eq!(json["total"], 6);

    let resp = get(app, &format!("/api/catalog?q={}", q("卷二"))).await;
    let json = body_json(resp).await;
    assert_eq!(catalog_paths(&json), vec!["章稿/卷二/第一章.md"]);
}

/// Refresh picks up new files and slots them into reading order.
#[tokio::test]
async fn refresh_adds_new_chapters_in_order() {
    let lib_dir = tempfile::tempdir().unwrap();
    write_library(lib_dir.path(), NOVEL);
    let app = test_router(test_app_state(lib_dir.path()).await);

    // Resolve a title first; it must survive the refresh.
    let resp = get(
        app.clone(),
        &format!("/api/chapter?path={}", q("章稿/卷一/第一章.md")),
    )
    .await;
    assert_eq!(resp.status(), 200);

    write_library(lib_dir.path(), &[("章稿/卷一/第三章.md", "# 第三章\n")]);
    let resp = post(app.clone(), "/api/catalog/refresh").await;
    assert_eq!(resp.status(), 200);
    assert_eq!(body_json(resp).await["chapters"], 7);

    let json = body_json(get(app, "/api/catalog").await).await;
    let paths = catalog_paths(&json);
    assert_eq!(paths[2], "章稿/卷一/第三章.md");
    assert_eq!(paths[3], "章稿/卷一/第十章.md");
    assert_eq!(json["groups"][0]["entries"][0]["title"], "第一章 啟程");
}

/// With title prefetch enabled, refresh resolves every title before
/// responding.
#[tokio::test]
async fn refresh_prefetches_titles_when_enabled() {
    let lib_dir = tempfile::tempdir().unwrap();
    write_library(lib_dir.path(), NOVEL);
    let mut config = test_config(lib_dir.path());
    config.reader.prefetch_titles = true;
    let app = test_router(app_state_from(config).await);

    write_library(lib_dir.path(), &[("章稿/卷一/第三章.md", "# 第三章 夜行\n")]);
    let resp = post(app.clone(), "/api/catalog/refresh").await;
    assert_eq!(resp.status(), 200);
    let json = body_json(resp).await;
    assert_eq!(json["chapters"], 7);
    assert_eq!(json["prefetch"]["resolved"], 7);
    assert_eq!(json["prefetch"]["failed"], 0);

    let json = body_json(get(app, "/api/catalog").await).await;
    let entries = &json["groups"][0]["entries"];
    assert_eq!(entries[2]["path"], "章稿/卷一/第三章.md");
    assert_eq!(entries[2]["title"], "第三章 夜行");
    assert!(
        json["groups"]
            .as_array()
            .unwrap()
            .iter()
            .flat_map(|g| g["entries"].as_array().unwrap().iter())
            .all(|e| e["title_resolved"] == true)
    );
}
