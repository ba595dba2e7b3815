use super::*;

/// Loading a chapter renders it and refines its catalog title.
#[tokio::test]
async fn chapter_renders_and_refines_title() {
    let lib_dir = tempfile::tempdir().unwrap();
    write_library(lib_dir.path(), NOVEL);
    let app = test_router(test_app_state(lib_dir.path()).await);

    let resp = get(
        app.clone(),
        &format!("/api/chapter?path={}", q("章稿/卷一/第二章.md")),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let json = body_json(resp).await;
    assert_eq!(json["index"], 1);
    assert_eq!(json["title"], "第二章 入城");
    assert_eq!(json["has_prev"], true);
    assert_eq!(json["has_next"], true);
    assert!(json["html"].as_str().unwrap().contains("<p>城門大開。</p>"));
    assert!(json["word_count"].as_u64().unwrap() > 0);

    let catalog = body_json(get(app, "/api/catalog").await).await;
    let entry = &catalog["groups"][0]["entries"][1];
    assert_eq!(entry["path"], "章稿/卷一/第二章.md");
    assert_eq!(entry["title"], "第二章 入城");
    assert_eq!(entry["title_resolved"], true);
}

/// Paths outside the catalog are 404, even when the file exists.
#[tokio::test]
async fn chapter_outside_catalog_is_not_found() {
    let lib_dir = tempfile::tempdir().unwrap();
    write_library(lib_dir.path(), NOVEL);
    let app = test_router(test_app_state(lib_dir.path()).await);

    for path in ["README.md", "設定/人物.md", "章稿/卷一/第九章.md", "../etc/passwd"] {
        let resp = get(app.clone(), &format!("/api/chapter?path={}", q(path))).await;
        assert_eq!(resp.status(), 404, "{path}");
    }

    let resp = get(app, "/api/chapter?path=").await;
    assert_eq!(resp.status(), 400);
}

/// A fetch failure is a gateway error and leaves the fallback title.
#[tokio::test]
async fn chapter_fetch_failure_keeps_title() {
    let lib_dir = tempfile::tempdir().unwrap();
    write_library(lib_dir.path(), NOVEL);
    let app = test_router(test_app_state(lib_dir.path()).await);

    std::fs::remove_file(lib_dir.path().join("章稿/卷一/第一章.md")).unwrap();
    let resp = get(
        app.clone(),
        &format!("/api/chapter?path={}", q("章稿/卷一/第一章.md")),
    )
    .await;
    assert_eq!(resp.status(), 502);

    let catalog = body_json(get(app, "/api/catalog").await).await;
    let entry = &catalog["groups"][0]["entries"][0];
    assert_eq!(entry["title"], "第一章");
    assert_eq!(entry["title_resolved"], false);
}

/// Next-chapter loading crosses volumes and ends with 204.
#[tokio::test]
async fn next_chapter_follows_reading_order() {
    let lib_dir = tempfile::tempdir().unwrap();
    write_library(lib_dir.path(), NOVEL);
    let app = test_router(test_app_state(lib_dir.path()).await);

    let resp = get(
        app.clone(),
        &format!("/api/chapter/next?after={}", q("章稿/卷一/第十章.md")),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let json = body_json(resp).await;
    assert_eq!(json["path"], "章稿/卷二/第一章.md");
    assert_eq!(json["index"], 3);
    // No heading: the file name stays the title.
    assert_eq!(json["title"], "第一章");

    let resp = get(
        app.clone(),
        &format!("/api/chapter/next?after={}", q("章稿/番外/後記.md")),
    )
    .await;
    assert_eq!(resp.status(), 204);

    let resp = get(
        app,
        &format!("/api/chapter/next?after={}", q("章稿/卷九/第一章.md")),
    )
    .await;
    assert_eq!(resp.status(), 404);
}

/// The raw proxy serves Markdown for catalog chapters only.
#[tokio::test]
async fn raw_proxy_serves_catalog_chapters() {
    let lib_dir = tempfile::tempdir().unwrap();
    write_library(lib_dir.path(), NOVEL);
    let app = test_router(test_app_state(lib_dir.path()).await);

    let resp = get(
        app.clone(),
        &format!("/api/raw/{}/{}/{}", q("章稿"), q("卷十"), q("第三章.md")),
    )
    .await;
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers()["content-type"],
        "text/markdown; charset=utf-8"
    );
    assert_eq!(body_string(resp).await, "# 第三章 歸來\n");

    let resp = get(app, "/api/raw/README.md").await;
    assert_eq!(resp.status(), 404);
}
