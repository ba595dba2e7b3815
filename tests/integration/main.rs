mod catalog_tests;
mod chapter_tests;

use std::path::Path;

use axum::Router;
use axum::body::Body;
use http_body_util::BodyExt;
use tower::ServiceExt;

use mdnovel::catalog::CatalogRules;
use mdnovel::config::Config;
use mdnovel::reader::Library;
use mdnovel::source::Source;
use mdnovel::state::AppState;

/// A small novel: two volumes, an unnumbered appendix and a root README.
pub const NOVEL: &[(&str, &str)] = &[
    ("README.md", "# 關於本書\n"),
    ("章稿/卷一/第十章.md", "# 第十章 決戰\n\n刀光。\n"),
    ("章稿/卷一/第二章.md", "# 第二章 入城\n\n城門大開。\n"),
    ("章稿/卷一/第一章.md", "# 第一章 啟程\n\n他推開門。\n"),
    ("章稿/卷二/第一章.md", "沒有標題的正文\n"),
    ("章稿/卷十/第三章.md", "# 第三章 歸來\n"),
    ("章稿/番外/後記.md", "# 後記\n"),
    ("設定/人物.md", "# 人物\n"),
];

/// Write `files` below `root`.
pub fn write_library(root: &Path, files: &[(&str, &str)]) {
    for (rel, content) in files {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap_or_else(|e| panic!("write {path:?}: {e}"));
    }
}

/// Build a Config reading a local library.
pub fn test_config(lib_dir: &Path) -> Config {
    let toml_str = format!(
        r#"
[source]
kind = "local"
root_path = {lib_dir:?}

[catalog]
path_filter = "章稿"
"#
    );
    toml::from_str(&toml_str).expect("test config should parse")
}

/// Build an AppState over the local library at `lib_dir`.
pub async fn test_app_state(lib_dir: &Path) -> AppState {
    app_state_from(test_config(lib_dir)).await
}

/// Build an AppState from a prepared Config.
pub async fn app_state_from(config: Config) -> AppState {
    config.validate().expect("test config should validate");
    let source = Source::from_config(&config.source).expect("local source");
    let library = Library::load(source, CatalogRules::from(&config.catalog))
        .await
        .expect("library should load");
    AppState::new(config, library)
}

/// Build a full Router from an AppState.
pub fn test_router(state: AppState) -> Router {
    mdnovel::build_router(state)
}

/// Percent-encode a query value.
pub fn q(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Send a GET request and return the response.
pub async fn get(app: Router, path: &str) -> axum::response::Response {
    let req = axum::http::Request::builder()
        .uri(path)
        .body(Body::empty())
        .unwrap();
    app.oneshot(req).await.unwrap()
}

/// Send an empty POST request and return the response.
pub async fn post(app: Router, path: &str) -> axum::response::Response {
    let req = axum::http::Request::builder()
        .method("POST")
        .uri(path)
        .body(Body::empty())
        .unwrap();
    app.oneshot(req).await.unwrap()
}

/// Extract response body as a String.
pub async fn body_string(response: axum::response::Response) -> String {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Extract response body as JSON.
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).expect("response should be JSON")
}
