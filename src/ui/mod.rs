//! Browser page for uploading or photographing an image

use axum::response::Html;

const INDEX_HTML: &str = include_str!("index.html");

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
