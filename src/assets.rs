use axum::{
    extract::Path,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "static/"]
pub struct Assets;

// `curl -X GET http://localhost:8081/static/style.css`
pub async fn serve(Path(path): Path<String>) -> Response {
    let path = path.trim_start_matches('/');
    match Assets::get(path) {
        Some(file) => (
            [(header::CONTENT_TYPE, file.metadata.mimetype().to_owned())],
            file.data.into_owned(),
        )
            .into_response(),
        None => {
            tracing::debug!("no embedded asset {}", path);
            (StatusCode::NOT_FOUND, "Not found").into_response()
        }
    }
}
