//! HTTP request handlers.

use crate::error::{AppError, Result};
use crate::resolver::{PathKind, PathResolver};
use crate::server::AppState;
use axum::{
    body::Body,
    extract::State,
    http::{StatusCode, Uri, header},
    response::Response,
};
use std::path::Path;
use tokio_util::io::ReaderStream;

/// JSON content type for listings.
const JSON_MIME: &str = "application/json";

/// Build a response, returning 500 on error (which shouldn't happen).
fn build_response(status: StatusCode, content_type: &str, body: impl Into<Body>) -> Response<Body> {
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, content_type)
        .body(body.into())
        .unwrap_or_else(|_| {
            Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .body(Body::from("Internal error"))
                .unwrap_or_default()
        })
}

/// Percent-decoded request path, leading slash included.
pub fn request_path(uri: &Uri) -> String {
    let raw = uri.path();
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

/// Catch-all GET: directory listing, file, or derived image.
pub async fn serve(State(state): State<AppState>, uri: Uri) -> Result<Response<Body>> {
    let request_path = request_path(&uri);

    let full_path = state
        .resolver
        .resolve(&request_path)
        .ok_or_else(|| AppError::NotFound(request_path.clone()))?;

    match PathResolver::classify(&full_path).await {
        PathKind::Directory => {
            let data = state.listing(&request_path, &full_path).await;
            Ok(build_response(StatusCode::OK, JSON_MIME, data))
        }
        PathKind::File => stream_file(&full_path, &request_path).await,
        PathKind::Missing if state.engine.applies_to(&full_path) => {
            let served = state
                .engine
                .derive(&full_path)
                .await
                .into_served_path(&full_path);
            stream_file(&served, &request_path).await
        }
        PathKind::Missing => Err(AppError::NotFound(request_path)),
    }
}

/// Stream a file with a content type guessed from its extension.
///
/// Errors name `request_path`, never the filesystem path.
async fn stream_file(path: &Path, request_path: &str) -> Result<Response<Body>> {
    let file = tokio::fs::File::open(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AppError::NotFound(request_path.to_string())
        } else {
            AppError::Io(e)
        }
    })?;

    let meta = file.metadata().await?;
    if meta.is_dir() {
        return Err(AppError::NotFound(request_path.to_string()));
    }

    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let body = Body::from_stream(ReaderStream::new(file));

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime.essence_str())
        .header(header::CONTENT_LENGTH, meta.len())
        .body(body)
        .unwrap_or_else(|_| Response::default()))
}
