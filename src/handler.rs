//! Request handling module
//!
//! Entry point for HTTP request processing: method validation, body limits,
//! and dispatch onto the storage operations.

use crate::config::AppState;
use crate::error::StorageError;
use crate::logger;
use crate::mime;
use crate::response;
use crate::storage::{self, WriteOutcome};
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::path::Path;
use std::sync::Arc;

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let is_head = method == Method::HEAD;

    let access_log = state
        .cached_access_log
        .load(std::sync::atomic::Ordering::Relaxed);
    if access_log {
        logger::log_request(&method, &uri, req.version());
    }

    // 1. Check HTTP method
    if method == Method::OPTIONS {
        return Ok(response::build_options_response(
            state.config.http.enable_cors,
        ));
    }
    if !matches!(
        method,
        Method::GET | Method::HEAD | Method::PUT | Method::POST | Method::DELETE
    ) {
        logger::log_warning(&format!("Method not allowed: {method}"));
        return Ok(response::build_405_response());
    }

    // 2. Check body size
    if let Some(resp) = check_body_size(&req, state.config.http.max_body_size) {
        return Ok(resp);
    }

    // 3. Collect the body for write operations
    let body = if matches!(method, Method::PUT | Method::POST) {
        match req.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                logger::log_error(&format!("Failed to read request body: {e}"));
                return Ok(response::build_error_response(
                    StatusCode::BAD_REQUEST,
                    "Failed to read request body",
                ));
            }
        }
    } else {
        Bytes::new()
    };

    // 4. Dispatch to the storage operation
    let resp = dispatch(&method, uri.path(), &body, is_head, &state).await;
    if access_log {
        logger::log_response(&method, uri.path(), resp.status());
    }
    Ok(resp)
}

/// Dispatch a request onto one of the four storage operations
///
/// An empty path or a trailing slash selects the listing operation;
/// everything else is treated as a file path.
pub async fn dispatch(
    method: &Method,
    path: &str,
    body: &[u8],
    is_head: bool,
    state: &AppState,
) -> Response<Full<Bytes>> {
    let rel = path.trim_start_matches('/');

    match *method {
        Method::GET | Method::HEAD => handle_get(rel, is_head, state).await,
        Method::PUT | Method::POST => handle_write(rel, body, state).await,
        Method::DELETE => handle_delete(rel, state).await,
        _ => response::build_405_response(),
    }
}

/// Serve a directory listing or raw file contents
async fn handle_get(rel: &str, is_head: bool, state: &AppState) -> Response<Full<Bytes>> {
    if rel.is_empty() || rel.ends_with('/') {
        return match storage::list_directory(&state.root, rel).await {
            Ok(entries) => response::build_json_response(StatusCode::OK, &entries, is_head),
            Err(e) => error_response(&e),
        };
    }

    match storage::read_file(&state.root, rel).await {
        Ok(contents) => {
            let extension = Path::new(rel).extension().and_then(|e| e.to_str());
            response::build_file_response(contents, mime::get_content_type(extension), is_head)
        }
        Err(e) => error_response(&e),
    }
}

/// Write the request body as file contents
async fn handle_write(rel: &str, body: &[u8], state: &AppState) -> Response<Full<Bytes>> {
    match storage::write_file(&state.root, rel, body).await {
        Ok(WriteOutcome::Created) => response::build_json_response(
            StatusCode::CREATED,
            &serde_json::json!({ "status": "ok", "message": format!("Created file {rel}") }),
            false,
        ),
        Ok(WriteOutcome::Updated) => response::build_json_response(
            StatusCode::OK,
            &serde_json::json!({ "status": "ok", "message": format!("Updated file {rel}") }),
            false,
        ),
        Err(e) => error_response(&e),
    }
}

/// Delete a file
async fn handle_delete(rel: &str, state: &AppState) -> Response<Full<Bytes>> {
    match storage::delete_file(&state.root, rel).await {
        Ok(()) => response::build_json_response(
            StatusCode::OK,
            &serde_json::json!({ "status": "ok", "message": format!("Deleted file {rel}") }),
            false,
        ),
        Err(e) => error_response(&e),
    }
}

/// Translate a storage error into its HTTP response
fn error_response(error: &StorageError) -> Response<Full<Bytes>> {
    if matches!(error, StorageError::Io(_)) {
        logger::log_error(&format!("{error}"));
    }
    response::build_error_response(error.status(), &error.client_message())
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(
    req: &Request<hyper::body::Incoming>,
    max_body_size: u64,
) -> Option<Response<Full<Bytes>>> {
    let header = req.headers().get("content-length")?;
    let Ok(value) = header.to_str() else {
        logger::log_warning("Content-Length header is not valid ASCII");
        return None;
    };

    match value.parse::<u64>() {
        Ok(size) if size > max_body_size => {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Some(response::build_413_response())
        }
        Ok(_) => None,
        Err(_) => {
            logger::log_warning(&format!(
                "Invalid Content-Length value: '{value}', skipping size check"
            ));
            None
        }
    }
}
