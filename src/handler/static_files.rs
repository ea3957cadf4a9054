//! Static file serving module
//!
//! Serves the static root as the website filesystem: raw asset bytes, the
//! index document for directory requests, and a built-in homepage when no
//! index document exists.

use crate::config::AppState;
use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use tokio::fs;

/// Serve a GET/HEAD request for any non-API path
pub async fn serve(ctx: &RequestContext<'_>, state: &AppState) -> Response<Full<Bytes>> {
    match load_from_root(state, ctx.path).await {
        Some((content, content_type)) => build_static_file_response(
            &content,
            content_type,
            ctx.if_none_match.as_deref(),
            ctx.is_head,
        ),
        None if is_index_request(ctx.path) => {
            // No index document in the static root; answer with the
            // built-in page so the server is inspectable out of the box
            http::response::build_html_response(fallback_homepage(), ctx.is_head)
        }
        None => http::build_404_response(),
    }
}

/// Whether the request targets the index document rather than an asset
fn is_index_request(path: &str) -> bool {
    path == "/" || path.is_empty()
}

/// Load a file from the static root, resolving directory requests through
/// the configured index-file list
async fn load_from_root(state: &AppState, path: &str) -> Option<(Vec<u8>, &'static str)> {
    // Remove leading slash and strip parent-directory components
    let clean_path = path.trim_start_matches('/').replace("..", "");
    let mut file_path = state.static_root.join(&clean_path);

    // Directory request: try index files
    if file_path.is_dir() || clean_path.is_empty() || clean_path.ends_with('/') {
        for index_file in &state.config.resources.index_files {
            let candidate = file_path.join(index_file);
            if candidate.is_file() {
                file_path = candidate;
                break;
            }
        }
    }

    // Directory with no index document is a plain miss
    if file_path.is_dir() {
        return None;
    }

    // File not found is an ordinary 404, not worth a log line
    let Ok(file_path) = file_path.canonicalize() else {
        return None;
    };
    // static_root is canonical, so a resolved path outside it means the
    // request escaped the tree (e.g. through a symlink)
    if !file_path.starts_with(&state.static_root) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            path,
            file_path.display()
        ));
        return None;
    }

    let content = match fs::read(&file_path).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {}",
                file_path.display(),
                e
            ));
            return None;
        }
    };

    let content_type = mime::get_content_type(file_path.extension().and_then(|e| e.to_str()));
    Some((content, content_type))
}

/// Build the response for a static file, honoring `If-None-Match`
fn build_static_file_response(
    data: &[u8],
    content_type: &str,
    if_none_match: Option<&str>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let etag = cache::generate_etag(data);

    if cache::check_etag_match(if_none_match, &etag) {
        return http::build_304_response(&etag);
    }

    // build_cached_response drops the body for HEAD while keeping the
    // Content-Length of the full representation
    http::response::build_cached_response(Bytes::from(data.to_owned()), content_type, &etag, is_head)
}

/// Built-in homepage served when the static root has no index document
fn fallback_homepage() -> String {
    String::from(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>devserve</title>
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Arial, sans-serif;
            line-height: 1.6;
            max-width: 640px;
            margin: 48px auto;
            padding: 0 20px;
            color: #333;
        }
        h1 { font-size: 1.8em; }
        code {
            background: #f0f0f0;
            padding: 2px 6px;
            border-radius: 3px;
            font-size: 0.9em;
        }
        li { margin: 8px 0; }
        .note { color: #666; font-size: 0.9em; margin-top: 24px; }
    </style>
</head>
<body>
    <h1>devserve</h1>
    <p>The development server is running, but the static root has no
    <code>index.html</code> yet. Endpoints:</p>
    <ul>
        <li><code>GET /&lt;path&gt;</code> &mdash; static files from the root</li>
        <li><code>GET /read?file=&lt;path&gt;</code> &mdash; file contents as JSON</li>
        <li><code>POST /write?file=&lt;name&gt;</code> &mdash; save posted content</li>
        <li><code>POST /log</code> &mdash; relay a message to the server log</li>
    </ul>
    <p class="note">Drop an <code>index.html</code> into the static root to
    replace this page.</p>
</body>
</html>"#,
    )
}
