// File API handlers module
//
// The three JSON endpoints: /read, /write, /log. Each one maps a single
// request to a single response with no cross-request state; filesystem
// failures are reported in the payload with status 200.

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{HeaderMap, Response, StatusCode, Uri};
use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;

use super::response::{bad_request, json_response};
use super::types::{LogResponse, ReadResponse, WriteResponse};
use crate::config::AppState;
use crate::logger;

/// GET /read?file=<relative path>
///
/// Returns the full text contents of a file under the static root. The
/// `file` parameter resolves against the static root without further
/// restriction; only the write path confines names to a basename.
pub async fn handle_read(
    uri: &Uri,
    state: &Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let Some(file) = query_param(uri, "file") else {
        logger::log_warning("read request missing 'file' query parameter");
        return Ok(bad_request("missing 'file' query parameter"));
    };

    let path = state.static_root.join(&file);
    let response = match fs::read_to_string(&path).await {
        Ok(text) => ReadResponse::Text { text },
        Err(err) => ReadResponse::Error {
            error: err.to_string(),
        },
    };

    json_response(StatusCode::OK, &response)
}

/// POST /write?file=<name>
///
/// Persists the posted content into the write directory, keeping only the
/// final component of the supplied name. A JSON body is re-serialized as
/// JSON text; any other body must be a urlencoded form with a `text`
/// field, written verbatim. An existing file of the same name is
/// overwritten.
pub async fn handle_write<B>(
    req: hyper::Request<B>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: hyper::body::Body,
    B::Error: std::fmt::Display,
{
    // Decided once at boot, not re-probed per request
    if !state.write_enabled {
        let response = WriteResponse::Error {
            error: format!(
                "write is disabled, you need to create the write folder {}",
                state.write_dir.display()
            ),
        };
        return json_response(StatusCode::OK, &response);
    }

    let Some(file) = query_param(req.uri(), "file") else {
        logger::log_warning("write request missing 'file' query parameter");
        return Ok(bad_request("missing 'file' query parameter"));
    };

    let is_json = is_json_request(req.headers());
    let body = match req.into_body().collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) => {
            let response = WriteResponse::Error {
                error: err.to_string(),
            };
            return json_response(StatusCode::OK, &response);
        }
    };

    let contents = if is_json {
        render_json_payload(&body)
    } else {
        form_field(&body, "text").ok_or_else(|| "form body is missing the 'text' field".to_string())
    };

    let response = match contents {
        Ok(contents) => match persist(&state.write_dir, &file, &contents).await {
            Ok(target) => {
                logger::log_file_written(&target);
                WriteResponse::Written {
                    filename: target.display().to_string(),
                }
            }
            Err(err) => WriteResponse::Error {
                error: err.to_string(),
            },
        },
        Err(error) => WriteResponse::Error { error },
    };

    json_response(StatusCode::OK, &response)
}

/// POST /log with form field `msg`
///
/// Relays the client message into the server log. Always answers
/// `{"status": 0}`; there is no failure path beyond a malformed request.
pub async fn handle_log<B>(req: hyper::Request<B>) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: hyper::body::Body,
    B::Error: std::fmt::Display,
{
    let body = match req.into_body().collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) => {
            logger::log_warning(&format!("unreadable log request body: {err}"));
            return Ok(bad_request("unreadable request body"));
        }
    };

    let Some(msg) = form_field(&body, "msg") else {
        logger::log_warning("log request missing 'msg' form field");
        return Ok(bad_request("missing 'msg' form field"));
    };

    logger::log_client_message(&msg);
    json_response(StatusCode::OK, &LogResponse::ok())
}

/// Extract a query parameter, percent-decoded
fn query_param(uri: &Uri, name: &str) -> Option<String> {
    uri.query().and_then(|q| form_field(q.as_bytes(), name))
}

/// Extract a field from a urlencoded form body, percent-decoded
fn form_field(body: &[u8], name: &str) -> Option<String> {
    form_urlencoded::parse(body)
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Whether the request declared a JSON body
fn is_json_request(headers: &HeaderMap) -> bool {
    headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| ct.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
}

/// Parse the body as JSON and hand back its canonical serialization
fn render_json_payload(body: &[u8]) -> Result<String, String> {
    serde_json::from_slice::<serde_json::Value>(body)
        .map(|value| value.to_string())
        .map_err(|e| e.to_string())
}

/// Write `contents` into the write directory under the basename of `file`
async fn persist(write_dir: &Path, file: &str, contents: &str) -> std::io::Result<PathBuf> {
    let target = write_dir.join(basename(file));
    fs::write(&target, contents).await?;
    Ok(target)
}

/// Final path component of the supplied name; directory components are
/// dropped so uploads cannot land outside the write directory
fn basename(file: &str) -> &std::ffi::OsStr {
    Path::new(file).file_name().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn state_with_root(root: &Path) -> Arc<AppState> {
        let mut config = Config::load_from("devserve-test-missing").expect("defaults");
        config.resources.static_root = root.to_str().expect("utf-8 path").to_string();
        Arc::new(AppState::new(&config).expect("state"))
    }

    async fn body_json(response: Response<Full<Bytes>>) -> serde_json::Value {
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        serde_json::from_slice(&bytes).expect("json body")
    }

    fn post(uri: &str, content_type: Option<&str>, body: &str) -> hyper::Request<Full<Bytes>> {
        let mut builder = hyper::Request::builder().method("POST").uri(uri);
        if let Some(ct) = content_type {
            builder = builder.header("content-type", ct);
        }
        builder
            .body(Full::new(Bytes::from(body.to_string())))
            .expect("request")
    }

    #[test]
    fn query_param_is_percent_decoded() {
        let uri: Uri = "/read?file=my%20notes.txt&x=1".parse().expect("uri");
        assert_eq!(query_param(&uri, "file").as_deref(), Some("my notes.txt"));
        assert_eq!(query_param(&uri, "missing"), None);
    }

    #[test]
    fn form_field_finds_the_named_pair() {
        assert_eq!(
            form_field(b"msg=hello+world&other=1", "msg").as_deref(),
            Some("hello world")
        );
        assert_eq!(form_field(b"other=1", "msg"), None);
        assert_eq!(form_field(b"", "msg"), None);
    }

    #[test]
    fn json_detection_ignores_charset_and_case() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "content-type",
            "Application/JSON; charset=utf-8".parse().expect("value"),
        );
        assert!(is_json_request(&headers));

        headers.insert(
            "content-type",
            "application/x-www-form-urlencoded".parse().expect("value"),
        );
        assert!(!is_json_request(&headers));

        assert!(!is_json_request(&HeaderMap::new()));
    }

    #[test]
    fn json_payload_reserializes_or_reports() {
        let rendered = render_json_payload(br#"{ "a": [1, 2],  "b": "x" }"#).expect("valid json");
        let reparsed: serde_json::Value = serde_json::from_str(&rendered).expect("round trip");
        assert_eq!(reparsed, serde_json::json!({"a": [1, 2], "b": "x"}));

        assert!(render_json_payload(b"{not json").is_err());
    }

    #[test]
    fn basename_strips_directory_components() {
        assert_eq!(basename("a/b/c.txt"), "c.txt");
        assert_eq!(basename("c.txt"), "c.txt");
        assert_eq!(basename("/abs/path.json"), "path.json");
        assert_eq!(basename(""), "");
    }

    #[tokio::test]
    async fn read_returns_exact_contents() {
        let root = tempfile::tempdir().expect("tempdir");
        std::fs::write(root.path().join("notes.txt"), "line one\nline two").expect("fixture");
        let state = state_with_root(root.path());

        let uri: Uri = "/read?file=notes.txt".parse().expect("uri");
        let response = handle_read(&uri, &state).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["text"], "line one\nline two");
        assert!(json.get("error").is_none());
    }

    #[tokio::test]
    async fn read_missing_file_reports_error_only() {
        let root = tempfile::tempdir().expect("tempdir");
        let state = state_with_root(root.path());

        let uri: Uri = "/read?file=absent.txt".parse().expect("uri");
        let json = body_json(handle_read(&uri, &state).await.expect("response")).await;
        assert!(json.get("text").is_none());
        assert!(!json["error"].as_str().expect("message").is_empty());
    }

    #[tokio::test]
    async fn read_without_file_param_is_a_bad_request() {
        let root = tempfile::tempdir().expect("tempdir");
        let state = state_with_root(root.path());

        let uri: Uri = "/read".parse().expect("uri");
        let response = handle_read(&uri, &state).await.expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn write_disabled_reports_error_and_touches_nothing() {
        let root = tempfile::tempdir().expect("tempdir");
        let state = state_with_root(root.path());
        assert!(!state.write_enabled);

        let req = post("/write?file=a.txt", None, "text=data");
        let json = body_json(handle_write(req, Arc::clone(&state)).await.expect("response")).await;

        let error = json["error"].as_str().expect("message");
        assert!(error.starts_with("write is disabled"));
        assert!(!state.write_dir.join("a.txt").exists());
    }

    #[tokio::test]
    async fn write_without_file_param_is_a_bad_request() {
        let root = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(root.path().join("write")).expect("mkdir");
        let state = state_with_root(root.path());

        let req = post("/write", None, "text=x");
        let response = handle_write(req, state).await.expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn write_strips_directories_and_round_trips_form_text() {
        let root = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(root.path().join("write")).expect("mkdir");
        let state = state_with_root(root.path());

        let req = post("/write?file=a/b/c.txt", None, "text=posted+body");
        let json = body_json(handle_write(req, Arc::clone(&state)).await.expect("response")).await;

        let filename = json["filename"].as_str().expect("filename");
        assert!(filename.ends_with("c.txt"));

        let on_disk = std::fs::read_to_string(state.write_dir.join("c.txt")).expect("read back");
        assert_eq!(on_disk, "posted body");
    }

    #[tokio::test]
    async fn write_json_body_round_trips_to_equivalent_json() {
        let root = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(root.path().join("write")).expect("mkdir");
        let state = state_with_root(root.path());

        let req = post(
            "/write?file=data.json",
            Some("application/json"),
            r#"{"items": [1, 2, 3], "name": "pad"}"#,
        );
        let json = body_json(handle_write(req, Arc::clone(&state)).await.expect("response")).await;
        assert!(json.get("error").is_none(), "unexpected error: {json}");

        let on_disk = std::fs::read_to_string(state.write_dir.join("data.json")).expect("read");
        let reparsed: serde_json::Value = serde_json::from_str(&on_disk).expect("json on disk");
        assert_eq!(reparsed, serde_json::json!({"items": [1, 2, 3], "name": "pad"}));
    }

    #[tokio::test]
    async fn repeated_write_overwrites_prior_content() {
        let root = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(root.path().join("write")).expect("mkdir");
        let state = state_with_root(root.path());

        let first = post("/write?file=same.txt", None, "text=first");
        handle_write(first, Arc::clone(&state)).await.expect("response");
        let second = post("/write?file=same.txt", None, "text=second");
        handle_write(second, Arc::clone(&state)).await.expect("response");

        let on_disk = std::fs::read_to_string(state.write_dir.join("same.txt")).expect("read");
        assert_eq!(on_disk, "second");
    }

    #[tokio::test]
    async fn write_form_without_text_field_reports_error() {
        let root = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(root.path().join("write")).expect("mkdir");
        let state = state_with_root(root.path());

        let req = post("/write?file=a.txt", None, "other=1");
        let json = body_json(handle_write(req, Arc::clone(&state)).await.expect("response")).await;
        assert!(json["error"].as_str().expect("message").contains("text"));
        assert!(!state.write_dir.join("a.txt").exists());
    }

    #[tokio::test]
    async fn log_relay_always_answers_status_zero() {
        let req = post("/log", None, "msg=hello");
        let response = handle_log(req).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json, serde_json::json!({"status": 0}));
    }

    #[tokio::test]
    async fn log_without_msg_field_is_a_bad_request() {
        let req = post("/log", None, "other=1");
        let response = handle_log(req).await.expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
