// File API response shapes
//
// Each endpoint answers 200 with exactly one of these payloads. Success
// and error are distinguished by payload shape, never by status code, so
// the success variants must never carry an `error` key and vice versa.

use serde::Serialize;

/// Payload of `GET /read`
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ReadResponse {
    /// Full text contents of the requested file
    Text { text: String },
    /// Whatever went wrong while opening or decoding it
    Error { error: String },
}

/// Payload of `POST /write`
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum WriteResponse {
    /// Absolute path of the file that was written
    Written { filename: String },
    /// Failure, including the writes-disabled condition
    Error { error: String },
}

/// Payload of `POST /log`, always `{"status": 0}`
#[derive(Debug, Serialize)]
pub struct LogResponse {
    pub status: u8,
}

impl LogResponse {
    pub const fn ok() -> Self {
        Self { status: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_json(value: &impl serde::Serialize) -> serde_json::Value {
        serde_json::to_value(value).expect("serializable")
    }

    #[test]
    fn read_success_has_only_a_text_key() {
        let json = to_json(&ReadResponse::Text {
            text: "file body".to_string(),
        });
        assert_eq!(json["text"], "file body");
        assert!(json.get("error").is_none());
        assert_eq!(json.as_object().expect("object").len(), 1);
    }

    #[test]
    fn read_failure_has_only_an_error_key() {
        let json = to_json(&ReadResponse::Error {
            error: "No such file or directory".to_string(),
        });
        assert!(json.get("text").is_none());
        assert_eq!(json["error"], "No such file or directory");
        assert_eq!(json.as_object().expect("object").len(), 1);
    }

    #[test]
    fn write_success_reports_the_filename() {
        let json = to_json(&WriteResponse::Written {
            filename: "/srv/write/c.txt".to_string(),
        });
        assert_eq!(json["filename"], "/srv/write/c.txt");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn log_response_is_fixed() {
        let json = to_json(&LogResponse::ok());
        assert_eq!(json, serde_json::json!({"status": 0}));
    }
}
