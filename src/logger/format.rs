//! Access log format module
//!
//! Supported formats:
//! - `combined` (Apache/Nginx combined format)
//! - `common` (Common Log Format)
//! - `json` (structured logging)
//! - custom patterns with `$variable` substitution

use chrono::Local;

/// One access log entry, filled in by the router once per request
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    /// Client IP address
    pub remote_addr: String,
    /// Request timestamp
    pub time: chrono::DateTime<Local>,
    /// HTTP method (GET, POST, ...)
    pub method: String,
    /// Request URI path
    pub path: String,
    /// Query string (without leading ?)
    pub query: Option<String>,
    /// HTTP version (1.0, 1.1, 2)
    pub http_version: String,
    /// Response status code
    pub status: u16,
    /// Response body size in bytes
    pub body_bytes: usize,
    /// Referer header
    pub referer: Option<String>,
    /// User-Agent header
    pub user_agent: Option<String>,
    /// Request processing time in microseconds
    pub request_time_us: u64,
}

impl AccessLogEntry {
    /// Create a new entry stamped with the current time
    pub fn new(remote_addr: String, method: String, path: String) -> Self {
        Self {
            remote_addr,
            time: Local::now(),
            method,
            path,
            query: None,
            http_version: "1.1".to_string(),
            status: 200,
            body_bytes: 0,
            referer: None,
            user_agent: None,
            request_time_us: 0,
        }
    }

    /// Format the entry according to the configured format name
    pub fn format(&self, format: &str) -> String {
        match format {
            "combined" => self.format_clf(true),
            "common" => self.format_clf(false),
            "json" => self.format_json(),
            pattern => self.format_pattern(pattern),
        }
    }

    /// Request URI including the query string
    fn request_uri(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{}", self.path, q),
            None => self.path.clone(),
        }
    }

    /// Common Log Format; `extended` adds the referer and user-agent
    /// fields of the combined format
    fn format_clf(&self, extended: bool) -> String {
        let mut line = format!(
            "{} - - [{}] \"{} {} HTTP/{}\" {} {}",
            self.remote_addr,
            self.time.format("%d/%b/%Y:%H:%M:%S %z"),
            self.method,
            self.request_uri(),
            self.http_version,
            self.status,
            self.body_bytes,
        );
        if extended {
            line.push_str(&format!(
                " \"{}\" \"{}\"",
                self.referer.as_deref().unwrap_or("-"),
                self.user_agent.as_deref().unwrap_or("-"),
            ));
        }
        line
    }

    /// JSON structured log line
    fn format_json(&self) -> String {
        serde_json::json!({
            "remote_addr": self.remote_addr,
            "time": self.time.to_rfc3339(),
            "method": self.method,
            "path": self.path,
            "query": self.query,
            "http_version": self.http_version,
            "status": self.status,
            "body_bytes": self.body_bytes,
            "referer": self.referer,
            "user_agent": self.user_agent,
            "request_time_us": self.request_time_us,
        })
        .to_string()
    }

    /// Custom format with variable substitution
    ///
    /// Supported variables: `$remote_addr`, `$time_local`, `$time_iso8601`,
    /// `$request`, `$request_method`, `$request_uri`, `$request_time`,
    /// `$status`, `$body_bytes_sent`, `$http_referer`, `$http_user_agent`
    fn format_pattern(&self, pattern: &str) -> String {
        let request_uri = self.request_uri();
        let request_line = format!("{} {} HTTP/{}", self.method, request_uri, self.http_version);

        // Longer variables are replaced first so that e.g. $request_time
        // is not clobbered by the $request substitution
        #[allow(clippy::cast_precision_loss)]
        let request_time = self.request_time_us as f64 / 1_000_000.0;

        pattern
            .replace("$remote_addr", &self.remote_addr)
            .replace(
                "$time_local",
                &self.time.format("%d/%b/%Y:%H:%M:%S %z").to_string(),
            )
            .replace("$time_iso8601", &self.time.to_rfc3339())
            .replace("$request_time", &format!("{request_time:.3}"))
            .replace("$request_method", &self.method)
            .replace("$request_uri", &request_uri)
            .replace("$request", &request_line)
            .replace("$status", &self.status.to_string())
            .replace("$body_bytes_sent", &self.body_bytes.to_string())
            .replace("$http_referer", self.referer.as_deref().unwrap_or("-"))
            .replace(
                "$http_user_agent",
                self.user_agent.as_deref().unwrap_or("-"),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry() -> AccessLogEntry {
        let mut entry = AccessLogEntry::new(
            "127.0.0.1".to_string(),
            "GET".to_string(),
            "/read".to_string(),
        );
        entry.query = Some("file=notes.txt".to_string());
        entry.status = 200;
        entry.body_bytes = 42;
        entry.user_agent = Some("curl/8.0".to_string());
        entry.request_time_us = 3000;
        entry
    }

    #[test]
    fn combined_includes_agent_fields() {
        let line = sample_entry().format("combined");
        assert!(line.contains("127.0.0.1"));
        assert!(line.contains("GET /read?file=notes.txt HTTP/1.1"));
        assert!(line.contains("200 42"));
        assert!(line.contains("curl/8.0"));
    }

    #[test]
    fn common_omits_agent_fields() {
        let line = sample_entry().format("common");
        assert!(line.contains("200 42"));
        assert!(!line.contains("curl/8.0"));
    }

    #[test]
    fn json_is_parseable_and_complete() {
        let line = sample_entry().format("json");
        let value: serde_json::Value = serde_json::from_str(&line).expect("valid json");
        assert_eq!(value["remote_addr"], "127.0.0.1");
        assert_eq!(value["status"], 200);
        assert_eq!(value["body_bytes"], 42);
        assert_eq!(value["referer"], serde_json::Value::Null);
    }

    #[test]
    fn pattern_substitutes_variables() {
        let line = sample_entry().format("$remote_addr \"$request\" $status $request_time");
        assert!(line.contains("127.0.0.1"));
        assert!(line.contains("\"GET /read?file=notes.txt HTTP/1.1\""));
        assert!(line.contains("0.003"), "3000us formats as 0.003s: {line}");
    }
}
