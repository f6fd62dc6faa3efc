//! Resource identifier parsing
//!
//! Accepted forms:
//! - `file:<path>` or a bare path
//! - `http://...`, `https://...` (HEAD request)
//! - `http-get://...`, `https-get://...` (GET request)
//! - `tcp:<host>:<port>` or `tcp:<port>` (host defaults to `localhost`)
//! - `socket:<path>` (unix domain socket)

use std::fmt;
use std::path::PathBuf;
use url::Url;
use wait_on_action_core::WaitError;

/// HTTP method used to probe an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Head,
    Get,
}

/// A parsed resource identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    File(PathBuf),
    Http { url: Url, method: HttpMethod },
    Tcp { host: String, port: u16 },
    Socket(PathBuf),
}

impl Resource {
    /// Parse a resource identifier
    ///
    /// # Errors
    ///
    /// Returns `WaitError::InvalidResource` for empty identifiers, malformed
    /// URLs, and TCP targets without a valid port.
    pub fn parse(raw: &str) -> Result<Self, WaitError> {
        let raw = raw.trim();
        let invalid = || WaitError::InvalidResource(raw.to_string());

        if raw.is_empty() {
            return Err(invalid());
        }

        if let Some(rest) = raw.strip_prefix("http-get://") {
            return parse_url(&format!("http://{rest}"), HttpMethod::Get).ok_or_else(invalid);
        }
        if let Some(rest) = raw.strip_prefix("https-get://") {
            return parse_url(&format!("https://{rest}"), HttpMethod::Get).ok_or_else(invalid);
        }
        if raw.starts_with("http://") || raw.starts_with("https://") {
            return parse_url(raw, HttpMethod::Head).ok_or_else(invalid);
        }
        if let Some(rest) = raw.strip_prefix("tcp:") {
            return parse_tcp(rest).ok_or_else(invalid);
        }
        if let Some(rest) = raw.strip_prefix("socket:") {
            if rest.is_empty() {
                return Err(invalid());
            }
            return Ok(Resource::Socket(PathBuf::from(rest)));
        }

        let path = raw.strip_prefix("file:").unwrap_or(raw);
        if path.is_empty() {
            return Err(invalid());
        }
        Ok(Resource::File(PathBuf::from(path)))
    }

    /// Whether availability is judged on a stable file size
    pub fn is_file(&self) -> bool {
        matches!(self, Resource::File(_))
    }
}

fn parse_url(raw: &str, method: HttpMethod) -> Option<Resource> {
    let url = Url::parse(raw).ok()?;
    url.host_str()?;
    Some(Resource::Http { url, method })
}

fn parse_tcp(rest: &str) -> Option<Resource> {
    let (host, port) = match rest.rsplit_once(':') {
        Some((host, port)) => (host.trim_start_matches('[').trim_end_matches(']'), port),
        None => ("localhost", rest),
    };
    if host.is_empty() {
        return None;
    }
    let port = port.parse::<u16>().ok().filter(|p| *p != 0)?;
    Some(Resource::Tcp {
        host: host.to_string(),
        port,
    })
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::File(path) => write!(f, "file:{}", path.display()),
            Resource::Http { url, method } => match method {
                HttpMethod::Head => write!(f, "{url}"),
                HttpMethod::Get => write!(f, "GET {url}"),
            },
            Resource::Tcp { host, port } => write!(f, "tcp:{host}:{port}"),
            Resource::Socket(path) => write!(f, "socket:{}", path.display()),
        }
    }
}
