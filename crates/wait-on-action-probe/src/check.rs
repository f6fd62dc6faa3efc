//! Single availability checks

use crate::options::ProbeOptions;
use crate::resource::{HttpMethod, Resource};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, redirect};
use std::path::Path;
use std::time::Duration;
use tokio::net::TcpStream;
use wait_on_action_core::{HttpAuth, RunConfiguration, WaitError};

/// Outcome of one check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// Resource answered; files report their current size
    Available { size: Option<u64> },
    /// Resource did not answer, with the reason
    Unavailable(String),
}

impl Observation {
    pub fn is_available(&self) -> bool {
        matches!(self, Observation::Available { .. })
    }
}

/// Performs checks with the HTTP and TCP settings of one run
#[derive(Debug, Clone)]
pub struct Prober {
    client: Client,
    http_timeout: Option<Duration>,
    tcp_timeout: Duration,
    auth: Option<HttpAuth>,
}

impl Prober {
    /// Build a prober for `config`
    ///
    /// # Errors
    ///
    /// Returns `WaitError::InvalidOption` for header names or values that are
    /// not valid HTTP, and `WaitError::Failed` if the HTTP client cannot be
    /// constructed.
    pub fn new(config: &RunConfiguration, options: &ProbeOptions) -> Result<Self, WaitError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| WaitError::InvalidOption {
                name: "headers".to_string(),
                reason: format!("{name}: {e}"),
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| WaitError::InvalidOption {
                name: "headers".to_string(),
                reason: format!("{name}: {e}"),
            })?;
            headers.insert(name, value);
        }

        let redirects = if config.follow_redirect.unwrap_or(true) {
            redirect::Policy::default()
        } else {
            redirect::Policy::none()
        };

        let client = Client::builder()
            .default_headers(headers)
            .redirect(redirects)
            .danger_accept_invalid_certs(!config.strict_ssl.unwrap_or(true))
            .build()
            .map_err(|e| WaitError::Failed(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            http_timeout: options.http_timeout,
            tcp_timeout: options.tcp_timeout,
            auth: config.auth.clone(),
        })
    }

    /// Check `resource` once
    pub async fn check(&self, resource: &Resource) -> Observation {
        match resource {
            Resource::File(path) => check_file(path).await,
            Resource::Http { url, method } => self.check_http(url.clone(), *method).await,
            Resource::Tcp { host, port } => self.check_tcp(host, *port).await,
            Resource::Socket(path) => check_socket(path).await,
        }
    }

    async fn check_http(&self, url: url::Url, method: HttpMethod) -> Observation {
        let method = match method {
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Get => Method::GET,
        };

        let mut request = self.client.request(method, url);
        if let Some(timeout) = self.http_timeout {
            request = request.timeout(timeout);
        }
        if let Some(auth) = &self.auth {
            request = request.basic_auth(&auth.username, Some(&auth.password));
        }

        match request.send().await {
            Ok(response) if response.status().is_success() => Observation::Available { size: None },
            Ok(response) => Observation::Unavailable(format!("status {}", response.status())),
            Err(e) => Observation::Unavailable(e.to_string()),
        }
    }

    async fn check_tcp(&self, host: &str, port: u16) -> Observation {
        match tokio::time::timeout(self.tcp_timeout, TcpStream::connect((host, port))).await {
            Ok(Ok(_stream)) => Observation::Available { size: None },
            Ok(Err(e)) => Observation::Unavailable(e.to_string()),
            Err(_) => Observation::Unavailable("connect timed out".to_string()),
        }
    }
}

async fn check_file(path: &Path) -> Observation {
    match tokio::fs::metadata(path).await {
        Ok(meta) => Observation::Available {
            size: Some(meta.len()),
        },
        Err(e) => Observation::Unavailable(e.to_string()),
    }
}

#[cfg(unix)]
async fn check_socket(path: &Path) -> Observation {
    match tokio::net::UnixStream::connect(path).await {
        Ok(_stream) => Observation::Available { size: None },
        Err(e) => Observation::Unavailable(e.to_string()),
    }
}

#[cfg(not(unix))]
async fn check_socket(_path: &Path) -> Observation {
    Observation::Unavailable("unix sockets are not supported on this platform".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn prober(config: &RunConfiguration) -> Prober {
        let options = ProbeOptions::try_from(config).unwrap();
        Prober::new(config, &options).unwrap()
    }

    fn default_prober() -> Prober {
        prober(&RunConfiguration::new(vec![]))
    }

    async fn serve(status_line: &'static str) -> std::net::SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {status_line}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n"
                );
                let _ = stream.write_all(response.as_bytes()).await;
            }
        });
        addr
    }

    #[tokio::test]
    async fn test_file_check_reports_size() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("ready");

        assert!(!check_file(&path).await.is_available());

        std::fs::write(&path, b"hello").unwrap();
        assert_eq!(
            check_file(&path).await,
            Observation::Available { size: Some(5) }
        );
    }

    #[tokio::test]
    async fn test_tcp_check() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let resource = Resource::Tcp {
            host: "127.0.0.1".to_string(),
            port,
        };

        assert!(default_prober().check(&resource).await.is_available());

        drop(listener);
        assert!(!default_prober().check(&resource).await.is_available());
    }

    #[tokio::test]
    async fn test_http_check_success_and_failure_status() {
        let ok = serve("200 OK").await;
        let resource = Resource::parse(&format!("http://{ok}/health")).unwrap();
        assert!(default_prober().check(&resource).await.is_available());

        let down = serve("503 Service Unavailable").await;
        let resource = Resource::parse(&format!("http-get://{down}/health")).unwrap();
        assert_eq!(
            default_prober().check(&resource).await,
            Observation::Unavailable("status 503 Service Unavailable".to_string())
        );
    }

    #[tokio::test]
    async fn test_redirect_not_followed_when_disabled() {
        let addr = serve("302 Found").await;
        let mut config = RunConfiguration::new(vec![]);
        config.follow_redirect = Some(false);

        let resource = Resource::parse(&format!("http://{addr}/")).unwrap();
        assert!(!prober(&config).check(&resource).await.is_available());
    }

    #[test]
    fn test_invalid_header_rejected() {
        let mut config = RunConfiguration::new(vec![]);
        config
            .headers
            .insert("bad header".to_string(), "x".to_string());
        let options = ProbeOptions::try_from(&config).unwrap();
        assert!(matches!(
            Prober::new(&config, &options),
            Err(WaitError::InvalidOption { .. })
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_socket_check() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("app.sock");

        assert!(!check_socket(&path).await.is_available());

        let _listener = tokio::net::UnixListener::bind(&path).unwrap();
        assert!(check_socket(&path).await.is_available());
    }
}
