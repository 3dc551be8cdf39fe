//! Remote image download

use std::sync::Arc;
use std::time::Duration;

use super::ImageError;
use crate::config::FetchConfig;

/// Blocking download of a complete response body
pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, ImageError>;
}

impl<T: Fetcher + ?Sized> Fetcher for Arc<T> {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, ImageError> {
        (**self).fetch(url)
    }
}

/// `reqwest` blocking client; one GET per call, no retries
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, ImageError> {
        let timeout = match config.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(timeout)
            .build()?;

        Ok(Self { client })
    }

    pub fn from_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, ImageError> {
        tracing::debug!("Fetching remote image {}", url);
        let response = self.client.get(url).send()?.error_for_status()?;
        let body = response.bytes()?;
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::fixtures;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    fn loopback_fetcher() -> HttpFetcher {
        let client = reqwest::blocking::Client::builder()
            .no_proxy()
            .build()
            .unwrap();
        HttpFetcher::from_client(client)
    }

    /// Serve exactly one HTTP response on a loopback port
    fn serve_once(status: &'static str, body: Vec<u8>) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let head = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status,
                body.len()
            );
            stream.write_all(head.as_bytes()).unwrap();
            stream.write_all(&body).unwrap();
            stream.flush().unwrap();

            let request = String::from_utf8_lossy(&request).to_string();
            request.lines().next().unwrap_or_default().to_string()
        });

        (format!("http://{}", addr), handle)
    }

    #[test]
    fn test_client_from_config() {
        let config = FetchConfig {
            timeout_secs: 0,
            ..FetchConfig::default()
        };
        assert!(HttpFetcher::new(&config).is_ok());
    }

    #[test]
    fn test_fetch_body() {
        let body = fixtures::gif_bytes(31, 17);
        let (base, handle) = serve_once("200 OK", body.clone());

        let fetcher = loopback_fetcher();
        let fetched = fetcher.fetch(&format!("{}/pixel.gif", base)).unwrap();

        assert_eq!(fetched, body);
        assert_eq!(handle.join().unwrap(), "GET /pixel.gif HTTP/1.1");
    }

    #[test]
    fn test_fetch_error_status() {
        let (base, handle) = serve_once("404 Not Found", b"missing".to_vec());

        let fetcher = loopback_fetcher();
        let result = fetcher.fetch(&format!("{}/gone.png", base));

        assert!(matches!(result, Err(ImageError::Fetch(_))));
        handle.join().unwrap();
    }
}
