use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::blocking::{Client, Response};
use reqwest::Url;
use serde_json::Value;
use tracing::debug;

use crate::domain::actions::ControlAction;
use crate::domain::catalog::thumbnail_file_name;
use crate::domain::models::{CatalogResponse, PlayerStatus, PreviewStatus};

/// HTTP surface of the media-player server.
pub trait RemoteApi: Send + Sync {
    fn status(&self) -> Result<PlayerStatus>;
    fn control(&self, action: ControlAction) -> Result<Value>;
    fn play_by_name(&self, name: &str) -> Result<Value>;
    fn catalog(&self) -> Result<CatalogResponse>;
    fn refresh_catalog(&self) -> Result<Value>;
    fn thumbnail(&self, name: &str) -> Result<Vec<u8>>;
    fn preview_status(&self) -> Result<PreviewStatus>;
    fn set_preview(&self, enabled: bool) -> Result<PreviewStatus>;
    fn health(&self) -> Result<()>;

    /// Turns a server-relative stream path into something a local player can open.
    fn stream_url(&self, index_url: &str) -> Result<String> {
        Ok(index_url.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEndpoints {
    pub catalog_path: String,
    pub refresh_path: String,
    pub play_path: String,
    pub play_key: String,
    pub thumbnail_prefix: String,
}

impl Default for RemoteEndpoints {
    fn default() -> Self {
        Self {
            catalog_path: "/control/videos".to_string(),
            refresh_path: "/control/refresh".to_string(),
            play_path: "/control/play-video".to_string(),
            play_key: "name".to_string(),
            thumbnail_prefix: "/thumbnails/".to_string(),
        }
    }
}

pub struct HttpRemote {
    client: Client,
    base_url: Url,
    endpoints: RemoteEndpoints,
    timeout: Duration,
}

impl HttpRemote {
    pub fn new(base_url: &str, timeout: Duration, endpoints: RemoteEndpoints) -> Result<Self> {
        let mut base_url = Url::parse(base_url)
            .with_context(|| format!("invalid server base URL '{base_url}'"))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("server base URL '{base_url}' cannot carry paths"));
        }
        // Endpoint paths resolve under the base path, so it must end in a slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url,
            endpoints,
            timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .with_context(|| format!("failed to resolve '{path}' against {}", self.base_url))
    }

    fn thumbnail_url(&self, name: &str) -> Result<Url> {
        let mut url = self.url(&self.endpoints.thumbnail_prefix)?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("thumbnail URL cannot carry path segments"))?
            .pop_if_empty()
            .push(&thumbnail_file_name(name));
        Ok(url)
    }

    fn send(&self, request: reqwest::blocking::RequestBuilder, what: &str) -> Result<Response> {
        let response = request.send().with_context(|| {
            format!(
                "{what} failed (timeout={}ms); verify the player server is reachable at {}",
                self.timeout.as_millis(),
                self.base_url
            )
        })?;
        let status = response.status();
        response
            .error_for_status()
            .with_context(|| format!("{what} returned HTTP {status}"))
    }

    fn get_json(&self, path: &str) -> Result<Value> {
        let url = self.url(path)?;
        let what = format!("GET {path}");
        let response = self.send(self.client.get(url), &what)?;
        read_json_lenient(response, &what)
    }

    fn post_json(&self, path: &str, body: &Value) -> Result<Value> {
        let url = self.url(path)?;
        let what = format!("POST {path}");
        let response = self.send(self.client.post(url).json(body), &what)?;
        read_json_lenient(response, &what)
    }
}

/// Reads the body as JSON; an unreadable or malformed body becomes `Null`.
fn read_json_lenient(response: Response, what: &str) -> Result<Value> {
    let text = response
        .text()
        .with_context(|| format!("{what}: failed reading response body"))?;
    Ok(parse_json_lenient(&text, what))
}

pub fn parse_json_lenient(text: &str, what: &str) -> Value {
    match serde_json::from_str(text) {
        Ok(value) => value,
        Err(err) => {
            debug!(error = %err, request = what, "response body is not JSON");
            Value::Null
        }
    }
}

impl RemoteApi for HttpRemote {
    fn status(&self) -> Result<PlayerStatus> {
        let body = self.get_json("/status")?;
        Ok(PlayerStatus::from_json(&body))
    }

    fn control(&self, action: ControlAction) -> Result<Value> {
        self.post_json(
            &format!("/control/{}", action.endpoint()),
            &Value::Object(Default::default()),
        )
    }

    fn play_by_name(&self, name: &str) -> Result<Value> {
        let mut body = serde_json::Map::new();
        body.insert(
            self.endpoints.play_key.clone(),
            Value::String(name.to_string()),
        );
        self.post_json(&self.endpoints.play_path, &Value::Object(body))
    }

    fn catalog(&self) -> Result<CatalogResponse> {
        let body = self.get_json(&self.endpoints.catalog_path)?;
        Ok(CatalogResponse::from_json(&body))
    }

    fn refresh_catalog(&self) -> Result<Value> {
        self.post_json(
            &self.endpoints.refresh_path,
            &Value::Object(Default::default()),
        )
    }

    fn thumbnail(&self, name: &str) -> Result<Vec<u8>> {
        let url = self.thumbnail_url(name)?;
        let what = format!("GET thumbnail for '{name}'");
        let response = self.send(self.client.get(url), &what)?;
        let bytes = response
            .bytes()
            .with_context(|| format!("{what}: failed reading image bytes"))?;
        Ok(bytes.to_vec())
    }

    fn preview_status(&self) -> Result<PreviewStatus> {
        let body = self.get_json("/api/preview/status")?;
        Ok(PreviewStatus::from_json(&body))
    }

    fn set_preview(&self, enabled: bool) -> Result<PreviewStatus> {
        let path = if enabled {
            "/api/preview/enable"
        } else {
            "/api/preview/disable"
        };
        let body = self.post_json(path, &Value::Object(Default::default()))?;
        Ok(PreviewStatus::from_json(&body))
    }

    fn health(&self) -> Result<()> {
        self.get_json("/health").map(|_| ())
    }

    fn stream_url(&self, index_url: &str) -> Result<String> {
        Ok(self.url(index_url)?.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::JoinHandle;

    use super::*;
    use crate::domain::models::PlayerState;

    fn json_response(body: &str) -> String {
        format!(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\n\r\n{}",
            body.len(),
            body
        )
    }

    fn read_request(stream: &mut std::net::TcpStream) -> String {
        let mut data = Vec::new();
        let mut buf = [0_u8; 4096];
        loop {
            let n = stream.read(&mut buf).expect("read request");
            if n == 0 {
                break;
            }
            data.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&data).to_string();
            if let Some(head_end) = text.find("\r\n\r\n") {
                let content_length = text[..head_end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(key, _)| key.trim().eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if data.len() >= head_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&data).to_string()
    }

    fn serve_once(response: String) -> Option<(String, JoinHandle<String>)> {
        let listener = match TcpListener::bind("127.0.0.1:0") {
            Ok(listener) => listener,
            Err(err) if err.kind() == std::io::ErrorKind::PermissionDenied => return None,
            Err(err) => panic!("bind listener: {err}"),
        };
        let addr = listener.local_addr().expect("local addr");

        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept request");
            let request = read_request(&mut stream);
            stream
                .write_all(response.as_bytes())
                .expect("write response");
            request
        });

        Some((format!("http://{addr}"), handle))
    }

    fn remote(base: &str) -> HttpRemote {
        HttpRemote::new(base, Duration::from_secs(2), RemoteEndpoints::default())
            .expect("create remote")
    }

    #[test]
    fn status_is_parsed_from_json() {
        let Some((base, handle)) = serve_once(json_response(
            r#"{"state":"playing","current_name":"clip.mp4","volume":50,"muted":false}"#,
        )) else {
            return;
        };

        let status = remote(&base).status().expect("read status");
        let request = handle.join().expect("join server");
        assert!(request.starts_with("GET /status "));
        assert_eq!(status.state, PlayerState::Playing);
        assert_eq!(status.current_name.as_deref(), Some("clip.mp4"));
        assert_eq!(status.volume, 50);
    }

    #[test]
    fn play_by_name_posts_configured_key() {
        let Some((base, handle)) = serve_once(json_response(r#"{"ok":true}"#)) else {
            return;
        };

        let reply = remote(&base).play_by_name("b.mp4").expect("play by name");
        let request = handle.join().expect("join server");
        assert!(request.starts_with("POST /control/play-video "));
        assert!(request.contains(r#"{"name":"b.mp4"}"#));
        assert_eq!(reply["ok"], Value::Bool(true));
    }

    #[test]
    fn non_success_status_is_an_error() {
        let Some((base, handle)) =
            serve_once("HTTP/1.1 503 Service Unavailable\r\ncontent-length: 0\r\n\r\n".to_string())
        else {
            return;
        };

        let err = remote(&base)
            .control(ControlAction::Next)
            .expect_err("503 should fail");
        let request = handle.join().expect("join server");
        assert!(request.starts_with("POST /control/next "));
        assert!(format!("{err:#}").contains("HTTP 503"));
    }

    #[test]
    fn malformed_body_reads_as_empty_catalog() {
        let Some((base, handle)) = serve_once(json_response("{not json")) else {
            return;
        };

        let catalog = remote(&base).catalog().expect("malformed body is not an error");
        handle.join().expect("join server");
        assert!(!catalog.ok);
        assert!(catalog.items.is_empty());
    }

    #[test]
    fn thumbnail_name_is_one_encoded_segment() {
        let remote = remote("http://127.0.0.1:5000");
        let url = remote.thumbnail_url("my clip #1.mp4").expect("thumbnail url");
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:5000/thumbnails/my%20clip%20%231.mp4.jpg"
        );
    }

    #[test]
    fn stream_url_resolves_server_relative_path() {
        let remote = remote("http://10.0.0.2:5000");
        assert_eq!(
            remote.stream_url("/hls/index.m3u8").expect("resolve"),
            "http://10.0.0.2:5000/hls/index.m3u8"
        );
    }

    #[test]
    fn base_path_prefix_is_kept() {
        let Some((base, handle)) = serve_once(json_response(r#"{"state":"idle"}"#)) else {
            return;
        };

        let remote = remote(&format!("{base}/player"));
        remote.status().expect("read status");
        let request = handle.join().expect("join server");
        assert!(request.starts_with("GET /player/status "));
        assert_eq!(
            remote.stream_url("/hls/index.m3u8").expect("resolve"),
            format!("{base}/player/hls/index.m3u8")
        );
        assert_eq!(
            remote
                .thumbnail_url("a.mp4")
                .expect("thumbnail url")
                .as_str(),
            format!("{base}/player/thumbnails/a.mp4.jpg")
        );
    }

    #[test]
    fn unreachable_server_reports_base_url() {
        let remote = HttpRemote::new(
            "http://127.0.0.1:9",
            Duration::from_millis(300),
            RemoteEndpoints::default(),
        )
        .expect("create remote");
        let err = remote.status().expect_err("nothing listens on port 9");
        assert!(format!("{err:#}").contains("GET /status failed"));
    }
}
