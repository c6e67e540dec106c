//! Loopback HTTP server serving canned Google Maps responses.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::runtime::Runtime;
use url::Url;

/// Bytes served for every Street View image request.
pub(crate) const IMAGE_BYTES: &[u8] = b"\xff\xd8\xff\xe0canned-jpeg";

/// Polyline served for every Directions request.
pub(crate) const POLYLINE: &str = "_p~iF~ps|U_ulLnnqC_mqNvxq`@";

/// A request as the server received it.
#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub method: String,
    pub url: Url,
    /// Header lines with lower-cased names.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub(crate) fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub(crate) fn query(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }
}

/// Server answering Places, Roads, Street View and Directions paths.
///
/// Runs on its own runtime so the gateway under test can block freely.
pub(crate) struct TestServer {
    base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    _runtime: Runtime,
}

impl TestServer {
    pub(crate) fn start() -> Self {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .expect("server runtime should build");
        let listener = runtime
            .block_on(TcpListener::bind("127.0.0.1:0"))
            .expect("loopback listener should bind");
        let address = listener.local_addr().expect("listener has an address");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);
        runtime.spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let recorded = Arc::clone(&recorded);
                tokio::spawn(async move { serve(stream, &recorded).await });
            }
        });
        Self {
            base_url: format!("http://{address}"),
            requests,
            _runtime: runtime,
        }
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Requests received so far whose path ends with `suffix`.
    pub(crate) fn requests_to(&self, suffix: &str) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|request| request.url.path().ends_with(suffix))
            .cloned()
            .collect()
    }
}

async fn serve(mut stream: TcpStream, recorded: &Mutex<Vec<RecordedRequest>>) {
    let Some(request) = read_request(&mut stream).await else {
        return;
    };
    let (content_type, body) = respond_to(request.url.path());
    recorded
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(request);
    let head = format!(
        "HTTP/1.1 200 OK\r\ncontent-type: {content_type}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
        body.len()
    );
    let _ = stream.write_all(head.as_bytes()).await;
    let _ = stream.write_all(&body).await;
    let _ = stream.shutdown().await;
}

async fn read_request(stream: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buffer = Vec::new();
    let mut chunk = [0_u8; 4096];
    let header_end = loop {
        if let Some(end) = buffer.windows(4).position(|window| window == b"\r\n\r\n") {
            break end;
        }
        let read = stream.read(&mut chunk).await.ok()?;
        if read == 0 {
            return None;
        }
        buffer.extend_from_slice(&chunk[..read]);
    };
    let head = String::from_utf8_lossy(&buffer[..header_end]).into_owned();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_owned();
    let target = request_line.next()?;
    let url = Url::parse(&format!("http://loopback{target}")).ok()?;
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_ascii_lowercase(), value.trim().to_owned()))
        .collect();
    let length = headers
        .iter()
        .find(|(name, _)| name == "content-length")
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = buffer.split_off(header_end + 4);
    while body.len() < length {
        let read = stream.read(&mut chunk).await.ok()?;
        if read == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..read]);
    }
    Some(RecordedRequest {
        method,
        url,
        headers,
        body,
    })
}

fn respond_to(path: &str) -> (&'static str, Vec<u8>) {
    let json = |value: serde_json::Value| ("application/json", value.to_string().into_bytes());
    if path.ends_with("places:searchNearby") {
        json(serde_json::json!({
            "places": [{
                "id": "tower",
                "displayName": { "text": "Clock Tower" },
                "location": { "latitude": 35.6852, "longitude": 139.7528 },
                "primaryType": "tourist_attraction",
                "types": ["tourist_attraction", "point_of_interest"],
                "rating": 4.4
            }]
        }))
    } else if path.ends_with("nearestRoads") {
        json(serde_json::json!({
            "snappedPoints": [{ "location": { "latitude": 35.6813, "longitude": 139.7672 } }]
        }))
    } else if path.ends_with("streetview/metadata") {
        json(serde_json::json!({
            "status": "OK",
            "location": { "lat": 35.6814, "lng": 139.7673 }
        }))
    } else if path.ends_with("streetview") {
        ("image/jpeg", IMAGE_BYTES.to_vec())
    } else if path.ends_with("directions/json") {
        json(serde_json::json!({
            "status": "OK",
            "routes": [{ "overview_polyline": { "points": POLYLINE }, "legs": [{}] }]
        }))
    } else {
        json(serde_json::json!({ "error": "unknown path" }))
    }
}
