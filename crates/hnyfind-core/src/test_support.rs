//! Shared fixtures for unit tests.

use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use crate::models::{Dataset, Team};

/// Canned response for one request path
pub(crate) struct Route {
    pub path: &'static str,
    pub status: u16,
    pub body: &'static str,
}

impl Route {
    pub fn new(path: &'static str, status: u16, body: &'static str) -> Self {
        Self { path, status, body }
    }
}

/// Request heads received by a `serve` responder
pub(crate) type Seen = Arc<Mutex<Vec<String>>>;

/// Minimal HTTP/1.1 responder on a random local port. Returns the base URL
/// and the request heads it has seen. Unknown paths get a 404.
pub(crate) async fn serve(routes: Vec<Route>) -> (String, Seen) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let seen_by_server = Arc::clone(&seen);

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };

            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut chunk).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => buf.extend_from_slice(&chunk[..n]),
                }
            }
            let head = String::from_utf8_lossy(&buf).to_string();
            let path = head.split_whitespace().nth(1).unwrap_or("").to_string();
            seen_by_server.lock().unwrap().push(head);

            let (status, body) = routes
                .iter()
                .find(|r| r.path == path)
                .map(|r| (r.status, r.body))
                .unwrap_or((404, "{\"error\":\"not found\"}"));
            let response = format!(
                "HTTP/1.1 {status} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    (format!("http://{addr}"), seen)
}

pub(crate) fn team(slug: &str) -> Arc<Team> {
    Arc::new(Team {
        slug: slug.to_string(),
        ui_host: "https://ui.honeycomb.io".to_string(),
    })
}

/// Datasets of team `acme`, slugs `ds-0`, `ds-1`, ...
pub(crate) fn datasets(names: &[&str]) -> Vec<Dataset> {
    let team = team("acme");
    names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let slug = format!("ds-{i}");
            Dataset::new(*name, slug, Arc::clone(&team))
        })
        .collect()
}
