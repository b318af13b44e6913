#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Minimal HTTP endpoint that records request bodies and answers `status`.
pub struct MockWebhook {
    pub url: String,
    pub bodies: Arc<Mutex<Vec<String>>>,
}

impl MockWebhook {
    pub async fn spawn(status: u16) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let bodies = Arc::new(Mutex::new(Vec::new()));

        let sink = bodies.clone();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let sink = sink.clone();
                tokio::spawn(async move {
                    let body = read_body(&mut socket).await;
                    sink.lock().push(body);

                    let reason = if status < 300 { "OK" } else { "Error" };
                    let reply = format!(
                        "HTTP/1.1 {status} {reason}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n"
                    );
                    let _ = socket.write_all(reply.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        Self {
            url: format!("http://{addr}/webhook"),
            bodies,
        }
    }

    /// `content` field of every JSON body received so far.
    pub fn contents(&self) -> Vec<String> {
        self.bodies
            .lock()
            .iter()
            .filter_map(|b| serde_json::from_str::<serde_json::Value>(b).ok())
            .filter_map(|v| v["content"].as_str().map(str::to_string))
            .collect()
    }
}

async fn read_body(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            return String::new();
        }
        buf.extend_from_slice(&chunk[..n]);

        let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
        let len = head
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);

        let start = end + 4;
        if buf.len() >= start + len {
            return String::from_utf8_lossy(&buf[start..start + len]).to_string();
        }
    }
}
