#![allow(dead_code)]

use clap::Parser;
use ollama_relay::{AppState, Args, app};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

pub fn state_for(upstream_url: &str) -> Arc<AppState> {
    let args = Args::parse_from([
        "ollama-relay",
        "--ollama-url",
        upstream_url,
        "--model",
        "llama3.2",
        "--telemetry-model",
        "llama3.2",
        "--generate-timeout",
        "5",
        "--pull-timeout",
        "5",
        "--tags-timeout",
        "5",
    ]);
    AppState::from_args(&args)
}

/// Serve the relay on an ephemeral port, returning its base URL.
pub async fn spawn_relay(upstream_url: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = app(state_for(upstream_url));
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A URL nothing listens on.
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

pub const NDJSON_BODY: &str = concat!(
    "{\"model\":\"llama3.2\",\"response\":\"Hello\",\"done\":false}\n",
    "{\"model\":\"llama3.2\",\"response\":\",\",\"done\":false}\n",
    "this line is not json\n",
    "{\"model\":\"llama3.2\",\"response\":\" world\",\"done\":false}\n",
    "{\"model\":\"llama3.2\",\"done\":true,\"eval_count\":3}\n",
);

/// One-shot upstream that answers the first request with `head_and_body`
/// and then keeps the socket open without sending anything else.
///
/// The receiver fires once the client closes the connection.
pub async fn stalling_upstream(head_and_body: &'static [u8]) -> (String, oneshot::Receiver<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (closed_tx, closed_rx) = oneshot::channel();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        read_request(&mut socket).await;
        socket.write_all(head_and_body).await.unwrap();
        socket.flush().await.unwrap();
        let mut buf = [0u8; 1024];
        loop {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
        }
        let _ = closed_tx.send(());
    });
    (format!("http://{}", addr), closed_rx)
}

// Consume request head and a Content-Length body
async fn read_request(socket: &mut TcpStream) {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    let head_end = loop {
        let n = socket.read(&mut buf).await.unwrap();
        assert!(n > 0, "client closed before sending a request");
        data.extend_from_slice(&buf[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };
    let head = String::from_utf8_lossy(&data[..head_end]).to_ascii_lowercase();
    let body_len = head
        .lines()
        .find_map(|l| l.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);
    while data.len() < head_end + body_len {
        let n = socket.read(&mut buf).await.unwrap();
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);
    }
}
