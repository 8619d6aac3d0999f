//! HTTP transport tests on an ephemeral port.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use oci_mcp_registry::{ClientOptions, RegistryClient};
use oci_mcp_server::transport::http;
use oci_mcp_server::McpServer;

struct TestServer {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<anyhow::Result<()>>,
}

impl TestServer {
    fn start() -> Self {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = Arc::new(McpServer::new(
            RegistryClient::new(&ClientOptions::default()).unwrap(),
        ));

        let (shutdown, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(http::serve(server, listener, async {
            rx.await.ok();
        }));

        Self {
            addr,
            shutdown,
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn stop(self) {
        self.shutdown.send(()).unwrap();
        self.handle.await.unwrap().unwrap();
    }
}

#[tokio::test]
async fn test_healthz() {
    let server = TestServer::start();

    let response = reqwest::get(server.url("/healthz")).await.unwrap();
    assert_eq!(response.status(), 200);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    assert_eq!(response.text().await.unwrap(), "OK");

    server.stop().await;
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let server = TestServer::start();

    let response = reqwest::get(server.url("/metrics")).await.unwrap();
    assert_eq!(response.status(), 404);

    server.stop().await;
}

#[tokio::test]
async fn test_mcp_tool_call() {
    let server = TestServer::start();

    let response = reqwest::Client::new()
        .post(server.url("/mcp"))
        .header("content-type", "application/json")
        .body(r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"ping","arguments":{}}}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["id"], 1);
    assert_eq!(body["result"]["content"][0]["text"], "pong");
    assert_eq!(body["result"]["isError"], false);

    server.stop().await;
}

#[tokio::test]
async fn test_mcp_notification_is_accepted() {
    let server = TestServer::start();

    let response = reqwest::Client::new()
        .post(server.url("/mcp"))
        .body(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 202);
    assert!(response.text().await.unwrap().is_empty());

    server.stop().await;
}

#[tokio::test]
async fn test_mcp_parse_error() {
    let server = TestServer::start();

    let body: serde_json::Value = reqwest::Client::new()
        .post(server.url("/mcp"))
        .body("not json")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["error"]["code"], -32700);

    server.stop().await;
}

#[tokio::test]
async fn test_mcp_oversized_body_is_rejected() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let server = TestServer::start();

    // Declared length alone is enough; no body bytes are sent
    let mut stream = tokio::net::TcpStream::connect(server.addr).await.unwrap();
    let head = format!(
        "POST /mcp HTTP/1.1\r\nHost: {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n",
        server.addr,
        http::MAX_BODY_BYTES + 1
    );
    stream.write_all(head.as_bytes()).await.unwrap();

    let mut response = vec![0u8; 1024];
    let n = stream.read(&mut response).await.unwrap();
    let status_line = String::from_utf8_lossy(&response[..n]);
    assert!(status_line.starts_with("HTTP/1.1 413"), "{}", status_line);

    drop(stream);
    server.stop().await;
}
