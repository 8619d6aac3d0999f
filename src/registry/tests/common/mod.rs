//! In-process mock registry for integration tests.
//!
//! Serves plain HTTP on an ephemeral port; the client reaches it through
//! `insecure_registries`. Every request is recorded for assertions.

#![allow(dead_code)]

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Request, Response, Server, StatusCode};
use tokio::sync::oneshot;

use oci_mcp_registry::{ClientOptions, RegistryClient};

pub const OCI_INDEX: &str = "application/vnd.oci.image.index.v1+json";
pub const OCI_MANIFEST: &str = "application/vnd.oci.image.manifest.v1+json";

/// `base64("user:pass")`
pub const BASIC_USER_PASS: &str = "Basic dXNlcjpwYXNz";

/// A request as seen by the mock registry.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub host: String,
    pub authorization: Option<String>,
    pub accept: Option<String>,
}

impl Recorded {
    fn from_request(req: &Request<Body>) -> Self {
        let header = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Self {
            method: req.method().to_string(),
            path: req.uri().path().to_string(),
            query: req.uri().query().map(str::to_string),
            host: header("host").unwrap_or_default(),
            authorization: header("authorization"),
            accept: header("accept"),
        }
    }

    pub fn query_param(&self, key: &str) -> Option<String> {
        self.query.as_deref()?.split('&').find_map(|pair| {
            let (k, v) = pair.split_once('=')?;
            (k == key).then(|| v.replace("%3A", ":").replace("%2F", "/"))
        })
    }
}

pub struct MockRegistry {
    pub addr: SocketAddr,
    pub requests: Arc<Mutex<Vec<Recorded>>>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl MockRegistry {
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&Recorded) -> Response<Body> + Send + Sync + 'static,
    {
        let handler = Arc::new(handler);
        let requests: Arc<Mutex<Vec<Recorded>>> = Arc::new(Mutex::new(Vec::new()));
        let log = requests.clone();

        let make_svc = make_service_fn(move |_conn| {
            let handler = handler.clone();
            let log = log.clone();
            async move {
                Ok::<_, Infallible>(service_fn(move |req: Request<Body>| {
                    let recorded = Recorded::from_request(&req);
                    log.lock().unwrap().push(recorded.clone());
                    let response = (handler.as_ref())(&recorded);
                    async move { Ok::<_, Infallible>(response) }
                }))
            }
        });

        let server = Server::bind(&SocketAddr::from(([127, 0, 0, 1], 0))).serve(make_svc);
        let addr = server.local_addr();
        let (tx, rx) = oneshot::channel::<()>();
        tokio::spawn(server.with_graceful_shutdown(async {
            rx.await.ok();
        }));

        Self {
            addr,
            requests,
            shutdown: Some(tx),
        }
    }

    /// `127.0.0.1:<port>`, used as the registry name.
    pub fn host(&self) -> String {
        self.addr.to_string()
    }

    pub fn client(&self) -> RegistryClient {
        let options = ClientOptions {
            insecure_registries: vec![self.host()],
            ..Default::default()
        };
        RegistryClient::new(&options).unwrap()
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for MockRegistry {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

pub fn json_response(status: StatusCode, body: &str) -> Response<Body> {
    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn manifest_response(
    media_type: &str,
    body: &str,
    headers: &[(&str, &str)],
) -> Response<Body> {
    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header("content-type", media_type);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn challenge(value: &str) -> Response<Body> {
    Response::builder()
        .status(StatusCode::UNAUTHORIZED)
        .header("www-authenticate", value)
        .header("content-type", "application/json")
        .body(Body::from(
            r#"{"errors":[{"code":"UNAUTHORIZED","message":"authentication required"}]}"#,
        ))
        .unwrap()
}

pub fn not_found() -> Response<Body> {
    json_response(
        StatusCode::NOT_FOUND,
        r#"{"errors":[{"code":"MANIFEST_UNKNOWN","message":"manifest unknown"}]}"#,
    )
}

/// Multi-platform index without a `config` field.
pub fn alpine_index() -> String {
    serde_json::json!({
        "schemaVersion": 2,
        "mediaType": OCI_INDEX,
        "manifests": [
            {"mediaType": OCI_MANIFEST, "digest": "sha256:1111", "size": 100,
             "platform": {"architecture": "arm64", "os": "linux", "variant": "v8"}},
            {"mediaType": OCI_MANIFEST, "digest": "sha256:2222", "size": 100,
             "platform": {"architecture": "amd64", "os": "linux"}},
            {"mediaType": OCI_MANIFEST, "digest": "sha256:3333", "size": 100,
             "platform": {"architecture": "amd64", "os": "linux"}},
            {"mediaType": OCI_MANIFEST, "digest": "sha256:4444", "size": 100,
             "platform": {"architecture": "unknown", "os": "unknown"},
             "annotations": {"vnd.docker.reference.type": "attestation-manifest"}}
        ],
        "annotations": {"org.opencontainers.image.version": "3.22.2"}
    })
    .to_string()
}

/// A digest string of the right shape.
pub fn digest(fill: char) -> String {
    format!("sha256:{}", fill.to_string().repeat(64))
}
