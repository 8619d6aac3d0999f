//! JSON-RPC over HTTP.
//!
//! - `POST /mcp`: one JSON-RPC request per body. Notifications get
//!   `202 Accepted` with an empty body.
//!   Bodies over [`MAX_BODY_BYTES`] get `413 Payload Too Large`.
//! - `GET /healthz`: `200 OK`, plain text `OK`.

use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;

use anyhow::Context;
use hyper::body::HttpBody;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server, StatusCode};

use crate::rpc::McpServer;

/// Serve on an already-bound listener until `shutdown` resolves.
pub async fn serve<F>(
    server: Arc<McpServer>,
    listener: std::net::TcpListener,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()>,
{
    listener
        .set_nonblocking(true)
        .context("Failed to configure listener")?;
    let address = listener.local_addr()?;

    let make_svc = make_service_fn(move |_conn| {
        let server = server.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |req| route(server.clone(), req)))
        }
    });

    tracing::info!(address = %address, "Serving JSON-RPC on http://{}/mcp", address);

    Server::from_tcp(listener)
        .context("Failed to start HTTP server")?
        .serve(make_svc)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server error")?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

async fn route(server: Arc<McpServer>, req: Request<Body>) -> Result<Response<Body>, Infallible> {
    let response = match (req.method(), req.uri().path()) {
        (&Method::GET, "/healthz") => text_response(StatusCode::OK, "OK"),
        (&Method::POST, "/mcp") | (&Method::POST, "/mcp/") => handle_rpc(server, req).await,
        (method, path) => {
            tracing::debug!(method = %method, path = %path, "No route");
            text_response(StatusCode::NOT_FOUND, "Not Found")
        }
    };
    Ok(response)
}

/// Largest accepted `/mcp` request body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Read the whole body, or `None` once it grows past `limit`.
async fn read_body(mut body: Body, limit: usize) -> Result<Option<Vec<u8>>, hyper::Error> {
    if body.size_hint().lower() > limit as u64 {
        return Ok(None);
    }

    let mut buf = Vec::new();
    while let Some(chunk) = body.data().await {
        let chunk = chunk?;
        if buf.len() + chunk.len() > limit {
            return Ok(None);
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(Some(buf))
}

async fn handle_rpc(server: Arc<McpServer>, req: Request<Body>) -> Response<Body> {
    let body = match read_body(req.into_body(), MAX_BODY_BYTES).await {
        Ok(Some(body)) => body,
        Ok(None) => {
            tracing::warn!(limit = MAX_BODY_BYTES, "Request body too large");
            return text_response(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read request body");
            return text_response(StatusCode::BAD_REQUEST, "Failed to read request body");
        }
    };

    match server.handle_bytes(&body).await {
        Some(json) => {
            let mut response = Response::new(Body::from(json));
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            response
        }
        None => {
            let mut response = Response::new(Body::empty());
            *response.status_mut() = StatusCode::ACCEPTED;
            response
        }
    }
}

fn text_response(status: StatusCode, text: &'static str) -> Response<Body> {
    let mut response = Response::new(Body::from(text));
    *response.status_mut() = status;
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}
