//! HTTP transport against the registry distribution API.
//!
//! A [`RegistrySession`] carries the authentication state of one operation:
//! the caller's credentials and any bearer token obtained from a challenge.
//! It is created per call and dropped with it; the underlying
//! `reqwest::Client` (connection pool only) is shared.

use reqwest::header::{HeaderMap, ACCEPT, CONTENT_TYPE, LINK, WWW_AUTHENTICATE};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use oci_mcp_core::config::ClientOptions;
use oci_mcp_core::error::{OciError, Result};

use crate::auth::{AuthChallenge, Authorization, Credentials, TokenResponse};
use crate::reference::{Endpoint, RegistryRef};

/// Response of a successful registry request.
#[derive(Debug, Clone)]
pub struct RegistryResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RegistryResponse {
    /// First value of `name`, if present, non-empty and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE.as_str())
    }

    /// Target of the `Link: <...>; rel="next"` header, if any.
    pub fn next_link(&self) -> Option<String> {
        self.headers
            .get_all(LINK)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(','))
            .find_map(parse_next_link)
    }
}

/// Parse one `<url>; rel="next"` link-value.
fn parse_next_link(link: &str) -> Option<String> {
    let mut parts = link.split(';');
    let target = parts.next()?.trim();
    let target = target.strip_prefix('<')?.strip_suffix('>')?;
    let is_next = parts.any(|param| {
        let param = param.trim();
        match param.split_once('=') {
            Some((key, value)) => {
                key.trim().eq_ignore_ascii_case("rel")
                    && value.trim().trim_matches('"').eq_ignore_ascii_case("next")
            }
            None => false,
        }
    });
    is_next.then(|| target.to_string())
}

/// OCI error body: `{"errors":[{"code":"...","message":"..."}]}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct ErrorEntry {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Human-readable message for a failed response.
fn describe_failure(status: StatusCode, body: &[u8]) -> String {
    let detail = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.errors.into_iter().next())
        .map(|e| match (e.code.is_empty(), e.message.is_empty()) {
            (false, false) => format!("{}: {}", e.code, e.message),
            (false, true) => e.code,
            _ => e.message,
        })
        .filter(|m| !m.is_empty());

    match detail {
        Some(detail) => format!("HTTP {}: {}", status, detail),
        None => format!("HTTP {}", status),
    }
}

/// Shared HTTP client for registry requests.
#[derive(Debug, Clone)]
pub struct RegistryTransport {
    client: Client,
    options: ClientOptions,
}

impl RegistryTransport {
    /// Build the transport from client options.
    pub fn new(options: &ClientOptions) -> Result<Self> {
        let mut builder = Client::builder().user_agent(options.user_agent.clone());
        if let Some(timeout) = options.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| OciError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            options: options.clone(),
        })
    }

    /// Open a session for one operation against `target`.
    pub fn session<'a>(
        &'a self,
        target: &RegistryRef,
        credentials: Option<&Credentials>,
    ) -> Result<RegistrySession<'a>> {
        let endpoint = target.endpoint()?;
        let base_url = format!("{}://{}", self.options.scheme(&target.registry), endpoint.host);
        let base_url = Url::parse(&base_url).map_err(|e| OciError::InvalidReference {
            reference: target.full_reference(),
            message: e.to_string(),
        })?;

        Ok(RegistrySession {
            transport: self,
            target: target.full_reference(),
            endpoint,
            base_url,
            credentials: credentials.cloned(),
            authorization: None,
        })
    }

    /// Fetch the manifest addressed by `target`, authenticating as needed.
    ///
    /// With credentials, a login request runs first. Registry auth challenges
    /// are answered transparently; a single attempt is made otherwise.
    pub async fn authenticated_request(
        &self,
        target: &RegistryRef,
        credentials: Option<&Credentials>,
        accepted_media_types: &[&str],
    ) -> Result<RegistryResponse> {
        let mut session = self.session(target, credentials)?;
        if credentials.is_some() {
            session.login().await?;
        }
        let path = session
            .endpoint()
            .manifest_path()
            .ok_or_else(|| OciError::InvalidReference {
                reference: target.full_reference(),
                message: "no tag or digest to fetch".to_string(),
            })?;
        let url = session.url(&path)?;
        session.get(url, accepted_media_types).await
    }
}

/// Authentication state for one operation. Never outlives the call.
pub struct RegistrySession<'a> {
    transport: &'a RegistryTransport,
    target: String,
    endpoint: Endpoint,
    base_url: Url,
    credentials: Option<Credentials>,
    authorization: Option<Authorization>,
}

impl<'a> RegistrySession<'a> {
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Resolve a path or a (possibly relative) link against the registry base URL.
    pub fn url(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(|e| OciError::InvalidReference {
            reference: self.target.clone(),
            message: format!("invalid request path '{}': {}", path, e),
        })
    }

    /// Verify credentials against `/v2/` before any other request.
    pub async fn login(&mut self) -> Result<()> {
        let Some(credentials) = self.credentials.clone() else {
            return Ok(());
        };
        self.authorization = Some(Authorization::Basic(credentials));

        let url = self.url("/v2/")?;
        self.send_authenticated(url, &[], None).await.map_err(|e| match e {
            OciError::FetchFailed {
                status: Some(_),
                message,
                ..
            } => OciError::AuthenticationFailed {
                registry: self.endpoint.host.clone(),
                message: format!("login failed: {}", message),
            },
            other => other,
        })?;

        tracing::debug!(registry = %self.endpoint.host, "Registry login succeeded");
        Ok(())
    }

    /// GET `url` with the repository pull scope.
    pub async fn get(&mut self, url: Url, accept: &[&str]) -> Result<RegistryResponse> {
        let scope = self.endpoint.pull_scope();
        self.send_authenticated(url, accept, Some(&scope)).await
    }

    async fn send_authenticated(
        &mut self,
        url: Url,
        accept: &[&str],
        default_scope: Option<&str>,
    ) -> Result<RegistryResponse> {
        let response = self.send(url.clone(), accept).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return self.finish(response).await;
        }

        let challenge = response
            .headers()
            .get(WWW_AUTHENTICATE)
            .and_then(|v| v.to_str().ok())
            .and_then(AuthChallenge::parse)
            .ok_or_else(|| OciError::AuthenticationFailed {
                registry: self.endpoint.host.clone(),
                message: "401 without a usable WWW-Authenticate challenge".to_string(),
            })?;

        tracing::debug!(
            registry = %self.endpoint.host,
            authenticated = self.credentials.is_some(),
            "Answering registry auth challenge"
        );

        self.authorization = Some(match challenge {
            AuthChallenge::Basic => match self.credentials.clone() {
                Some(credentials) => Authorization::Basic(credentials),
                None => {
                    return Err(OciError::AuthenticationFailed {
                        registry: self.endpoint.host.clone(),
                        message: "registry requires credentials".to_string(),
                    })
                }
            },
            AuthChallenge::Bearer {
                realm,
                service,
                scope,
            } => {
                let scope = scope.or_else(|| default_scope.map(str::to_string));
                let token = self
                    .fetch_token(&realm, service.as_deref(), scope.as_deref())
                    .await?;
                Authorization::Bearer(token)
            }
        });

        let retry = self.send(url, accept).await?;
        self.finish(retry).await
    }

    async fn send(&self, url: Url, accept: &[&str]) -> Result<reqwest::Response> {
        let mut request = self.transport.client.get(url);
        if !accept.is_empty() {
            request = request.header(ACCEPT, accept.join(", "));
        }
        if let Some(ref authorization) = self.authorization {
            request = authorization.apply(request);
        }

        request.send().await.map_err(|e| OciError::FetchFailed {
            reference: self.target.clone(),
            status: None,
            message: e.to_string(),
        })
    }

    async fn finish(&self, response: reqwest::Response) -> Result<RegistryResponse> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| OciError::FetchFailed {
                reference: self.target.clone(),
                status: Some(status.as_u16()),
                message: format!("failed to read response body: {}", e),
            })?
            .to_vec();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(OciError::AuthenticationFailed {
                registry: self.endpoint.host.clone(),
                message: describe_failure(status, &body),
            });
        }
        if !status.is_success() {
            return Err(OciError::FetchFailed {
                reference: self.target.clone(),
                status: Some(status.as_u16()),
                message: describe_failure(status, &body),
            });
        }

        Ok(RegistryResponse {
            status: status.as_u16(),
            headers,
            body,
        })
    }

    /// Exchange a bearer challenge for a token, using basic auth when available.
    async fn fetch_token(
        &self,
        realm: &str,
        service: Option<&str>,
        scope: Option<&str>,
    ) -> Result<String> {
        let auth_error = |message: String| OciError::AuthenticationFailed {
            registry: self.endpoint.host.clone(),
            message,
        };

        let mut url = Url::parse(realm)
            .map_err(|e| auth_error(format!("invalid token realm '{}': {}", realm, e)))?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(service) = service {
                query.append_pair("service", service);
            }
            if let Some(scope) = scope {
                query.append_pair("scope", scope);
            }
        }

        let mut request = self.transport.client.get(url);
        if let Some(ref credentials) = self.credentials {
            request = request.basic_auth(credentials.username(), Some(credentials.password()));
        }

        let response = request
            .send()
            .await
            .map_err(|e| auth_error(format!("token request failed: {}", e)))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(auth_error(format!(
                "token request rejected: {}",
                describe_failure(status, &body)
            )));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| auth_error(format!("invalid token response: {}", e)))?
            .into_token()
            .ok_or_else(|| auth_error("token response carried no token".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn response_with_links(links: &[&str]) -> RegistryResponse {
        let mut headers = HeaderMap::new();
        for link in links {
            headers.append(LINK, HeaderValue::from_str(link).unwrap());
        }
        RegistryResponse {
            status: 200,
            headers,
            body: Vec::new(),
        }
    }

    #[test]
    fn test_next_link_relative() {
        let r = response_with_links(&[r#"</v2/app/tags/list?last=b&n=2>; rel="next""#]);
        assert_eq!(r.next_link().as_deref(), Some("/v2/app/tags/list?last=b&n=2"));
    }

    #[test]
    fn test_next_link_ignores_other_relations() {
        let r = response_with_links(&[r#"</v2/app/tags/list?last=a>; rel="prev""#]);
        assert_eq!(r.next_link(), None);
    }

    #[test]
    fn test_next_link_among_several() {
        let r = response_with_links(&[
            r#"</first>; rel="first", </v2/app/tags/list?last=z>; rel=next"#,
        ]);
        assert_eq!(r.next_link().as_deref(), Some("/v2/app/tags/list?last=z"));
    }

    #[test]
    fn test_next_link_absent() {
        assert_eq!(response_with_links(&[]).next_link(), None);
    }

    #[test]
    fn test_header_skips_empty_values() {
        let mut headers = HeaderMap::new();
        headers.insert("docker-content-digest", HeaderValue::from_static(""));
        let r = RegistryResponse {
            status: 200,
            headers,
            body: Vec::new(),
        };
        assert_eq!(r.header("docker-content-digest"), None);
    }

    #[test]
    fn test_describe_failure_with_oci_error_body() {
        let body = br#"{"errors":[{"code":"MANIFEST_UNKNOWN","message":"manifest unknown"}]}"#;
        assert_eq!(
            describe_failure(StatusCode::NOT_FOUND, body),
            "HTTP 404 Not Found: MANIFEST_UNKNOWN: manifest unknown"
        );
    }

    #[test]
    fn test_describe_failure_without_body() {
        assert_eq!(
            describe_failure(StatusCode::BAD_GATEWAY, b"upstream down"),
            "HTTP 502 Bad Gateway"
        );
    }

    #[test]
    fn test_session_uses_https_by_default() {
        let transport = RegistryTransport::new(&ClientOptions::default()).unwrap();
        let target = RegistryRef::new("ghcr.io", "org/app", "v1");
        let session = transport.session(&target, None).unwrap();
        assert_eq!(
            session.url("/v2/").unwrap().as_str(),
            "https://ghcr.io/v2/"
        );
    }

    #[test]
    fn test_session_uses_http_for_insecure_registry() {
        let options = ClientOptions {
            insecure_registries: vec!["localhost:5000".to_string()],
            ..Default::default()
        };
        let transport = RegistryTransport::new(&options).unwrap();
        let target = RegistryRef::new("localhost:5000", "app", "v1");
        let session = transport.session(&target, None).unwrap();
        assert_eq!(
            session.url("/v2/app/manifests/v1").unwrap().as_str(),
            "http://localhost:5000/v2/app/manifests/v1"
        );
    }

    #[test]
    fn test_session_rejects_malformed_reference() {
        let transport = RegistryTransport::new(&ClientOptions::default()).unwrap();
        let target = RegistryRef::new("ghcr.io", "UPPER/case", "v1");
        assert!(matches!(
            transport.session(&target, None),
            Err(OciError::InvalidReference { .. })
        ));
    }
}
