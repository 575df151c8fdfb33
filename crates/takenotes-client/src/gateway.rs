use reqwest::{Client, Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use takenotes_notify::{Notification, Relay};
use takenotes_types::api::{RefreshRequest, RefreshResponse};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::session::SessionStore;

pub const REFRESH_PATH: &str = "/api/auth/token/refresh/";

const SESSION_EXPIRED: &str = "Session expired. Please sign in again.";

/// HTTP transport for the TakeNotes API.
///
/// Every request gets the stored access token as a bearer credential. On a
/// 401 the gateway performs exactly one refresh call and one retry; a 401 on
/// the retry is final. Non-2xx responses outside the auth endpoints are
/// published to the relay as error notifications.
pub struct Gateway {
    http: Client,
    base: Url,
    session: SessionStore,
    relay: Relay,
}

impl Gateway {
    pub fn new(config: ClientConfig, session: SessionStore, relay: Relay) -> Self {
        Self {
            http: Client::new(),
            base: config.base_url,
            session,
            relay,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn relay(&self) -> &Relay {
        &self.relay
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send_json(Method::GET, path, None).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body)?;
        self.send_json(Method::POST, path, Some(body)).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body)?;
        self.send_json(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(Method::DELETE, path, None).await?;
        Ok(())
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let value = self.send(method, path, body).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Issue one logical request. Returns the decoded JSON body, or
    /// `Value::Null` for empty (204-style) responses.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let url = self.endpoint(path)?;

        let response = self
            .issue(&method, &url, body.as_ref(), self.session.access_token().as_deref())
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            // Consume the body now; this is what the caller sees if recovery
            // fails or is impossible.
            let original = error_from_response(response).await;

            // No refresh token: nothing to recover with, and no toast — a 401
            // here is a sign-in form problem, not a session problem.
            let Some(refresh) = self.session.refresh_token() else {
                return Err(original);
            };

            return match self.refresh_access(&refresh).await {
                Some(access) => {
                    self.session.set_access(&access);
                    debug!(path, "access token refreshed, retrying");
                    let retried = self
                        .issue(&method, &url, body.as_ref(), Some(access.as_str()))
                        .await?;
                    // A second 401 is returned as-is — never a second refresh.
                    self.finish(path, retried).await
                }
                None => {
                    self.session.clear();
                    self.relay.publish(
                        Notification::error(SESSION_EXPIRED).with_title("Authentication"),
                    );
                    Err(original)
                }
            };
        }

        self.finish(path, response).await
    }

    /// Append a request path to the base URL. The leading slash is stripped
    /// so a base with a path prefix keeps it.
    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }

    async fn issue(
        &self,
        method: &Method,
        url: &Url,
        body: Option<&Value>,
        access: Option<&str>,
    ) -> Result<Response, ApiError> {
        let mut request = self.http.request(method.clone(), url.clone());
        if let Some(token) = access {
            request = request.bearer_auth(token);
        }
        if let Some(json) = body {
            request = request.json(json);
        }
        Ok(request.send().await?)
    }

    /// One refresh attempt against the fixed refresh endpoint. Returns the
    /// new access token, or `None` when the call fails or the response
    /// carries none.
    async fn refresh_access(&self, refresh: &str) -> Option<String> {
        let url = self.endpoint(REFRESH_PATH).ok()?;
        let response = self
            .http
            .post(url)
            .json(&RefreshRequest {
                refresh: refresh.to_owned(),
            })
            .send()
            .await
            .ok()?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "token refresh rejected");
            return None;
        }

        let body: RefreshResponse = response.json().await.ok()?;
        body.access
    }

    async fn finish(&self, path: &str, response: Response) -> Result<Value, ApiError> {
        if response.status().is_success() {
            return decode_body(response).await;
        }
        let err = error_from_response(response).await;
        if should_notify(path) {
            self.relay
                .publish(Notification::error(err.user_message()).with_title("Request failed"));
        }
        Err(err)
    }
}

/// Sign-in and sign-up surface their failures as form-level errors, so auth
/// endpoints stay off the relay.
fn should_notify(path: &str) -> bool {
    !path.starts_with("/api/auth/")
}

async fn decode_body(response: Response) -> Result<Value, ApiError> {
    let bytes = response.bytes().await?;
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(&bytes)?)
}

async fn error_from_response(response: Response) -> ApiError {
    let status = response.status().as_u16();
    let body = match response.bytes().await {
        Ok(bytes) if !bytes.is_empty() => serde_json::from_slice(&bytes)
            .ok()
            .or_else(|| Some(Value::String(String::from_utf8_lossy(&bytes).into_owned()))),
        _ => None,
    };
    ApiError::Status { status, body }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryBackend;

    fn gateway_for(base: &str) -> Gateway {
        Gateway::new(
            ClientConfig::new(Url::parse(base).unwrap()),
            SessionStore::new(MemoryBackend::default()),
            Relay::new(),
        )
    }

    #[test]
    fn endpoint_keeps_a_base_path_prefix() {
        let gateway = gateway_for("https://api.example.com/takenotes");
        let url = gateway.endpoint("/api/notes/").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/takenotes/api/notes/");
    }

    #[test]
    fn endpoint_joins_onto_a_bare_origin() {
        let gateway = gateway_for("http://localhost:8000");
        let url = gateway.endpoint(REFRESH_PATH).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/auth/token/refresh/");
    }

    #[test]
    fn endpoint_keeps_query_strings() {
        let gateway = gateway_for("https://api.example.com/takenotes/");
        let url = gateway.endpoint("/api/notes/?category=abc").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/takenotes/api/notes/?category=abc"
        );
    }
}
