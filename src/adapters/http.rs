use crate::domain::endpoints;
use crate::domain::model::{Credentials, Role};
use crate::utils::error::{Result, SmokeError};
use crate::utils::validation::validate_url;
use reqwest::{Client, Method, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Status and parsed body of one API call. Non-2xx answers are returned, not raised.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub endpoint: String,
    pub status: StatusCode,
    /// `Value::Null` when the body is empty or not JSON.
    pub body: Value,
    pub raw: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// First `max_chars` characters of the raw body, for failure messages.
    pub fn excerpt(&self, max_chars: usize) -> String {
        let mut excerpt: String = self.raw.chars().take(max_chars).collect();
        if self.raw.chars().count() > max_chars {
            excerpt.push('…');
        }
        excerpt
    }

    /// `detail` / `message` text the service attaches to errors, if any.
    pub fn error_detail(&self) -> Option<String> {
        match self.body.get("detail").or_else(|| self.body.get("message")) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) if !other.is_null() => Some(other.to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoginInfo {
    pub token: String,
    pub reported_role: Option<String>,
    pub user: Value,
}

/// HTTP session for one role: shared client, base URL and bearer token.
#[derive(Debug, Clone)]
pub struct ApiSession {
    client: Client,
    base_url: String,
    role: Role,
    token: Option<String>,
    timeout: Duration,
}

impl ApiSession {
    pub fn new(base_url: &str, role: Role, timeout: Duration) -> Result<Self> {
        Self::with_client(Client::new(), base_url, role, timeout)
    }

    pub fn with_client(client: Client, base_url: &str, role: Role, timeout: Duration) -> Result<Self> {
        validate_url("target.base_url", base_url)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            role,
            token: None,
            timeout,
        })
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn login(&mut self, credentials: &Credentials) -> Result<LoginInfo> {
        let payload = json!({
            "phone": credentials.phone,
            "password": credentials.password,
        });

        tracing::debug!("🔐 Logging in as {} ({})", self.role, credentials.phone);
        let response = self
            .send(Method::POST, endpoints::AUTH_LOGIN, Some(&payload))
            .await?;

        if !response.is_success() {
            return Err(SmokeError::AuthError {
                role: self.role.to_string(),
                message: format!("HTTP {}: {}", response.status, response.excerpt(200)),
            });
        }

        let token = response
            .body
            .get("access_token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SmokeError::AuthError {
                role: self.role.to_string(),
                message: "response has no access_token".to_string(),
            })?
            .to_string();

        let user = response.body.get("user").cloned().unwrap_or(Value::Null);
        let reported_role = user
            .get("role")
            .and_then(Value::as_str)
            .map(str::to_string);

        self.token = Some(token.clone());
        tracing::info!(
            "🔐 Logged in as {} (reported role: {})",
            self.role,
            reported_role.as_deref().unwrap_or("<none>")
        );

        Ok(LoginInfo {
            token,
            reported_role,
            user,
        })
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.send(Method::GET, path, None).await
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> Result<ApiResponse> {
        self.send(Method::POST, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.send(Method::DELETE, path, None).await
    }

    pub async fn delete_json(&self, path: &str, body: &Value) -> Result<ApiResponse> {
        self.send(Method::DELETE, path, Some(body)).await
    }

    async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<ApiResponse> {
        let url = self.url(path);
        let mut request = self
            .client
            .request(method.clone(), &url)
            .timeout(self.timeout);

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!("📡 [{}] {} {}", self.role, method, url);
        let response = request.send().await?;
        let status = response.status();
        let raw = response.text().await?;
        let body = serde_json::from_str(&raw).unwrap_or(Value::Null);
        tracing::debug!("📡 [{}] {} {} -> {}", self.role, method, path, status);

        Ok(ApiResponse {
            endpoint: format!("{} {}", method, path),
            status,
            body,
            raw,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(raw: &str) -> ApiResponse {
        ApiResponse {
            endpoint: "GET /x".to_string(),
            status: StatusCode::UNPROCESSABLE_ENTITY,
            body: serde_json::from_str(raw).unwrap_or(Value::Null),
            raw: raw.to_string(),
        }
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(ApiSession::new("tajline.tj", Role::Admin, DEFAULT_TIMEOUT).is_err());
    }

    #[test]
    fn joins_paths_without_double_slash() {
        let session =
            ApiSession::new("https://tajline.tj/", Role::Courier, DEFAULT_TIMEOUT).unwrap();
        assert_eq!(session.url(endpoints::AUTH_LOGIN), "https://tajline.tj/api/auth/login");
        assert!(!session.is_authenticated());
    }

    #[test]
    fn error_detail_reads_detail_or_message() {
        let r = response(r#"{"detail": [{"loc": ["body", "cargo_ids"], "msg": "field required"}]}"#);
        assert!(r.error_detail().unwrap().contains("cargo_ids"));

        let r = response(r#"{"message": "not found"}"#);
        assert_eq!(r.error_detail().as_deref(), Some("not found"));

        let r = response("<html>502</html>");
        assert!(r.body.is_null());
        assert_eq!(r.error_detail(), None);
    }

    #[test]
    fn excerpt_truncates() {
        let r = response("abcdefghij");
        assert_eq!(r.excerpt(4), "abcd…");
        assert_eq!(r.excerpt(20), "abcdefghij");
    }
}
