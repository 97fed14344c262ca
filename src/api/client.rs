use crate::api::models::{
    Certificate, EnrollResponse, ItemDetail, LoginRequest, LoginResponse, MeResponse,
    ProgressUpdate, Section, Trail, TrailList, TrailProgress, User,
};
use reqwest::{Client, Error as ReqwestError, Response, StatusCode};
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] ReqwestError),
    #[error("Not authenticated")]
    Unauthorized,
    #[error("Not found")]
    NotFound,
    #[error("API rate limit exceeded")]
    RateLimit,
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Backend surface consumed by the lesson session and the UI pages.
///
/// Implemented by [`TrailsClient`] against the real backend and by the
/// recording double in `test_support` for tests.
#[async_trait::async_trait]
pub trait TrailsApi: Send + Sync {
    async fn list_trails(&self) -> Result<Vec<Trail>, ApiError>;
    async fn trail(&self, trail_id: i64) -> Result<Trail, ApiError>;
    async fn sections_with_items(&self, trail_id: i64) -> Result<Vec<Section>, ApiError>;
    async fn trail_progress(&self, trail_id: i64) -> Result<TrailProgress, ApiError>;
    async fn item_detail(&self, trail_id: i64, item_id: i64) -> Result<ItemDetail, ApiError>;
    async fn put_item_progress(
        &self,
        trail_id: i64,
        item_id: i64,
        update: &ProgressUpdate,
    ) -> Result<(), ApiError>;
    async fn enroll(&self, trail_id: i64) -> Result<EnrollResponse, ApiError>;
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError>;
    async fn me(&self) -> Result<Option<User>, ApiError>;
    async fn logout(&self) -> Result<(), ApiError>;
    async fn certificate(&self, cert_hash: &str) -> Result<Certificate, ApiError>;
}

/// Shared handle to a [`TrailsApi`] implementation
pub type SharedTrailsApi = Arc<dyn TrailsApi>;

#[derive(Clone)]
pub struct TrailsClient {
    client: Client,
    base_url: String,
    session_token: Arc<RwLock<Option<String>>>,
}

impl TrailsClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session_token: Arc::new(RwLock::new(None)),
        }
    }

    /// Install a previously persisted session token (keychain restore)
    pub fn set_session_token(&self, token: Option<String>) {
        *self.session_token.write().unwrap() = token;
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let token = self.session_token.read().unwrap().clone();
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Map non-success statuses the way the rest of the app expects them:
    /// 401/403/409 all mean "session is no longer valid".
    fn check_status(response: Response) -> Result<Response, ApiError> {
        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::CONFLICT => {
                Err(ApiError::Unauthorized)
            }
            StatusCode::NOT_FOUND => Err(ApiError::NotFound),
            StatusCode::TOO_MANY_REQUESTS => Err(ApiError::RateLimit),
            _ => Err(ApiError::Request(
                response.error_for_status().unwrap_err(),
            )),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.request(self.client.get(self.url(path))).send().await?;
        let response = Self::check_status(response)?;
        Ok(response.json().await?)
    }
}

#[async_trait::async_trait]
impl TrailsApi for TrailsClient {
    async fn list_trails(&self) -> Result<Vec<Trail>, ApiError> {
        let list: TrailList = self.get_json("/trails/").await?;
        Ok(list.trails)
    }

    async fn trail(&self, trail_id: i64) -> Result<Trail, ApiError> {
        self.get_json(&format!("/trails/{}", trail_id)).await
    }

    async fn sections_with_items(&self, trail_id: i64) -> Result<Vec<Section>, ApiError> {
        self.get_json(&format!("/trails/{}/sections-with-items", trail_id))
            .await
    }

    async fn trail_progress(&self, trail_id: i64) -> Result<TrailProgress, ApiError> {
        self.get_json(&format!("/user-trails/{}/progress", trail_id))
            .await
    }

    async fn item_detail(&self, trail_id: i64, item_id: i64) -> Result<ItemDetail, ApiError> {
        self.get_json(&format!("/trails/{}/items/{}", trail_id, item_id))
            .await
    }

    async fn put_item_progress(
        &self,
        trail_id: i64,
        item_id: i64,
        update: &ProgressUpdate,
    ) -> Result<(), ApiError> {
        let url = self.url(&format!("/trails/{}/items/{}/progress", trail_id, item_id));
        let response = self.request(self.client.put(url)).json(update).send().await?;
        // 2xx is all we need; no response body is consumed.
        Self::check_status(response)?;
        Ok(())
    }

    async fn enroll(&self, trail_id: i64) -> Result<EnrollResponse, ApiError> {
        let url = self.url(&format!("/user-trails/{}/enroll", trail_id));
        let response = self.request(self.client.post(url)).send().await?;
        let response = Self::check_status(response)?;
        Ok(response.json().await?)
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(&body)
            .send()
            .await?;
        let response = Self::check_status(response)?;
        let login: LoginResponse = response.json().await?;
        if login.token.is_some() {
            *self.session_token.write().unwrap() = login.token.clone();
        }
        Ok(login)
    }

    async fn me(&self) -> Result<Option<User>, ApiError> {
        let me: MeResponse = self.get_json("/me").await?;
        Ok(me.user)
    }

    async fn logout(&self) -> Result<(), ApiError> {
        let response = self
            .request(self.client.post(self.url("/auth/logout")))
            .send()
            .await?;
        if let Err(e) = Self::check_status(response) {
            // Best effort: the local token is dropped either way.
            warn!("Logout request failed: {}", e);
        }
        *self.session_token.write().unwrap() = None;
        Ok(())
    }

    async fn certificate(&self, cert_hash: &str) -> Result<Certificate, ApiError> {
        self.get_json(&format!(
            "/certificates/{}",
            urlencoding::encode(cert_hash)
        ))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = TrailsClient::new("http://127.0.0.1:8000/");
        assert_eq!(
            client.url("/trails/7/items/42"),
            "http://127.0.0.1:8000/trails/7/items/42"
        );
    }

    #[test]
    fn test_certificate_hash_is_url_encoded() {
        let client = TrailsClient::new("http://127.0.0.1:8000");
        assert_eq!(
            client.url(&format!("/certificates/{}", urlencoding::encode("a/b+c"))),
            "http://127.0.0.1:8000/certificates/a%2Fb%2Bc"
        );
    }
}
