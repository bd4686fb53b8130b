use async_trait::async_trait;
use http::StatusCode;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::api_url;
use crate::core::errors::ClientError;
use crate::core::helpers::extract_message;
use crate::models::models::*;
use crate::session::SessionStore;

pub type ApiResult<T> = Result<T, ClientError>;

#[async_trait]
pub trait BlogApi: Send + Sync {
    /// `POST /auth/login`
    async fn login(&self, req: &LoginRequest) -> ApiResult<LoginResponse>;

    /// `POST /auth/register/user`
    async fn request_register_otp(&self, req: &RegisterOtpRequest) -> ApiResult<()>;

    /// `POST /auth/register/user/verify-otp`
    async fn verify_register_otp(&self, req: &RegisterVerifyRequest) -> ApiResult<()>;

    /// `POST /auth/forgotPassword`
    async fn request_password_otp(&self, req: &ForgotPasswordRequest) -> ApiResult<()>;

    /// `POST /auth/forgotPassword/verify`
    async fn verify_password_otp(
        &self,
        req: &ForgotPasswordVerifyRequest,
    ) -> ApiResult<ResetTokenResponse>;

    /// `POST /auth/forgotPassword/reset`
    async fn reset_password(&self, req: &ResetPasswordRequest) -> ApiResult<()>;

    /// `GET /auth/fetchself`
    async fn fetch_self(&self) -> ApiResult<User>;

    /// `GET /feed?page=N`
    async fn feed(&self, page: u32) -> ApiResult<FeedResponse>;

    /// `POST /post`
    async fn create_post(&self, req: &CreatePostRequest) -> ApiResult<Post>;

    /// `POST /follow/toggle/:username`
    async fn toggle_follow(&self, username: &str) -> ApiResult<()>;

    /// `GET /search?query=Q`
    async fn search(&self, query: &str) -> ApiResult<Vec<UserSummary>>;

    /// `GET /profile/:username`
    async fn profile(&self, username: &str) -> ApiResult<Profile>;
}

/// reqwest-backed [`BlogApi`].
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>, session: Arc<SessionStore>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    /// Gateway pointed at `BLOGIT_API_URL`.
    pub fn from_env(session: Arc<SessionStore>) -> Self {
        Self::new(api_url(), session)
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "api request");
        let builder = self
            .client
            .request(method, url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        match self.session.cookie() {
            Some(cookie) => builder.header(reqwest::header::COOKIE, cookie.header_value()),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> ApiResult<reqwest::Response> {
        let resp = builder.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        // A body cut off mid-read is a transport failure, not a rejection.
        let body = resp.bytes().await.map_err(|err| {
            warn!(%status, error = %err, "failed to read rejected response body");
            ClientError::Network(err.to_string())
        })?;
        debug!(%status, "api request rejected");
        Err(ClientError::rejected(
            StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            extract_message(&body),
        ))
    }

    async fn get_json<T: DeserializeOwned + Send>(&self, path: &str) -> ApiResult<T> {
        let resp = self.send(self.request(Method::GET, path)).await?;
        Ok(resp.json::<T>().await?)
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned + Send>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let resp = self.send(self.request(Method::POST, path).json(body)).await?;
        Ok(resp.json::<T>().await?)
    }

    async fn post_unit<B: Serialize + Sync>(&self, path: &str, body: Option<&B>) -> ApiResult<()> {
        let builder = self.request(Method::POST, path);
        let builder = match body {
            Some(body) => builder.json(body),
            None => builder,
        };
        self.send(builder).await.map(|_| ())
    }
}

#[async_trait]
impl BlogApi for HttpGateway {
    async fn login(&self, req: &LoginRequest) -> ApiResult<LoginResponse> {
        self.post_json("/auth/login", req).await
    }

    async fn request_register_otp(&self, req: &RegisterOtpRequest) -> ApiResult<()> {
        self.post_unit("/auth/register/user", Some(req)).await
    }

    async fn verify_register_otp(&self, req: &RegisterVerifyRequest) -> ApiResult<()> {
        self.post_unit("/auth/register/user/verify-otp", Some(req)).await
    }

    async fn request_password_otp(&self, req: &ForgotPasswordRequest) -> ApiResult<()> {
        self.post_unit("/auth/forgotPassword", Some(req)).await
    }

    async fn verify_password_otp(
        &self,
        req: &ForgotPasswordVerifyRequest,
    ) -> ApiResult<ResetTokenResponse> {
        self.post_json("/auth/forgotPassword/verify", req).await
    }

    async fn reset_password(&self, req: &ResetPasswordRequest) -> ApiResult<()> {
        self.post_unit("/auth/forgotPassword/reset", Some(req)).await
    }

    async fn fetch_self(&self) -> ApiResult<User> {
        self.get_json("/auth/fetchself").await
    }

    async fn feed(&self, page: u32) -> ApiResult<FeedResponse> {
        self.get_json(&format!("/feed?page={}", page)).await
    }

    async fn create_post(&self, req: &CreatePostRequest) -> ApiResult<Post> {
        let created: CreatePostResponse = self.post_json("/post", req).await?;
        Ok(created.post)
    }

    async fn toggle_follow(&self, username: &str) -> ApiResult<()> {
        let path = format!("/follow/toggle/{}", urlencoding::encode(username));
        self.post_unit::<()>(&path, None).await
    }

    async fn search(&self, query: &str) -> ApiResult<Vec<UserSummary>> {
        let path = format!("/search?query={}", urlencoding::encode(query));
        let found: SearchResponse = self.get_json(&path).await?;
        Ok(found.users)
    }

    async fn profile(&self, username: &str) -> ApiResult<Profile> {
        self.get_json(&format!("/profile/{}", urlencoding::encode(username))).await
    }
}
