#![allow(dead_code)]

use async_trait::async_trait;
use http::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use blogit::api::{ApiResult, BlogApi};
use blogit::models::models::*;
use blogit::ClientError;

/// Scripted answer for one call.
#[derive(Clone, Debug)]
pub enum Reply {
    Json(Value),
    Status(u16, Option<&'static str>),
    Network,
}

/// In-memory backend. Every call is recorded with its body; replies are
/// taken from a per-endpoint queue (unit `null` when the queue is empty).
#[derive(Default)]
pub struct FakeApi {
    calls: Mutex<Vec<(String, Value)>>,
    replies: Mutex<HashMap<&'static str, VecDeque<Reply>>>,
    gates: Mutex<HashMap<&'static str, Arc<Notify>>>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, endpoint: &'static str, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .entry(endpoint)
            .or_default()
            .push_back(reply);
    }

    /// Hold every call to `endpoint` until the returned gate is notified.
    pub fn gate(&self, endpoint: &'static str) -> Arc<Notify> {
        self.gates
            .lock()
            .unwrap()
            .entry(endpoint)
            .or_insert_with(|| Arc::new(Notify::new()))
            .clone()
    }

    pub fn calls(&self, endpoint: &str) -> Vec<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| name == endpoint)
            .map(|(_, body)| body.clone())
            .collect()
    }

    pub fn call_count(&self, endpoint: &str) -> usize {
        self.calls(endpoint).len()
    }

    async fn hit<T: DeserializeOwned + Send>(&self, endpoint: &'static str, body: Value) -> ApiResult<T> {
        self.calls.lock().unwrap().push((endpoint.to_string(), body));

        let gate = self.gates.lock().unwrap().get(endpoint).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let reply = self
            .replies
            .lock()
            .unwrap()
            .get_mut(endpoint)
            .and_then(|queue| queue.pop_front())
            .unwrap_or(Reply::Json(Value::Null));

        match reply {
            Reply::Json(value) => Ok(serde_json::from_value(value)?),
            Reply::Status(code, message) => Err(ClientError::rejected(
                StatusCode::from_u16(code).unwrap(),
                message.map(str::to_string),
            )),
            Reply::Network => Err(ClientError::Network("connection refused".to_string())),
        }
    }
}

#[async_trait]
impl BlogApi for FakeApi {
    async fn login(&self, req: &LoginRequest) -> ApiResult<LoginResponse> {
        self.hit("login", serde_json::to_value(req).unwrap()).await
    }

    async fn request_register_otp(&self, req: &RegisterOtpRequest) -> ApiResult<()> {
        self.hit("register", serde_json::to_value(req).unwrap()).await
    }

    async fn verify_register_otp(&self, req: &RegisterVerifyRequest) -> ApiResult<()> {
        self.hit("register_verify", serde_json::to_value(req).unwrap()).await
    }

    async fn request_password_otp(&self, req: &ForgotPasswordRequest) -> ApiResult<()> {
        self.hit("forgot", serde_json::to_value(req).unwrap()).await
    }

    async fn verify_password_otp(
        &self,
        req: &ForgotPasswordVerifyRequest,
    ) -> ApiResult<ResetTokenResponse> {
        self.hit("forgot_verify", serde_json::to_value(req).unwrap()).await
    }

    async fn reset_password(&self, req: &ResetPasswordRequest) -> ApiResult<()> {
        self.hit("reset", serde_json::to_value(req).unwrap()).await
    }

    async fn fetch_self(&self) -> ApiResult<User> {
        self.hit("fetchself", Value::Null).await
    }

    async fn feed(&self, page: u32) -> ApiResult<FeedResponse> {
        self.hit("feed", json!({ "page": page })).await
    }

    async fn create_post(&self, req: &CreatePostRequest) -> ApiResult<Post> {
        let created: CreatePostResponse = self.hit("post", serde_json::to_value(req).unwrap()).await?;
        Ok(created.post)
    }

    async fn toggle_follow(&self, username: &str) -> ApiResult<()> {
        self.hit("follow", json!({ "username": username })).await
    }

    async fn search(&self, query: &str) -> ApiResult<Vec<UserSummary>> {
        let found: SearchResponse = self.hit("search", json!({ "query": query })).await?;
        Ok(found.users)
    }

    async fn profile(&self, username: &str) -> ApiResult<Profile> {
        self.hit("profile", json!({ "username": username })).await
    }
}

// === Payload builders ===

pub fn user_json(username: &str) -> Value {
    json!({
        "username": username,
        "displayName": username.to_uppercase(),
        "following": [],
        "followers": [],
    })
}

pub fn flat_post(author: &str, content: &str) -> Value {
    json!({
        "author": author,
        "authorDisplayName": author.to_uppercase(),
        "content": content,
        "createdAt": "2025-01-05T15:04:00Z",
    })
}

/// A `/feed` page in the nested shape the backend sends.
pub fn feed_page(page: u32, has_more: bool, count: usize) -> Value {
    let posts: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "user": { "username": format!("author{}", i), "displayName": "Author" },
                "content": format!("page {} post {}", page, i),
                "dateofcreation": "2025-01-05T15:04:00Z",
            })
        })
        .collect();
    json!({
        "success": true,
        "posts": posts,
        "page": page,
        "hasMore": has_more,
        "trendingUsers": [{ "username": format!("trend{}", page), "displayName": "Trend" }],
    })
}

pub fn seed_post() -> Post {
    serde_json::from_value(flat_post("seed", "already here")).unwrap()
}
