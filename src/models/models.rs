use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub username: String,
    pub display_name: String,
}

/// The viewer, as resolved by `/auth/fetchself`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub display_name: String,
    #[serde(default)]
    pub following: Vec<UserSummary>,
    #[serde(default)]
    pub followers: Vec<UserSummary>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(from = "PostWire", rename_all = "camelCase")]
pub struct Post {
    pub author: String,
    pub author_display_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Profiles send flat posts, the feed nests the author under `user`.
#[derive(Deserialize)]
#[serde(untagged)]
enum PostWire {
    #[serde(rename_all = "camelCase")]
    Flat {
        author: String,
        author_display_name: String,
        content: String,
        created_at: DateTime<Utc>,
    },
    Nested {
        user: UserSummary,
        content: String,
        dateofcreation: DateTime<Utc>,
    },
}

impl From<PostWire> for Post {
    fn from(wire: PostWire) -> Self {
        match wire {
            PostWire::Flat { author, author_display_name, content, created_at } => Post {
                author,
                author_display_name,
                content,
                created_at,
            },
            PostWire::Nested { user, content, dateofcreation } => Post {
                author: user.username,
                author_display_name: user.display_name,
                content,
                created_at: dateofcreation,
            },
        }
    }
}

/// Relationship field that some endpoints send as a list and others as a count.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum Relations {
    Count(u64),
    List(Vec<UserSummary>),
}

impl Relations {
    pub fn count(&self) -> u64 {
        match self {
            Relations::Count(n) => *n,
            Relations::List(users) => users.len() as u64,
        }
    }
}

impl Default for Relations {
    fn default() -> Self {
        Relations::Count(0)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub username: String,
    pub display_name: String,
    #[serde(default)]
    pub following: Relations,
    #[serde(default)]
    pub followers: Relations,
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub is_following: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub trending_users: Vec<UserSummary>,
}

// === Request bodies ===

#[derive(Serialize, Clone, Debug)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub session_id: String,
}

#[derive(Serialize, Clone, Debug)]
pub struct RegisterOtpRequest {
    pub username: String,
    pub email: String,
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RegisterVerifyRequest {
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub password: String,
    pub otp_code: String,
}

#[derive(Serialize, Clone, Debug)]
pub struct ForgotPasswordRequest {
    pub username: String,
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordVerifyRequest {
    pub username: String,
    pub otp_code: String,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ResetTokenResponse {
    pub reset_token: String,
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub reset_token: String,
    pub new_password: String,
}

#[derive(Serialize, Clone, Debug)]
pub struct CreatePostRequest {
    pub content: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct CreatePostResponse {
    pub post: Post,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct SearchResponse {
    #[serde(default)]
    pub users: Vec<UserSummary>,
}
