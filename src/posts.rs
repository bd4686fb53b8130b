use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::api::BlogApi;
use crate::config::FEED_SCROLL_THRESHOLD;
use crate::core::helpers::strip_leading_newlines;
use crate::core::sequence::RequestSequence;
use crate::models::models::{CreatePostRequest, Post, UserSummary};
use crate::navigation::Route;

// === Feed pager ===

/// Geometry of the feed's scroll container at the time of a scroll event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub client_height: f64,
    pub scroll_height: f64,
}

impl ScrollMetrics {
    pub fn past_threshold(&self) -> bool {
        self.scroll_top + self.client_height >= self.scroll_height * FEED_SCROLL_THRESHOLD
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded { added: usize },
    /// Another page is already on its way.
    Busy,
    /// The backend said there is nothing more.
    Exhausted,
    BelowThreshold,
    /// The fetch failed; state is untouched and the next scroll retries.
    Failed,
    /// The pager was reset while the fetch was in flight.
    Discarded,
}

#[derive(Debug)]
struct PagerState {
    posts: Vec<Post>,
    trending: Vec<UserSummary>,
    page: u32,
    has_more: bool,
    loading: bool,
}

impl PagerState {
    fn fresh(posts: Vec<Post>) -> Self {
        // Server-rendered posts are page 1.
        let page = if posts.is_empty() { 0 } else { 1 };
        Self {
            posts,
            trending: Vec::new(),
            page,
            has_more: true,
            loading: false,
        }
    }
}

/// Loads the feed a page at a time as the viewer scrolls.
///
/// `loading` is claimed under the lock before the fetch starts, so any
/// number of scroll events during a fetch issue no extra requests.
pub struct FeedPager {
    api: Arc<dyn BlogApi>,
    state: Mutex<PagerState>,
    sequence: RequestSequence,
}

impl FeedPager {
    pub fn new(api: Arc<dyn BlogApi>, initial_posts: Vec<Post>) -> Self {
        Self {
            api,
            state: Mutex::new(PagerState::fresh(initial_posts)),
            sequence: RequestSequence::new(),
        }
    }

    fn state(&self) -> MutexGuard<'_, PagerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Load page 1 when the feed was mounted without posts.
    pub async fn bootstrap(&self) -> Option<LoadOutcome> {
        if !self.state().posts.is_empty() {
            return None;
        }
        Some(self.load(Some(1)).await)
    }

    pub async fn load_more(&self) -> LoadOutcome {
        self.load(None).await
    }

    pub async fn on_scroll(&self, metrics: ScrollMetrics) -> LoadOutcome {
        if !metrics.past_threshold() {
            return LoadOutcome::BelowThreshold;
        }
        self.load_more().await
    }

    async fn load(&self, page: Option<u32>) -> LoadOutcome {
        let (page, ticket) = {
            let mut st = self.state();
            if st.loading {
                return LoadOutcome::Busy;
            }
            if !st.has_more {
                return LoadOutcome::Exhausted;
            }
            st.loading = true;
            (page.unwrap_or(st.page + 1), self.sequence.next())
        };

        debug!(page, "loading feed page");
        let result = self.api.feed(page).await;

        let mut st = self.state();
        if !self.sequence.is_latest(ticket) {
            return LoadOutcome::Discarded;
        }
        st.loading = false;

        match result {
            Ok(resp) if resp.success => {
                let added = resp.posts.len();
                st.posts.extend(resp.posts);
                st.page = st.page.max(resp.page);
                st.has_more = resp.has_more;
                st.trending = resp.trending_users;
                LoadOutcome::Loaded { added }
            }
            Ok(_) => {
                warn!(page, "feed responded without success");
                LoadOutcome::Failed
            }
            Err(err) => {
                warn!(page, error = %err, "feed request failed");
                LoadOutcome::Failed
            }
        }
    }

    /// Start over from page 1; a fetch still in flight is ignored when it lands.
    pub fn reset(&self) {
        self.sequence.invalidate();
        *self.state() = PagerState::fresh(Vec::new());
    }

    pub fn posts(&self) -> Vec<Post> {
        self.state().posts.clone()
    }

    pub fn trending_users(&self) -> Vec<UserSummary> {
        self.state().trending.clone()
    }

    /// Last page loaded; 0 before the first one.
    pub fn page(&self) -> u32 {
        self.state().page
    }

    pub fn has_more(&self) -> bool {
        self.state().has_more
    }

    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    pub fn empty_hint(&self) -> Option<&'static str> {
        let st = self.state();
        (st.posts.is_empty() && !st.loading).then_some("No posts yet")
    }

    pub fn end_hint(&self) -> Option<&'static str> {
        let st = self.state();
        (!st.has_more && !st.posts.is_empty()).then_some("Looks Like You've Reached the End")
    }
}

// === Composer ===

const CREATE_POST_FAILED: &str = "Failed to create post. Please try again.";

/// Share box on the viewer's own profile.
pub struct Composer {
    api: Arc<dyn BlogApi>,
    draft: String,
    open: bool,
    error: Option<String>,
}

impl fmt::Debug for Composer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Composer")
            .field("draft", &self.draft)
            .field("open", &self.open)
            .field("error", &self.error)
            .finish()
    }
}

impl Composer {
    pub fn new(api: Arc<dyn BlogApi>) -> Self {
        Self { api, draft: String::new(), open: false, error: None }
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn cancel(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Post the draft. Blank drafts are ignored without a request.
    pub async fn submit(&mut self) -> Option<Post> {
        if self.draft.trim().is_empty() {
            return None;
        }
        self.error = None;
        let content = strip_leading_newlines(&self.draft).to_string();

        match self.api.create_post(&CreatePostRequest { content }).await {
            Ok(post) => {
                self.draft.clear();
                self.open = false;
                Some(post)
            }
            Err(err) => {
                warn!(error = %err, "create post failed");
                self.error = Some(CREATE_POST_FAILED.to_string());
                None
            }
        }
    }
}

// === Rendering ===

/// Display-ready post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostCard {
    pub username: String,
    pub display_name: String,
    pub html: String,
    pub timestamp: String,
    pub profile: Route,
}

impl From<&Post> for PostCard {
    fn from(post: &Post) -> Self {
        Self {
            username: post.author.clone(),
            display_name: post.author_display_name.clone(),
            html: render_content_html(&post.content),
            timestamp: format_timestamp(&post.created_at),
            profile: Route::Profile { username: post.author.clone() },
        }
    }
}

/// Escape the text and keep its line breaks.
pub fn render_content_html(content: &str) -> String {
    html_escape::encode_text(content).replace('\n', "<br />")
}

/// `Jan 5, 2025, 3:04 PM`
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format("%b %-d, %Y, %-I:%M %p").to_string()
}
