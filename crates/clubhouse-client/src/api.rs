//! Thin typed wrapper over the REST endpoints.
//!
//! Every call has the same shape: build the request, send it, then branch on
//! the HTTP status. Non-2xx responses become [`ClientError::Status`] carrying
//! the server's `detail` text; 2xx bodies that fail to decode become
//! [`ClientError::Malformed`].

use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use clubhouse_types::api::{
    ActivityFilter, AnnouncementParams, EnrollmentParams, ErrorResponse, LoginParams,
    MessageResponse, UsernameParams,
};
use clubhouse_types::models::{Announcement, Catalog, User};

use crate::error::{ClientError, Result};

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self {
            http: Client::new(),
            base,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    // -- Activities --

    /// GET /activities with optional server-side narrowing.
    pub async fn activities(&self, filter: &ActivityFilter) -> Result<Catalog> {
        let url = self.url(&["activities"])?;
        self.send(self.http.get(url).query(filter)).await
    }

    /// POST /activities/{name}/signup
    pub async fn signup(
        &self,
        activity: &str,
        email: &str,
        teacher: &str,
    ) -> Result<MessageResponse> {
        self.enrollment(activity, "signup", email, teacher).await
    }

    /// POST /activities/{name}/unregister
    pub async fn unregister(
        &self,
        activity: &str,
        email: &str,
        teacher: &str,
    ) -> Result<MessageResponse> {
        self.enrollment(activity, "unregister", email, teacher).await
    }

    async fn enrollment(
        &self,
        activity: &str,
        action: &str,
        email: &str,
        teacher: &str,
    ) -> Result<MessageResponse> {
        let url = self.url(&["activities", activity, action])?;
        let params = EnrollmentParams {
            email: email.to_string(),
            teacher_username: Some(teacher.to_string()),
        };
        self.send(self.http.post(url).query(&params)).await
    }

    // -- Auth --

    pub async fn login(&self, username: &str, password: &str) -> Result<User> {
        let url = self.url(&["auth", "login"])?;
        let params = LoginParams {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.send(self.http.post(url).query(&params)).await
    }

    pub async fn check_session(&self, username: &str) -> Result<User> {
        let url = self.url(&["auth", "check-session"])?;
        self.send(self.http.get(url).query(&username_params(username)))
            .await
    }

    // -- Announcements --

    /// Public list: only announcements showing today.
    pub async fn active_announcements(&self) -> Result<Vec<Announcement>> {
        let url = self.url(&["announcements"])?;
        self.send(self.http.get(url)).await
    }

    /// Management list; the server rejects unknown usernames with 401.
    pub async fn all_announcements(&self, username: &str) -> Result<Vec<Announcement>> {
        let url = self.url(&["announcements", "all"])?;
        self.send(self.http.get(url).query(&username_params(username)))
            .await
    }

    pub async fn create_announcement(&self, params: &AnnouncementParams) -> Result<Announcement> {
        let url = self.url(&["announcements"])?;
        self.send(self.http.post(url).query(params)).await
    }

    pub async fn update_announcement(
        &self,
        id: &str,
        params: &AnnouncementParams,
    ) -> Result<Announcement> {
        let url = self.url(&["announcements", id])?;
        self.send(self.http.put(url).query(params)).await
    }

    pub async fn delete_announcement(&self, id: &str, username: &str) -> Result<MessageResponse> {
        let url = self.url(&["announcements", id])?;
        self.send(self.http.delete(url).query(&username_params(username)))
            .await
    }

    // -- Plumbing --

    /// Append percent-encoded path segments to the base url.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().path().to_string();
        let bytes = response.bytes().await?;
        debug!("{} -> {} ({} bytes)", url, status, bytes.len());

        if !status.is_success() {
            let detail = serde_json::from_slice::<ErrorResponse>(&bytes)
                .ok()
                .map(|body| body.detail);
            return Err(ClientError::Status { status, detail });
        }

        serde_json::from_slice(&bytes).map_err(|e| ClientError::Malformed(format!("{url}: {e}")))
    }
}

fn username_params(username: &str) -> UsernameParams {
    UsernameParams {
        username: username.to_string(),
    }
}
