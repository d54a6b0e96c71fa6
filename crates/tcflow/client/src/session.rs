//! Session state shared between the bootstrap listener and REST calls

use crate::error::{ClientError, ClientResult};
use std::sync::Arc;
use tcflow_types::ProjectId;
use tokio::sync::RwLock;
use url::Url;

/// Authentication state of one client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// REST root, without a trailing slash
    pub base_url: String,
    /// Bearer token; replaced whenever the host pushes a new one
    pub access_token: Option<String>,
    /// Project every request is scoped to
    pub project_id: Option<ProjectId>,
    /// Set once bootstrap succeeded
    pub initialized: bool,
}

impl Session {
    /// Not-ready session against `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            access_token: None,
            project_id: None,
            initialized: false,
        }
    }

    /// Ready session for a token obtained outside the workspace bridge
    pub fn authenticated(
        base_url: impl Into<String>,
        access_token: impl Into<String>,
        project_id: impl Into<ProjectId>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            access_token: Some(access_token.into()),
            project_id: Some(project_id.into()),
            initialized: true,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.initialized && self.access_token.is_some() && self.project_id.is_some()
    }
}

/// Credentials copied out of the session for a single request
#[derive(Debug, Clone)]
pub(crate) struct Credentials {
    /// REST root the request URL is built on
    pub base_url: String,
    /// Token sent as `Authorization: Bearer`
    pub access_token: String,
    /// Scopes the request path
    pub project_id: ProjectId,
}

impl Credentials {
    /// `{base_url}/projects/{project_id}/{segments...}`, each segment
    /// percent-encoded on its own
    pub fn project_url(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::Config(format!("invalid base URL {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::Config(format!("base URL {} cannot take a path", self.base_url)))?
            .pop_if_empty()
            .push("projects")
            .push(self.project_id.as_str())
            .extend(segments);
        Ok(url)
    }
}

/// Shared handle to a [`Session`].
///
/// After bootstrap the notification listener is the only writer.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    inner: Arc<RwLock<Session>>,
}

impl SessionHandle {
    pub fn new(session: Session) -> Self {
        Self {
            inner: Arc::new(RwLock::new(session)),
        }
    }

    /// Copy of the current session
    pub async fn snapshot(&self) -> Session {
        self.inner.read().await.clone()
    }

    pub async fn is_ready(&self) -> bool {
        self.inner.read().await.is_ready()
    }

    /// Store the bootstrap result and mark the session ready
    pub(crate) async fn establish(&self, access_token: String, project_id: ProjectId) {
        let mut session = self.inner.write().await;
        session.access_token = Some(access_token);
        session.project_id = Some(project_id);
        session.initialized = true;
    }

    /// Drop credentials after a failed bootstrap
    pub(crate) async fn reset(&self) {
        let mut session = self.inner.write().await;
        session.access_token = None;
        session.project_id = None;
        session.initialized = false;
    }

    /// Swap the bearer token in place; the new value is not validated
    pub(crate) async fn replace_token(&self, access_token: String) {
        self.inner.write().await.access_token = Some(access_token);
    }

    pub(crate) async fn credentials(&self) -> ClientResult<Credentials> {
        let session = self.inner.read().await;
        match (&session.access_token, &session.project_id) {
            (Some(token), Some(project_id)) if session.initialized => Ok(Credentials {
                base_url: session.base_url.clone(),
                access_token: token.clone(),
                project_id: project_id.clone(),
            }),
            _ => Err(ClientError::NotInitialized),
        }
    }
}
