//! HTTP client for the Trimble Connect REST API

use crate::bridge::{self, WorkspaceBridge, WorkspaceConnection};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::session::{Credentials, Session, SessionHandle};
use chrono::Utc;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tcflow_types::*;
use tokio::task::JoinHandle;

/// Client for one project of a Trimble Connect workspace.
///
/// Every REST method needs a ready session: either call
/// [`initialize`](Self::initialize) on a bridge-backed client, or build the
/// client with [`from_session`](Self::from_session).
pub struct TrimbleConnectClient {
    http: Client,
    config: ClientConfig,
    session: SessionHandle,
    bridge: Option<Arc<dyn WorkspaceBridge>>,
    workspace: Option<Arc<dyn WorkspaceConnection>>,
    listener: Option<JoinHandle<()>>,
}

impl TrimbleConnectClient {
    /// Create a client that authenticates through the workspace bridge
    pub fn new(config: ClientConfig, bridge: Arc<dyn WorkspaceBridge>) -> ClientResult<Self> {
        let config = config.validate()?;
        let session = Session::new(config.base_url.clone());
        Self::build(config, session, Some(bridge))
    }

    /// Create a client around a token obtained elsewhere
    pub fn from_session(
        config: ClientConfig,
        access_token: impl Into<String>,
        project_id: impl Into<ProjectId>,
    ) -> ClientResult<Self> {
        let config = config.validate()?;
        let session = Session::authenticated(config.base_url.clone(), access_token, project_id);
        Self::build(config, session, None)
    }

    fn build(
        config: ClientConfig,
        session: Session,
        bridge: Option<Arc<dyn WorkspaceBridge>>,
    ) -> ClientResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            config,
            session: SessionHandle::new(session),
            bridge,
            workspace: None,
            listener: None,
        })
    }

    /// Run the bridge handshake and store token and project id.
    ///
    /// Fails without retrying; the session then stays not-ready. A repeated
    /// call replaces the previous connection and listener.
    pub async fn initialize(&mut self) -> ClientResult<Project> {
        let workspace_bridge = self.bridge.clone().ok_or_else(|| {
            let e = ClientError::Bridge("no workspace bridge configured".into());
            tracing::error!(error = %e, "Session initialization failed");
            e
        })?;

        if let Some(previous) = self.listener.take() {
            previous.abort();
        }
        self.workspace = None;

        let boot = bridge::bootstrap(
            workspace_bridge.as_ref(),
            &self.session,
            self.config.handshake_timeout(),
        )
        .await?;

        self.workspace = Some(boot.connection);
        self.listener = Some(boot.listener);
        Ok(boot.project)
    }

    /// Whether REST calls can be made
    pub async fn is_initialized(&self) -> bool {
        self.session.is_ready().await
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Open workspace connection, after a successful [`initialize`](Self::initialize)
    pub fn workspace(&self) -> Option<&Arc<dyn WorkspaceConnection>> {
        self.workspace.as_ref()
    }

    // ========== Folders and files ==========

    /// List all folders of the project
    pub async fn get_folders(&self) -> ClientResult<Vec<Folder>> {
        self.get("get_folders", &["folders"]).await
    }

    /// Get a folder by ID
    pub async fn get_folder(&self, folder_id: &FolderId) -> ClientResult<Folder> {
        self.get("get_folder", &["folders", folder_id.as_str()])
            .await
    }

    /// List file metadata in a folder
    pub async fn get_folder_files(&self, folder_id: &FolderId) -> ClientResult<Vec<FileEntry>> {
        self.get("get_folder_files", &["folders", folder_id.as_str(), "files"])
            .await
    }

    /// Create a folder; `None` parent makes it top-level
    pub async fn create_folder(
        &self,
        parent_id: Option<&FolderId>,
        name: &str,
    ) -> ClientResult<Folder> {
        let body = NewFolder {
            name: name.to_string(),
            parent_id: parent_id.cloned(),
        };
        self.post("create_folder", &["folders"], &body).await
    }

    /// Re-parent a folder under `destination_id`
    pub async fn move_folder(
        &self,
        folder_id: &FolderId,
        destination_id: &FolderId,
    ) -> ClientResult<Folder> {
        let body = FolderMove {
            parent_id: destination_id.clone(),
        };
        self.patch("move_folder", &["folders", folder_id.as_str()], &body)
            .await
    }

    // ========== BCF topics ==========

    /// Create a topic; status, type and due date are filled in here
    pub async fn create_bcf_topic(&self, draft: TopicDraft) -> ClientResult<Topic> {
        let body = NewTopic::from_draft(draft, Utc::now());
        let topic: Topic = self.post("create_bcf_topic", &["topics"], &body).await?;

        tracing::info!(
            topic_id = %topic.id,
            assigned_to = %body.assigned_to,
            "BCF topic created"
        );
        Ok(topic)
    }

    /// Partially update a topic
    pub async fn update_bcf_topic(
        &self,
        topic_id: &TopicId,
        update: &TopicUpdate,
    ) -> ClientResult<Topic> {
        self.patch("update_bcf_topic", &["topics", topic_id.as_str()], update)
            .await
    }

    /// Append a comment to a topic
    pub async fn add_bcf_comment(&self, topic_id: &TopicId, text: &str) -> ClientResult<Comment> {
        let body = NewComment {
            text: text.to_string(),
        };
        self.post(
            "add_bcf_comment",
            &["topics", topic_id.as_str(), "comments"],
            &body,
        )
        .await
    }

    /// Close a topic as `Resolved`
    pub async fn resolve_bcf_topic(&self, topic_id: &TopicId) -> ClientResult<Topic> {
        self.resolve_bcf_topic_as(topic_id, TopicStatus::Resolved)
            .await
    }

    /// Close a topic with a caller-chosen status, stamping `resolvedAt` now
    pub async fn resolve_bcf_topic_as(
        &self,
        topic_id: &TopicId,
        resolution: impl Into<TopicStatus>,
    ) -> ClientResult<Topic> {
        let update = TopicUpdate::resolution(resolution, Utc::now());
        self.update_bcf_topic(topic_id, &update).await
    }

    // ========== Project ==========

    /// List the project's members
    pub async fn get_project_users(&self) -> ClientResult<Vec<ProjectMember>> {
        self.get("get_project_users", &["members"]).await
    }

    /// Get the project record
    pub async fn get_project_metadata(&self) -> ClientResult<Project> {
        self.get("get_project_metadata", &[]).await
    }

    /// List organizers attached to a folder
    pub async fn get_organizers(&self, folder_id: &FolderId) -> ClientResult<Vec<Organizer>> {
        self.get_with_query(
            "get_organizers",
            &["organizers"],
            &[("folderId", folder_id.as_str())],
        )
        .await
    }

    // ========== Internal HTTP helpers ==========

    async fn credentials(&self, operation: &'static str) -> ClientResult<Credentials> {
        self.session.credentials().await.map_err(|e| {
            tracing::error!(operation, error = %e, "Request rejected");
            e
        })
    }

    fn authorized(
        &self,
        credentials: &Credentials,
        method: Method,
        path: &[&str],
    ) -> ClientResult<RequestBuilder> {
        let url = credentials.project_url(path)?;
        Ok(self
            .http
            .request(method, url)
            .bearer_auth(&credentials.access_token)
            .header(CONTENT_TYPE, "application/json"))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &[&str],
    ) -> ClientResult<T> {
        self.get_with_query(operation, path, &[]).await
    }

    async fn get_with_query<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &[&str],
        query: &[(&str, &str)],
    ) -> ClientResult<T> {
        let credentials = self.credentials(operation).await?;
        let mut request = self.authorized(&credentials, Method::GET, path)?;
        if !query.is_empty() {
            request = request.query(query);
        }
        self.execute(operation, request).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &[&str],
        body: &B,
    ) -> ClientResult<T> {
        let credentials = self.credentials(operation).await?;
        let request = self.authorized(&credentials, Method::POST, path)?.json(body);
        self.execute(operation, request).await
    }

    async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &[&str],
        body: &B,
    ) -> ClientResult<T> {
        let credentials = self.credentials(operation).await?;
        let request = self.authorized(&credentials, Method::PATCH, path)?.json(body);
        self.execute(operation, request).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> ClientResult<T> {
        let response = request
            .send()
            .await
            .map_err(|source| failed(ClientError::Transport { operation, source }))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(failed(ClientError::Status {
                operation,
                status: status.as_u16(),
                body,
            }));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| failed(ClientError::Transport { operation, source }))?;

        serde_json::from_slice(&bytes)
            .map_err(|source| failed(ClientError::Decode { operation, source }))
    }
}

impl Drop for TrimbleConnectClient {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
    }
}

fn failed(error: ClientError) -> ClientError {
    tracing::error!(
        operation = error.operation().unwrap_or("unknown"),
        status = error.status(),
        error = %error,
        "Trimble Connect request failed"
    );
    error
}
