//! Workspace bridge: session bootstrap and host notifications
//!
//! The host platform exposes a bridge object that performs the handshake,
//! hands out access tokens and reports the active project. After the
//! handshake it keeps pushing notifications (token refresh, settings
//! changes, user commands) into a channel that a listener task drains for
//! the lifetime of the client.

use crate::error::{ClientError, ClientResult};
use crate::session::SessionHandle;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tcflow_types::Project;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Sending half handed to the bridge for host notifications
pub type EventSender = mpsc::UnboundedSender<WorkspaceEvent>;

/// Host-provided entry point to the workspace
#[async_trait]
pub trait WorkspaceBridge: Send + Sync {
    /// Open the connection; `events` stays valid for the whole session
    async fn connect(
        &self,
        events: EventSender,
        timeout: Duration,
    ) -> ClientResult<Box<dyn WorkspaceConnection>>;
}

/// An open workspace connection
#[async_trait]
pub trait WorkspaceConnection: Send + Sync {
    /// Ask the host for a bearer token
    async fn request_access_token(&self) -> ClientResult<String>;

    /// The project the extension is running in
    async fn get_project(&self) -> ClientResult<Project>;
}

// ── Notifications ────────────────────────────────────────────────────

/// A notification pushed by the host
#[derive(Debug, Clone, PartialEq)]
pub enum WorkspaceEvent {
    /// Fresh bearer token
    AccessToken(String),
    /// The user changed their settings
    UserSettingsChanged(Value),
    /// The user triggered an extension command
    Command(Value),
    /// Any other notification kind
    Unknown { kind: String },
}

impl WorkspaceEvent {
    pub const ACCESS_TOKEN: &'static str = "extension.accessToken";
    pub const USER_SETTINGS_CHANGED: &'static str = "extension.userSettingsChanged";
    pub const COMMAND: &'static str = "extension.command";

    /// Convert a raw host callback (`event`, `args`) where the payload
    /// lives in `args.data`
    pub fn from_host(event: &str, args: &Value) -> Self {
        let data = args.get("data").cloned().unwrap_or(Value::Null);
        match event {
            Self::ACCESS_TOKEN => match data {
                Value::String(token) => Self::AccessToken(token),
                _ => Self::Unknown {
                    kind: event.to_string(),
                },
            },
            Self::USER_SETTINGS_CHANGED => Self::UserSettingsChanged(data),
            Self::COMMAND => Self::Command(data),
            other => Self::Unknown {
                kind: other.to_string(),
            },
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            Self::AccessToken(_) => Self::ACCESS_TOKEN,
            Self::UserSettingsChanged(_) => Self::USER_SETTINGS_CHANGED,
            Self::Command(_) => Self::COMMAND,
            Self::Unknown { kind } => kind,
        }
    }
}

/// Apply one notification to the session
pub(crate) async fn handle_event(session: &SessionHandle, event: WorkspaceEvent) {
    tracing::debug!(kind = event.kind(), "Workspace event");

    match event {
        WorkspaceEvent::AccessToken(token) => {
            session.replace_token(token).await;
            tracing::info!("Access token refreshed");
        }
        WorkspaceEvent::UserSettingsChanged(_) => {
            tracing::info!("User settings changed");
        }
        WorkspaceEvent::Command(data) => {
            tracing::info!(command = %data, "User command received");
        }
        WorkspaceEvent::Unknown { .. } => {}
    }
}

fn spawn_listener(
    session: SessionHandle,
    mut events: mpsc::UnboundedReceiver<WorkspaceEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            handle_event(&session, event).await;
        }
        tracing::debug!("Workspace event channel closed");
    })
}

// ── Bootstrap ────────────────────────────────────────────────────────

/// Outcome of a successful handshake
pub(crate) struct Bootstrap {
    pub connection: Arc<dyn WorkspaceConnection>,
    pub listener: JoinHandle<()>,
    pub project: Project,
}

/// Connect, fetch token and project, start the listener.
///
/// On failure the session is left not-ready and no listener survives.
pub(crate) async fn bootstrap(
    bridge: &dyn WorkspaceBridge,
    session: &SessionHandle,
    timeout: Duration,
) -> ClientResult<Bootstrap> {
    let (events_tx, events_rx) = mpsc::unbounded_channel();

    let connection = match tokio::time::timeout(timeout, bridge.connect(events_tx, timeout)).await {
        Ok(Ok(connection)) => Arc::<dyn WorkspaceConnection>::from(connection),
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Workspace bridge connection failed");
            session.reset().await;
            return Err(e);
        }
        Err(_) => {
            let e = ClientError::HandshakeTimeout(timeout);
            tracing::error!(error = %e, "Workspace bridge connection failed");
            session.reset().await;
            return Err(e);
        }
    };

    let listener = spawn_listener(session.clone(), events_rx);

    let credentials = async {
        let token = connection.request_access_token().await?;
        let project = connection.get_project().await?;
        Ok::<_, ClientError>((token, project))
    }
    .await;

    match credentials {
        Ok((token, project)) => {
            session.establish(token, project.id.clone()).await;
            tracing::info!(project_id = %project.id, "Trimble Connect session initialized");
            Ok(Bootstrap {
                connection,
                listener,
                project,
            })
        }
        Err(e) => {
            listener.abort();
            session.reset().await;
            tracing::error!(error = %e, "Session initialization failed");
            Err(e)
        }
    }
}
