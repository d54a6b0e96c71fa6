//! tcflow Client - Trimble Connect integration for document approval
//!
//! Drives a sequential multi-approver approval of a documentation folder
//! through the Trimble Connect REST API:
//!
//! - [`bridge`] — session bootstrap through the host workspace bridge and
//!   handling of host notifications (token refresh, settings, commands)
//! - [`client`] — [`TrimbleConnectClient`], typed async methods over the
//!   folder, topic, member, project and organizer endpoints
//! - [`workflow`] — approval steps on top of the client: open a topic for
//!   the first approver, hand over to the next one, move the approved
//!   folder
//!
//! Every call is one authenticated request (or a short fixed sequence of
//! them). Nothing is cached, retried or persisted; failures are logged
//! where they happen and returned to the caller.
//!
//! # Example
//!
//! ```no_run
//! use tcflow_client::{ApprovalProcess, ClientConfig, TrimbleConnectClient};
//! use tcflow_types::UserId;
//!
//! # async fn run() -> tcflow_client::ClientResult<()> {
//! let client = TrimbleConnectClient::from_session(ClientConfig::default(), "token", "project-1")?;
//!
//! let process = ApprovalProcess::new("folder-7", vec![UserId::new("alice"), UserId::new("bob")]);
//! let process = client.start_approval(process, None).await?;
//! let process = client.advance_approval(process, "Druhé schválení").await?;
//! let process = client.finalize_process(process).await?;
//! assert!(process.is_finalized());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

pub mod bridge;
pub mod client;
pub mod config;
pub mod error;
pub mod session;
pub mod workflow;

pub use bridge::{EventSender, WorkspaceBridge, WorkspaceConnection, WorkspaceEvent};
pub use client::TrimbleConnectClient;
pub use config::{ClientConfig, DEFAULT_APPROVED_FOLDER_NAME, DEFAULT_BASE_URL};
pub use error::{ClientError, ClientResult};
pub use session::{Session, SessionHandle};
pub use workflow::{ApprovalProcess, ApprovalState};
