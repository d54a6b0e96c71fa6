//! Sequential document approval
//!
//! Each approver gets one BCF topic. Advancing resolves the current topic
//! and opens the next one; finalizing moves the documentation folder into
//! the approved folder (created top-level when missing).
//!
//! The driver keeps no state. Callers either track topic ids themselves and
//! use the step methods directly, or thread an [`ApprovalProcess`] through
//! [`start_approval`](TrimbleConnectClient::start_approval),
//! [`advance_approval`](TrimbleConnectClient::advance_approval) and
//! [`finalize_process`](TrimbleConnectClient::finalize_process). Steps must
//! be awaited one after another; nothing here orders concurrent calls.

use crate::client::TrimbleConnectClient;
use crate::error::{ClientError, ClientResult};
use serde::{Deserialize, Serialize};
use tcflow_types::{Folder, FolderId, Topic, TopicDraft, TopicId, TopicPriority, UserId};

/// Title of the first approver's topic
pub fn approval_title(folder_name: &str) -> String {
    format!("Schválení dokumentace: {}", folder_name)
}

/// Description used when the caller gives none
pub fn default_approval_description(folder_name: &str) -> String {
    format!("Prosím, schvalte dokumentaci ve složce: {}", folder_name)
}

// ── Process state ────────────────────────────────────────────────────

/// Where an approval process stands
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ApprovalState {
    NotStarted,
    AwaitingApprover { topic: Topic, approver_index: usize },
    Finalized { approved_folder: Folder },
}

/// Caller-owned record of one approval run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApprovalProcess {
    /// Documentation folder under approval
    pub folder_id: FolderId,
    /// Approvers in signing order
    pub approvers: Vec<UserId>,
    /// Current position in the run
    pub state: ApprovalState,
}

impl ApprovalProcess {
    pub fn new(folder_id: impl Into<FolderId>, approvers: Vec<UserId>) -> Self {
        Self {
            folder_id: folder_id.into(),
            approvers,
            state: ApprovalState::NotStarted,
        }
    }

    /// Approver whose topic is open
    pub fn current_approver(&self) -> Option<&UserId> {
        match &self.state {
            ApprovalState::AwaitingApprover { approver_index, .. } => {
                self.approvers.get(*approver_index)
            }
            _ => None,
        }
    }

    /// Open topic, if any
    pub fn current_topic(&self) -> Option<&Topic> {
        match &self.state {
            ApprovalState::AwaitingApprover { topic, .. } => Some(topic),
            _ => None,
        }
    }

    pub fn is_last_approver(&self) -> bool {
        match &self.state {
            ApprovalState::AwaitingApprover { approver_index, .. } => {
                approver_index + 1 >= self.approvers.len()
            }
            _ => false,
        }
    }

    pub fn is_finalized(&self) -> bool {
        matches!(self.state, ApprovalState::Finalized { .. })
    }
}

impl TrimbleConnectClient {
    // ========== Workflow steps ==========

    /// Check the folder and open a topic for the first approver.
    ///
    /// Returns `None` without creating anything when `approver_ids` is empty.
    pub async fn initialize_workflow(
        &self,
        folder_id: &FolderId,
        approver_ids: &[UserId],
        description: Option<&str>,
    ) -> ClientResult<Option<Topic>> {
        tracing::info!(folder_id = %folder_id, approvers = approver_ids.len(), "Initializing approval workflow");

        let folder = self.get_folder(folder_id).await.map_err(|e| {
            tracing::error!(folder_id = %folder_id, error = %e, "Approval workflow initialization failed");
            e
        })?;
        tracing::info!(folder = folder.name(), "Folder found");

        let Some(first_approver) = approver_ids.first() else {
            tracing::warn!(folder_id = %folder_id, "No approvers given, no topic created");
            return Ok(None);
        };

        let description = match description {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => default_approval_description(folder.name()),
        };
        let draft = TopicDraft::new(approval_title(folder.name()), first_approver.clone())
            .with_priority(TopicPriority::High)
            .with_description(description);

        let topic = self.create_bcf_topic(draft).await.map_err(|e| {
            tracing::error!(folder_id = %folder_id, error = %e, "Approval workflow initialization failed");
            e
        })?;

        tracing::info!(topic_id = %topic.id, approver = %first_approver, "First approver notified");
        Ok(Some(topic))
    }

    /// Resolve the current topic, then open one for the next approver.
    ///
    /// `description` is used as both title and description of the new
    /// topic. Nothing is created if the resolution fails.
    pub async fn proceed_to_next_approver(
        &self,
        current_topic_id: &TopicId,
        next_approver_id: &UserId,
        description: &str,
    ) -> ClientResult<Topic> {
        tracing::info!(topic_id = %current_topic_id, next_approver = %next_approver_id, "Moving to next approver");

        let result = async {
            self.resolve_bcf_topic(current_topic_id).await?;

            let draft = TopicDraft::new(description, next_approver_id.clone())
                .with_priority(TopicPriority::High)
                .with_description(description);
            self.create_bcf_topic(draft).await
        }
        .await;

        match result {
            Ok(topic) => {
                tracing::info!(topic_id = %topic.id, "Next approver notified");
                Ok(topic)
            }
            Err(e) => {
                tracing::error!(topic_id = %current_topic_id, error = %e, "Moving to next approver failed");
                Err(e)
            }
        }
    }

    /// Move `folder_id` into the configured approved folder
    pub async fn finalize_approval(&self, folder_id: &FolderId) -> ClientResult<Folder> {
        let name = self.config().approved_folder_name.clone();
        self.finalize_approval_into(folder_id, &name).await
    }

    /// Move `folder_id` into the first folder named exactly
    /// `approved_folder_name`, creating it top-level when missing
    pub async fn finalize_approval_into(
        &self,
        folder_id: &FolderId,
        approved_folder_name: &str,
    ) -> ClientResult<Folder> {
        tracing::info!(folder_id = %folder_id, approved_name = approved_folder_name, "Finalizing approval");

        let result = async {
            let folders = self.get_folders().await?;
            let approved = match folders.into_iter().find(|f| f.name() == approved_folder_name) {
                Some(folder) => folder,
                None => {
                    tracing::info!(folder_name = approved_folder_name, "Creating approved folder");
                    self.create_folder(None, approved_folder_name).await?
                }
            };

            self.move_folder(folder_id, &approved.id).await?;
            Ok::<_, ClientError>(approved)
        }
        .await;

        match result {
            Ok(approved) => {
                tracing::info!(folder_id = %folder_id, approved_folder = %approved.id, "Documentation moved to approved folder");
                Ok(approved)
            }
            Err(e) => {
                tracing::error!(folder_id = %folder_id, error = %e, "Finalizing approval failed");
                Err(e)
            }
        }
    }

    // ========== Process transitions ==========

    /// `NotStarted` -> awaiting the first approver.
    ///
    /// With no approvers the process comes back unchanged.
    pub async fn start_approval(
        &self,
        mut process: ApprovalProcess,
        description: Option<&str>,
    ) -> ClientResult<ApprovalProcess> {
        if !matches!(process.state, ApprovalState::NotStarted) {
            return Err(ClientError::Workflow(
                "approval process has already been started".into(),
            ));
        }

        if let Some(topic) = self
            .initialize_workflow(&process.folder_id, &process.approvers, description)
            .await?
        {
            process.state = ApprovalState::AwaitingApprover {
                topic,
                approver_index: 0,
            };
        }
        Ok(process)
    }

    /// Awaiting approver `i` -> awaiting approver `i + 1`
    pub async fn advance_approval(
        &self,
        mut process: ApprovalProcess,
        description: &str,
    ) -> ClientResult<ApprovalProcess> {
        let (topic_id, next_index) = match &process.state {
            ApprovalState::AwaitingApprover {
                topic,
                approver_index,
            } => (topic.id.clone(), approver_index + 1),
            _ => {
                return Err(ClientError::Workflow(
                    "approval process is not awaiting an approver".into(),
                ))
            }
        };

        let next_approver = process.approvers.get(next_index).cloned().ok_or_else(|| {
            ClientError::Workflow(format!(
                "no approver after position {} of {}",
                next_index,
                process.approvers.len()
            ))
        })?;

        let topic = self
            .proceed_to_next_approver(&topic_id, &next_approver, description)
            .await?;
        process.state = ApprovalState::AwaitingApprover {
            topic,
            approver_index: next_index,
        };
        Ok(process)
    }

    /// Awaiting an approver -> finalized.
    ///
    /// The open topic is left untouched.
    pub async fn finalize_process(&self, mut process: ApprovalProcess) -> ClientResult<ApprovalProcess> {
        if !matches!(process.state, ApprovalState::AwaitingApprover { .. }) {
            return Err(ClientError::Workflow(
                "only a started, unfinished approval process can be finalized".into(),
            ));
        }

        let approved_folder = self.finalize_approval(&process.folder_id).await?;
        process.state = ApprovalState::Finalized { approved_folder };
        Ok(process)
    }
}
