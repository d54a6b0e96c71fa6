//! Read-only project records: metadata, members, organizers

use crate::{FolderId, OrganizerId, ProjectId, UserId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Project metadata
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Project id
    pub id: ProjectId,
    /// Project name, when the server sent one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Root folder of the project, when the server reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_id: Option<FolderId>,
    /// Any other fields the server returned
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A member of the current project
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMember {
    /// User id, usable as a topic assignee
    pub id: UserId,
    /// Login email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Given name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Family name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Project role, e.g. `ADMIN` or `USER`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Any other fields the server returned
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Project {
    /// Project name, empty when missing
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

impl ProjectMember {
    /// "First Last", falling back to the email and then the id
    pub fn display_name(&self) -> String {
        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if !full.is_empty() {
            full
        } else if let Some(email) = &self.email {
            email.clone()
        } else {
            self.id.to_string()
        }
    }
}

/// A hierarchical organizer node attached to a folder
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organizer {
    /// Organizer node id
    pub id: OrganizerId,
    /// Node label, when the server sent one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Children, parent link and the other server fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
