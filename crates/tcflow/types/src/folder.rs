//! Folders and file metadata

use crate::{FileId, FolderId};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A project folder
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    /// Folder id
    pub id: FolderId,
    /// Display name, when the server sent one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Outer `None`: no `parentId` key. `Some(None)`: explicit `null`
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_id: Option<Option<FolderId>>,
    /// Any other fields the server returned
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Folder {
    /// Display name, empty when missing
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    pub fn parent(&self) -> Option<&FolderId> {
        self.parent_id.as_ref().and_then(Option::as_ref)
    }

    pub fn is_top_level(&self) -> bool {
        self.parent().is_none()
    }
}

/// Keeps a present `null` apart from a missing key
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// File metadata listed inside a folder
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    /// File id
    pub id: FileId,
    /// File name, when the server sent one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Size, version and the other server fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of a folder creation request
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFolder {
    /// Name of the new folder
    pub name: String,
    /// Serialized as `null` for a top-level folder
    pub parent_id: Option<FolderId>,
}

/// Body of a folder move (re-parent) request
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderMove {
    /// Destination folder
    pub parent_id: FolderId,
}
