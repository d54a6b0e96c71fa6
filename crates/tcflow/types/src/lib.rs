//! tcflow Types - wire data model for the Trimble Connect REST API
//!
//! Covers the resources the approval workflow touches:
//!
//! - **Folders / files**: listing, creation, re-parenting
//! - **BCF topics / comments**: one topic per pending approval
//! - **Project records**: metadata, members, organizers (read-only)
//!
//! Response records are lossless: unknown server fields go to an `extra`
//! map, missing keys stay `None`, timestamps keep their raw text and ids
//! keep their JSON scalar kind. Serializing a decoded record gives back the
//! body it was read from.

#![deny(unsafe_code)]

pub mod folder;
pub mod ids;
pub mod project;
pub mod timestamp;
pub mod topic;

pub use folder::{FileEntry, Folder, FolderMove, NewFolder};
pub use ids::{CommentId, FileId, FolderId, OrganizerId, ProjectId, TopicId, UserId};
pub use project::{Organizer, Project, ProjectMember};
pub use topic::{
    Comment, NewComment, NewTopic, Topic, TopicDraft, TopicPriority, TopicStatus, TopicUpdate,
    TOPIC_DUE_DAYS, TOPIC_TYPE_ISSUE,
};
