//! Domain models for the social API
//!
//! Field names follow the API's camelCase JSON. Timestamps are RFC 3339.

use chrono::{DateTime, Utc};
use core_resources::ResourceId;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use core_auth::Role;

/// Longest post body the API accepts.
pub const MAX_POST_LENGTH: usize = 5000;
/// Longest comment body the API accepts.
pub const MAX_COMMENT_LENGTH: usize = 1000;

// =============================================================================
// Posts
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: ResourceId,
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub author_id: ResourceId,
    #[serde(default)]
    pub author_username: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub comment_count: u64,
    #[serde(default)]
    pub reaction_count: u64,
}

/// Body of `POST /posts` and `PUT /posts/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDraft {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl PostDraft {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            image_url: None,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        validate_body(&self.content, MAX_POST_LENGTH)
    }
}

// =============================================================================
// Comments
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: ResourceId,
    pub post_id: ResourceId,
    pub author_id: ResourceId,
    #[serde(default)]
    pub author_username: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDraft {
    pub post_id: ResourceId,
    pub content: String,
}

impl CommentDraft {
    pub fn validate(&self) -> Result<(), String> {
        validate_body(&self.content, MAX_COMMENT_LENGTH)
    }
}

// =============================================================================
// Reactions
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReactionKind {
    Like,
    Love,
    Haha,
    Wow,
    Sad,
    Angry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    pub id: ResourceId,
    pub post_id: ResourceId,
    pub user_id: ResourceId,
    #[serde(rename = "type")]
    pub kind: ReactionKind,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReactionDraft {
    pub post_id: ResourceId,
    #[serde(rename = "type")]
    pub kind: ReactionKind,
}

// =============================================================================
// Follows
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Follow {
    pub id: ResourceId,
    pub follower_id: ResourceId,
    pub following_id: ResourceId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FollowDraft {
    pub following_id: ResourceId,
}

// =============================================================================
// Notifications
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NotificationKind {
    Follow,
    Comment,
    Reaction,
    Mention,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: ResourceId,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    #[serde(default, alias = "isRead")]
    pub read: bool,
    #[serde(default)]
    pub actor_id: Option<ResourceId>,
    #[serde(default)]
    pub post_id: Option<ResourceId>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Reports
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReportStatus {
    #[default]
    Pending,
    Reviewed,
    Resolved,
    Dismissed,
}

impl ReportStatus {
    /// Whether a moderator has closed the report.
    pub fn is_closed(&self) -> bool {
        matches!(self, ReportStatus::Resolved | ReportStatus::Dismissed)
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReportStatus::Pending => "PENDING",
            ReportStatus::Reviewed => "REVIEWED",
            ReportStatus::Resolved => "RESOLVED",
            ReportStatus::Dismissed => "DISMISSED",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: ResourceId,
    pub post_id: ResourceId,
    pub reporter_id: ResourceId,
    pub reason: String,
    #[serde(default)]
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReportDraft {
    pub post_id: ResourceId,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub(crate) struct ReportStatusChange {
    pub status: ReportStatus,
}

// =============================================================================
// Users
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: ResourceId,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Fields an administrator may change on any account. Unset fields are left
/// as they are.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// Response of an administrative user update.
///
/// When the change touches the caller's own account the API also returns a
/// fresh token, because the old one carries the previous username.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum UserUpdateOutcome {
    WithToken { user: User, token: String },
    User(User),
}

impl UserUpdateOutcome {
    pub fn user(&self) -> &User {
        match self {
            UserUpdateOutcome::WithToken { user, .. } | UserUpdateOutcome::User(user) => user,
        }
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            UserUpdateOutcome::WithToken { token, .. } => Some(token),
            UserUpdateOutcome::User(_) => None,
        }
    }
}

fn validate_body(content: &str, max: usize) -> Result<(), String> {
    if content.trim().is_empty() {
        return Err("content cannot be empty".to_string());
    }
    if content.chars().count() > max {
        return Err(format!("content cannot exceed {} characters", max));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_post_from_api_json() {
        let post: Post = serde_json::from_value(json!({
            "id": 7,
            "content": "hello",
            "authorId": 3,
            "authorUsername": "ada",
            "createdAt": "2024-05-01T12:00:00Z",
            "commentCount": 2
        }))
        .unwrap();

        assert_eq!(post.author_id, 3);
        assert_eq!(post.comment_count, 2);
        assert_eq!(post.reaction_count, 0);
        assert_eq!(post.updated_at, None);
    }

    #[test]
    fn test_reaction_kind_field_is_type() {
        let reaction: Reaction = serde_json::from_value(json!({
            "id": 1,
            "postId": 7,
            "userId": 3,
            "type": "LOVE",
            "createdAt": "2024-05-01T12:00:00Z"
        }))
        .unwrap();
        assert_eq!(reaction.kind, ReactionKind::Love);

        let draft = ReactionDraft {
            post_id: 7,
            kind: ReactionKind::Like,
        };
        assert_eq!(
            serde_json::to_value(draft).unwrap(),
            json!({"postId": 7, "type": "LIKE"})
        );
    }

    #[test]
    fn test_notification_accepts_is_read() {
        let notification: Notification = serde_json::from_value(json!({
            "id": 4,
            "type": "FOLLOW",
            "message": "ada followed you",
            "isRead": true,
            "createdAt": "2024-05-01T12:00:00Z"
        }))
        .unwrap();
        assert!(notification.read);
        assert_eq!(notification.kind, NotificationKind::Follow);
    }

    #[test]
    fn test_draft_validation() {
        assert!(PostDraft::new("hello").validate().is_ok());
        assert!(PostDraft::new("   ").validate().is_err());
        assert!(PostDraft::new("x".repeat(MAX_POST_LENGTH + 1)).validate().is_err());

        let comment = CommentDraft {
            post_id: 1,
            content: "x".repeat(MAX_COMMENT_LENGTH),
        };
        assert!(comment.validate().is_ok());
    }

    #[test]
    fn test_user_update_outcome_shapes() {
        let with_token: UserUpdateOutcome = serde_json::from_value(json!({
            "user": {"id": 1, "username": "ada2", "role": "ADMIN"},
            "token": "tok-2"
        }))
        .unwrap();
        assert_eq!(with_token.token(), Some("tok-2"));
        assert_eq!(with_token.user().username, "ada2");

        let plain: UserUpdateOutcome =
            serde_json::from_value(json!({"id": 2, "username": "bob"})).unwrap();
        assert_eq!(plain.token(), None);
        assert_eq!(plain.user().role, Role::User);
    }

    #[test]
    fn test_user_update_skips_unset_fields() {
        let update = UserUpdate {
            role: Some(Role::Admin),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(update).unwrap(), json!({"role": "ADMIN"}));
    }

    #[test]
    fn test_report_status() {
        assert!(ReportStatus::Dismissed.is_closed());
        assert!(!ReportStatus::default().is_closed());
        assert_eq!(ReportStatus::Resolved.to_string(), "RESOLVED");
    }
}
