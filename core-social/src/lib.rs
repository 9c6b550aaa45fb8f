//! # Core Social
//!
//! Feature wrappers over the generic resource client: posts, comments,
//! reactions, follows, notifications, reports and users.
//!
//! Every wrapper instance owns an isolated mirror. Two `PostService`s never
//! see each other's items.

pub mod error;
pub mod models;
pub mod services;

pub use error::{Result, SocialError};
pub use models::{
    Comment, CommentDraft, Follow, Notification, NotificationKind, Post, PostDraft, Reaction,
    ReactionKind, Report, ReportStatus, Role, User, UserUpdate, UserUpdateOutcome,
};
pub use services::{
    CommentService, FollowService, NotificationService, PostService, ReactionService,
    ReportService, UserService,
};
