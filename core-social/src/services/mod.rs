//! # Feature Services
//!
//! One wrapper per API collection. Each owns a private
//! [`ResourceClient`](core_resources::ResourceClient), reachable through
//! `resource()` for the generic operations, and adds the endpoints specific
//! to its feature.
//!
//! ## Available Services
//!
//! - `PostService` - Posts, the feed and per-author listings
//! - `CommentService` - Comments on a post
//! - `ReactionService` - Reactions on a post
//! - `FollowService` - Follow relationships
//! - `NotificationService` - Notifications and their read state
//! - `ReportService` - Post reports and moderation
//! - `UserService` - Accounts, search and administrative updates

pub mod comment;
pub mod follow;
pub mod notification;
pub mod post;
pub mod reaction;
pub mod report;
pub mod user;

pub use comment::CommentService;
pub use follow::FollowService;
pub use notification::NotificationService;
pub use post::PostService;
pub use reaction::ReactionService;
pub use report::ReportService;
pub use user::UserService;

use core_resources::ResourceId;

pub(crate) fn id_filter(key: &str, id: ResourceId) -> (String, String) {
    (key.to_string(), id.to_string())
}
