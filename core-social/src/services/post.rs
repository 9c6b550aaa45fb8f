use core_resources::{ApiTransport, Page, PageRequest, ResourceClient, ResourceId};
use core_runtime::events::EventBus;

use crate::error::{Result, SocialError};
use crate::models::{Post, PostDraft};
use crate::services::id_filter;

const PATH: &str = "/posts";
const FEED_PATH: &str = "/posts/feed";

/// Posts, the personal feed and per-author listings.
#[derive(Debug)]
pub struct PostService {
    resource: ResourceClient<Post>,
}

impl PostService {
    pub fn new(transport: ApiTransport) -> Self {
        Self {
            resource: ResourceClient::new(transport, PATH, |post: &Post| post.id),
        }
    }

    pub fn with_event_bus(self, bus: EventBus) -> Self {
        Self {
            resource: self.resource.with_event_bus(bus, "posts"),
        }
    }

    pub fn resource(&self) -> &ResourceClient<Post> {
        &self.resource
    }

    /// Validate and publish a post.
    pub async fn publish(&self, draft: &PostDraft) -> Result<Post> {
        draft
            .validate()
            .map_err(|message| SocialError::invalid("content", message))?;
        Ok(self.resource.create(draft).await?)
    }

    /// Posts from followed accounts, newest first.
    pub async fn feed(&self, page: &PageRequest) -> Result<Page<Post>> {
        Ok(self.resource.list_from(FEED_PATH, page, &[]).await?)
    }

    pub async fn by_author(&self, user_id: ResourceId, page: &PageRequest) -> Result<Page<Post>> {
        Ok(self
            .resource
            .list_filtered(page, &[id_filter("authorId", user_id)])
            .await?)
    }
}
