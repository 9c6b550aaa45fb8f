use core_resources::{ApiTransport, Page, PageRequest, ResourceClient, ResourceId};
use core_runtime::events::EventBus;

use crate::error::{Result, SocialError};
use crate::models::{Comment, CommentDraft};
use crate::services::id_filter;

const PATH: &str = "/comments";

#[derive(Debug)]
pub struct CommentService {
    resource: ResourceClient<Comment>,
}

impl CommentService {
    pub fn new(transport: ApiTransport) -> Self {
        Self {
            resource: ResourceClient::new(transport, PATH, |comment: &Comment| comment.id),
        }
    }

    pub fn with_event_bus(self, bus: EventBus) -> Self {
        Self {
            resource: self.resource.with_event_bus(bus, "comments"),
        }
    }

    pub fn resource(&self) -> &ResourceClient<Comment> {
        &self.resource
    }

    pub async fn add(&self, post_id: ResourceId, content: impl Into<String>) -> Result<Comment> {
        let draft = CommentDraft {
            post_id,
            content: content.into(),
        };
        draft
            .validate()
            .map_err(|message| SocialError::invalid("content", message))?;
        Ok(self.resource.create(&draft).await?)
    }

    pub async fn for_post(&self, post_id: ResourceId, page: &PageRequest) -> Result<Page<Comment>> {
        Ok(self
            .resource
            .list_filtered(page, &[id_filter("postId", post_id)])
            .await?)
    }
}
