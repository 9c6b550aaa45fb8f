use core_resources::{ApiTransport, Page, PageRequest, ResourceClient, ResourceId};
use core_runtime::events::EventBus;

use crate::error::Result;
use crate::models::{Reaction, ReactionDraft, ReactionKind};
use crate::services::id_filter;

const PATH: &str = "/reactions";

#[derive(Debug)]
pub struct ReactionService {
    resource: ResourceClient<Reaction>,
}

impl ReactionService {
    pub fn new(transport: ApiTransport) -> Self {
        Self {
            resource: ResourceClient::new(transport, PATH, |reaction: &Reaction| reaction.id),
        }
    }

    pub fn with_event_bus(self, bus: EventBus) -> Self {
        Self {
            resource: self.resource.with_event_bus(bus, "reactions"),
        }
    }

    pub fn resource(&self) -> &ResourceClient<Reaction> {
        &self.resource
    }

    pub async fn for_post(&self, post_id: ResourceId, page: &PageRequest) -> Result<Page<Reaction>> {
        Ok(self
            .resource
            .list_filtered(page, &[id_filter("postId", post_id)])
            .await?)
    }

    /// React to a post. The new reaction is prepended to the mirror.
    pub async fn react(&self, post_id: ResourceId, kind: ReactionKind) -> Result<Reaction> {
        Ok(self.resource.create(&ReactionDraft { post_id, kind }).await?)
    }
}
