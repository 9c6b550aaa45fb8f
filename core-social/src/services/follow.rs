use core_resources::{ApiTransport, DeleteConfirmation, Page, PageRequest, ResourceClient, ResourceId};
use core_runtime::events::EventBus;

use crate::error::Result;
use crate::models::{Follow, FollowDraft};
use crate::services::id_filter;

const PATH: &str = "/follows";

/// Follow relationships. Followers and followings share one mirror, so the
/// last listing wins.
#[derive(Debug)]
pub struct FollowService {
    resource: ResourceClient<Follow>,
}

impl FollowService {
    pub fn new(transport: ApiTransport) -> Self {
        Self {
            resource: ResourceClient::new(transport, PATH, |follow: &Follow| follow.id),
        }
    }

    pub fn with_event_bus(self, bus: EventBus) -> Self {
        Self {
            resource: self.resource.with_event_bus(bus, "follows"),
        }
    }

    pub fn resource(&self) -> &ResourceClient<Follow> {
        &self.resource
    }

    pub async fn follow(&self, user_id: ResourceId) -> Result<Follow> {
        Ok(self
            .resource
            .create(&FollowDraft {
                following_id: user_id,
            })
            .await?)
    }

    pub async fn unfollow(&self, follow_id: ResourceId) -> Result<DeleteConfirmation> {
        Ok(self.resource.delete(follow_id).await?)
    }

    /// Accounts following `user_id`.
    pub async fn followers(&self, user_id: ResourceId, page: &PageRequest) -> Result<Page<Follow>> {
        Ok(self
            .resource
            .list_filtered(page, &[id_filter("followingId", user_id)])
            .await?)
    }

    /// Accounts `user_id` follows.
    pub async fn following(&self, user_id: ResourceId, page: &PageRequest) -> Result<Page<Follow>> {
        Ok(self
            .resource
            .list_filtered(page, &[id_filter("followerId", user_id)])
            .await?)
    }
}
