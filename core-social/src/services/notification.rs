use bridge_traits::http::HttpMethod;
use core_resources::{ApiTransport, ResourceClient, ResourceId};
use core_runtime::events::EventBus;
use serde::Deserialize;
use tracing::instrument;

use crate::error::Result;
use crate::models::Notification;

const PATH: &str = "/notifications";
const UNREAD_COUNT_PATH: &str = "/notifications/unread-count";

/// The API answers the unread count either bare or wrapped in an object.
#[derive(Deserialize)]
#[serde(untagged)]
enum CountBody {
    Bare(u64),
    Wrapped { count: u64 },
}

#[derive(Debug)]
pub struct NotificationService {
    resource: ResourceClient<Notification>,
}

impl NotificationService {
    pub fn new(transport: ApiTransport) -> Self {
        Self {
            resource: ResourceClient::new(transport, PATH, |n: &Notification| n.id),
        }
    }

    pub fn with_event_bus(self, bus: EventBus) -> Self {
        Self {
            resource: self.resource.with_event_bus(bus, "notifications"),
        }
    }

    pub fn resource(&self) -> &ResourceClient<Notification> {
        &self.resource
    }

    /// `PUT /notifications/{id}/read`; the returned notification is applied
    /// like an update.
    #[instrument(skip(self))]
    pub async fn mark_read(&self, id: ResourceId) -> Result<Notification> {
        let _busy = self.resource.begin_request();
        let path = format!("{}/read", self.resource.item_path(id));
        let notification: Notification = self
            .resource
            .transport()
            .send_json(HttpMethod::Put, &path, &[], None::<&()>)
            .await?;
        self.resource.record_updated(id, notification.clone());
        Ok(notification)
    }

    pub async fn unread_count(&self) -> Result<u64> {
        let _busy = self.resource.begin_request();
        let body: CountBody = self.resource.transport().get(UNREAD_COUNT_PATH, &[]).await?;
        Ok(match body {
            CountBody::Bare(count) | CountBody::Wrapped { count } => count,
        })
    }
}
