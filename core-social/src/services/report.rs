use core_resources::{ApiTransport, ResourceClient, ResourceId};
use core_runtime::events::EventBus;

use crate::error::{Result, SocialError};
use crate::models::{Report, ReportDraft, ReportStatus, ReportStatusChange};

const PATH: &str = "/reports";

/// Post reports. Filing is open to everyone, resolving to moderators.
#[derive(Debug)]
pub struct ReportService {
    resource: ResourceClient<Report>,
}

impl ReportService {
    pub fn new(transport: ApiTransport) -> Self {
        Self {
            resource: ResourceClient::new(transport, PATH, |report: &Report| report.id),
        }
    }

    pub fn with_event_bus(self, bus: EventBus) -> Self {
        Self {
            resource: self.resource.with_event_bus(bus, "reports"),
        }
    }

    pub fn resource(&self) -> &ResourceClient<Report> {
        &self.resource
    }

    pub async fn file(&self, post_id: ResourceId, reason: impl Into<String>) -> Result<Report> {
        let reason = reason.into();
        if reason.trim().is_empty() {
            return Err(SocialError::invalid("reason", "reason cannot be empty"));
        }
        Ok(self.resource.create(&ReportDraft { post_id, reason }).await?)
    }

    pub async fn resolve(&self, id: ResourceId, status: ReportStatus) -> Result<Report> {
        Ok(self
            .resource
            .update(id, &ReportStatusChange { status })
            .await?)
    }
}
