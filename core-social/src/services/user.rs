use core_auth::SessionManager;
use core_resources::{ApiTransport, Page, PageRequest, ResourceClient, ResourceId};
use core_runtime::events::EventBus;
use tracing::{instrument, warn};

use crate::error::{Result, SocialError};
use crate::models::{User, UserUpdate, UserUpdateOutcome};

const PATH: &str = "/users";
const SEARCH_PATH: &str = "/users/search";

#[derive(Debug)]
pub struct UserService {
    resource: ResourceClient<User>,
    session: Option<SessionManager>,
}

impl UserService {
    pub fn new(transport: ApiTransport) -> Self {
        Self {
            resource: ResourceClient::new(transport, PATH, |user: &User| user.id),
            session: None,
        }
    }

    pub fn with_event_bus(self, bus: EventBus) -> Self {
        Self {
            resource: self.resource.with_event_bus(bus, "users"),
            session: self.session,
        }
    }

    /// Session that receives tokens issued by [`admin_update`](Self::admin_update).
    pub fn with_session(mut self, session: SessionManager) -> Self {
        self.session = Some(session);
        self
    }

    pub fn resource(&self) -> &ResourceClient<User> {
        &self.resource
    }

    pub async fn search(&self, query: &str, page: &PageRequest) -> Result<Page<User>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SocialError::invalid("query", "search query cannot be empty"));
        }
        Ok(self
            .resource
            .list_from(SEARCH_PATH, page, &[("query".to_string(), query.to_string())])
            .await?)
    }

    /// `PUT /users/{id}` as an administrator.
    ///
    /// The returned user is applied like [`ResourceClient::update`]. A token
    /// in the response replaces the session token first; if it cannot be
    /// stored the call fails and the mirror is left as it was.
    #[instrument(skip(self, payload))]
    pub async fn admin_update(&self, id: ResourceId, payload: &UserUpdate) -> Result<UserUpdateOutcome> {
        let outcome: UserUpdateOutcome = {
            let _busy = self.resource.begin_request();
            self.resource
                .transport()
                .put(&self.resource.item_path(id), payload)
                .await?
        };

        if let Some(token) = outcome.token() {
            match &self.session {
                Some(session) => session.replace_token(token.to_string()).await?,
                None => warn!("Received a replacement token but no session is attached"),
            }
        }
        self.resource.record_updated(id, outcome.user().clone());
        Ok(outcome)
    }
}
