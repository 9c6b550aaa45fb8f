//! # Resource Client
//!
//! Generic create/read/update/delete/list access to one remote collection,
//! plus a local mirror of what the server last returned.
//!
//! Every wrapper owns its own [`ResourceClient`]; mirrors are never shared.
//!
//! ## State
//!
//! - **items**: the most recently listed page, with successful creates
//!   prepended, updates replaced in place and deletes removed
//! - **current item**: the last item fetched by id or updated; cleared when
//!   that id is deleted
//! - **loading**: true while at least one request is in flight
//!
//! A failed request never touches `items` or the current item.
//!
//! ## Ordering
//!
//! Calls are not serialized. When two calls overlap, whichever response
//! settles last wins in the mirror.
//!
//! ## Example
//!
//! ```ignore
//! use core_resources::{PageRequest, ResourceClient};
//!
//! let posts = ResourceClient::new(transport, "/posts", |post: &Post| post.id);
//!
//! posts.list(&PageRequest::new(0, 20)).await?;
//! let created = posts.create(&NewPost { content: "hello".into() }).await?;
//! assert_eq!(posts.items()[0].id, created.id);
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use core_runtime::events::{CoreEvent, EventBus, ResourceEvent};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::Result;
use crate::pagination::{Page, PageRequest};
use crate::transport::ApiTransport;

/// Numeric identifier of a remote record.
pub type ResourceId = i64;

/// Returned by a successful delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteConfirmation {
    pub id: ResourceId,
}

/// Point-in-time copy of a client's state.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSnapshot<T> {
    pub items: Vec<T>,
    pub current_item: Option<T>,
    pub is_loading: bool,
}

#[derive(Debug)]
struct MirrorState<T> {
    items: Vec<T>,
    current: Option<T>,
}

impl<T> Default for MirrorState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            current: None,
        }
    }
}

/// Marks one request as in flight for as long as it lives.
///
/// Dropping the guard settles the request, including when the owning future
/// is dropped before completion.
#[must_use = "the request is only counted while the guard is alive"]
pub struct BusyGuard<'a> {
    in_flight: &'a AtomicUsize,
}

impl<'a> BusyGuard<'a> {
    fn new(in_flight: &'a AtomicUsize) -> Self {
        in_flight.fetch_add(1, Ordering::SeqCst);
        Self { in_flight }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Paginated CRUD client for a single collection.
pub struct ResourceClient<T> {
    transport: ApiTransport,
    path: String,
    id_of: fn(&T) -> ResourceId,
    state: RwLock<MirrorState<T>>,
    in_flight: AtomicUsize,
    events: Option<(EventBus, String)>,
}

impl<T> std::fmt::Debug for ResourceClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceClient")
            .field("path", &self.path)
            .field("in_flight", &self.in_flight.load(Ordering::SeqCst))
            .finish()
    }
}

impl<T> ResourceClient<T>
where
    T: DeserializeOwned + Clone,
{
    /// Create a client for the collection at `path` (e.g. `"/posts"`).
    ///
    /// `id_of` reads the identifier of an item; items are matched by this
    /// value, never by reference.
    pub fn new(transport: ApiTransport, path: impl Into<String>, id_of: fn(&T) -> ResourceId) -> Self {
        let path = format!("/{}", path.into().trim_matches('/'));
        Self {
            transport,
            path,
            id_of,
            state: RwLock::new(MirrorState::default()),
            in_flight: AtomicUsize::new(0),
            events: None,
        }
    }

    /// Publish a [`ResourceEvent`] on `bus` after each successful call.
    pub fn with_event_bus(mut self, bus: EventBus, resource_name: impl Into<String>) -> Self {
        self.events = Some((bus, resource_name.into()));
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn transport(&self) -> &ApiTransport {
        &self.transport
    }

    /// Path of a single item, `{path}/{id}`.
    pub fn item_path(&self, id: ResourceId) -> String {
        format!("{}/{}", self.path, id)
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// `POST {path}`; the returned item is prepended to the mirror.
    #[instrument(skip_all, fields(path = %self.path))]
    pub async fn create<P>(&self, payload: &P) -> Result<T>
    where
        P: Serialize + ?Sized,
    {
        let _busy = self.begin_request();
        let item: T = self.transport.post(&self.path, payload).await?;
        self.record_created(item.clone());
        Ok(item)
    }

    /// `GET {path}/{id}`; the item becomes the current item.
    #[instrument(skip(self), fields(path = %self.path))]
    pub async fn get_by_id(&self, id: ResourceId) -> Result<T> {
        let _busy = self.begin_request();
        let item: T = self.transport.get(&self.item_path(id), &[]).await?;
        self.write_state().current = Some(item.clone());
        Ok(item)
    }

    /// `PUT {path}/{id}`; the returned item replaces the current item and
    /// the mirror entry stored under `id`.
    #[instrument(skip(self, payload), fields(path = %self.path))]
    pub async fn update<P>(&self, id: ResourceId, payload: &P) -> Result<T>
    where
        P: Serialize + ?Sized,
    {
        let _busy = self.begin_request();
        let item: T = self.transport.put(&self.item_path(id), payload).await?;
        self.record_updated(id, item.clone());
        Ok(item)
    }

    /// `DELETE {path}/{id}`; removes the id from the mirror and clears the
    /// current item if it matches.
    #[instrument(skip(self), fields(path = %self.path))]
    pub async fn delete(&self, id: ResourceId) -> Result<DeleteConfirmation> {
        let _busy = self.begin_request();
        self.transport.delete(&self.item_path(id)).await?;
        self.record_deleted(id);
        Ok(DeleteConfirmation { id })
    }

    /// `GET {path}?page=&size=&sort=`; the page content replaces the mirror.
    pub async fn list(&self, params: &PageRequest) -> Result<Page<T>> {
        self.list_from(&self.path, params, &[]).await
    }

    /// Like [`list`](Self::list) with extra query pairs such as `postId`.
    pub async fn list_filtered(
        &self,
        params: &PageRequest,
        filters: &[(String, String)],
    ) -> Result<Page<T>> {
        self.list_from(&self.path, params, filters).await
    }

    /// List from another endpoint returning the same item type, e.g.
    /// `/posts/feed`. The page content replaces the mirror.
    #[instrument(skip(self, params, filters), fields(page = params.page, size = params.size))]
    pub async fn list_from(
        &self,
        path: &str,
        params: &PageRequest,
        filters: &[(String, String)],
    ) -> Result<Page<T>> {
        let _busy = self.begin_request();

        let mut query = params.query_pairs();
        query.extend(filters.iter().cloned());

        let page: Page<T> = self.transport.get(path, &query).await?;
        let count = page.content.len();
        self.write_state().items = page.content.clone();

        debug!(count, total = page.total_elements, "Mirror replaced with page");
        self.emit(|resource| ResourceEvent::Listed { resource, count });
        Ok(page)
    }

    // ------------------------------------------------------------------
    // Read-only views
    // ------------------------------------------------------------------

    pub fn items(&self) -> Vec<T> {
        self.read_state().items.clone()
    }

    pub fn current_item(&self) -> Option<T> {
        self.read_state().current.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub fn snapshot(&self) -> ResourceSnapshot<T> {
        let state = self.read_state();
        ResourceSnapshot {
            items: state.items.clone(),
            current_item: state.current.clone(),
            is_loading: self.is_loading(),
        }
    }

    /// Find a mirrored item by id.
    pub fn find(&self, id: ResourceId) -> Option<T> {
        self.read_state()
            .items
            .iter()
            .find(|item| (self.id_of)(item) == id)
            .cloned()
    }

    // ------------------------------------------------------------------
    // Mirror mutators
    //
    // Used by the operations above and by wrappers whose endpoints return
    // a created or updated item from a non-standard path.
    // ------------------------------------------------------------------

    /// Count a wrapper-issued request towards [`is_loading`](Self::is_loading).
    pub fn begin_request(&self) -> BusyGuard<'_> {
        BusyGuard::new(&self.in_flight)
    }

    pub fn record_created(&self, item: T) {
        let id = (self.id_of)(&item);
        self.write_state().items.insert(0, item);
        debug!(id, "Prepended created item");
        self.emit(|resource| ResourceEvent::Created { resource, id });
    }

    /// Replace the mirror entry stored under `id`, which is the id the update
    /// was requested for and not necessarily the id the server echoed back.
    pub fn record_updated(&self, id: ResourceId, item: T) {
        {
            let mut state = self.write_state();
            if let Some(slot) = state.items.iter_mut().find(|existing| (self.id_of)(existing) == id) {
                *slot = item.clone();
            }
            state.current = Some(item);
        }
        debug!(id, "Applied updated item");
        self.emit(|resource| ResourceEvent::Updated { resource, id });
    }

    pub fn record_deleted(&self, id: ResourceId) {
        {
            let mut state = self.write_state();
            let id_of = self.id_of;
            state.items.retain(|item| id_of(item) != id);
            if state.current.as_ref().map(id_of) == Some(id) {
                state.current = None;
            }
        }
        debug!(id, "Removed deleted item");
        self.emit(|resource| ResourceEvent::Deleted { resource, id });
    }

    /// Empty the mirror and the current item.
    pub fn clear(&self) {
        *self.write_state() = MirrorState::default();
    }

    fn emit(&self, event: impl FnOnce(String) -> ResourceEvent) {
        if let Some((bus, resource)) = &self.events {
            // No subscribers is not an error.
            let _ = bus.emit(CoreEvent::Resource(event(resource.clone())));
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, MirrorState<T>> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, MirrorState<T>> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
