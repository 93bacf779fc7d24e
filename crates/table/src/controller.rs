//! Remote table controller.
//!
//! One controller per mounted table. It owns the query state, stamps every
//! fetch with the query version active at dispatch, and only applies a
//! response whose version is still the latest. Writes are single-flight per
//! kind with a reject policy: a second create/update/delete while one of the
//! same kind is pending fails with [`TableError::Busy`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use serde_json::Value;

use crate::client::RestClient;
use crate::descriptor::{ResourceDescriptor, UpdateMethod};
use crate::error::{RemoteError, TableError};
use crate::page::{Record, ResultPage};
use crate::query::{query_pairs, QueryPatch, TableQuery};

/// What happened to the visible state after a fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchOutcome {
    /// The query did not change; nothing was sent.
    Unchanged,
    /// The response became the visible page.
    Applied,
    /// A newer query superseded this one; the response was dropped.
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl MutationKind {
    fn slot(self) -> usize {
        match self {
            MutationKind::Create => 0,
            MutationKind::Update => 1,
            MutationKind::Delete => 2,
        }
    }
}

impl core::fmt::Display for MutationKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            MutationKind::Create => "create",
            MutationKind::Update => "update",
            MutationKind::Delete => "delete",
        })
    }
}

/// Snapshot of what the table currently shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView {
    pub query: TableQuery,
    /// Latest query version (bumped on every state change).
    pub version: u64,
    pub rows: Vec<Record>,
    pub total: u64,
    /// A fetch for the latest version has not settled yet.
    pub loading: bool,
    /// Last read or refetch failure for the latest version.
    pub last_error: Option<String>,
}

impl TableView {
    pub fn page_count(&self) -> u32 {
        self.query.page_count(self.total)
    }

    pub fn has_next_page(&self) -> bool {
        self.query.page < self.page_count()
    }
}

#[derive(Debug, Default)]
struct TableState {
    query: TableQuery,
    version: u64,
    rows: Vec<Record>,
    total: u64,
    loading: bool,
    last_error: Option<String>,
}

impl TableState {
    fn bump(&mut self) -> (u64, TableQuery) {
        self.version += 1;
        self.loading = true;
        (self.version, self.query.clone())
    }
}

#[derive(Debug, Default)]
struct InFlight {
    slots: [AtomicBool; 3],
}

impl InFlight {
    fn acquire(&self, kind: MutationKind) -> Result<MutationSlot<'_>, TableError> {
        let flag = &self.slots[kind.slot()];
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| TableError::Busy(kind))?;
        Ok(MutationSlot { flag })
    }

    fn is_busy(&self, kind: MutationKind) -> bool {
        self.slots[kind.slot()].load(Ordering::Acquire)
    }
}

/// Held for the duration of a write; released on drop, including when the
/// caller abandons the future.
struct MutationSlot<'a> {
    flag: &'a AtomicBool,
}

impl Drop for MutationSlot<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Binds a [`ResourceDescriptor`] to live query state and mediates its traffic.
pub struct TableController {
    descriptor: ResourceDescriptor,
    client: Arc<dyn RestClient>,
    state: Mutex<TableState>,
    in_flight: InFlight,
}

impl core::fmt::Debug for TableController {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TableController")
            .field("resource", &self.descriptor.name)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl TableController {
    pub fn new(descriptor: ResourceDescriptor, client: Arc<dyn RestClient>) -> Self {
        Self::with_query(descriptor, client, TableQuery::default())
    }

    pub fn with_query(
        descriptor: ResourceDescriptor,
        client: Arc<dyn RestClient>,
        query: TableQuery,
    ) -> Self {
        Self {
            descriptor,
            client,
            state: Mutex::new(TableState {
                query,
                ..TableState::default()
            }),
            in_flight: InFlight::default(),
        }
    }

    pub fn descriptor(&self) -> &ResourceDescriptor {
        &self.descriptor
    }

    fn lock(&self) -> MutexGuard<'_, TableState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn view(&self) -> TableView {
        let state = self.lock();
        TableView {
            query: state.query.clone(),
            version: state.version,
            rows: state.rows.clone(),
            total: state.total,
            loading: state.loading,
            last_error: state.last_error.clone(),
        }
    }

    pub fn query(&self) -> TableQuery {
        self.lock().query.clone()
    }

    pub fn version(&self) -> u64 {
        self.lock().version
    }

    pub fn is_busy(&self, kind: MutationKind) -> bool {
        self.in_flight.is_busy(kind)
    }

    /// Merge `patch` into the query state and fetch the result.
    ///
    /// A patch that leaves the state unchanged does not bump the version.
    pub async fn set_query(&self, patch: QueryPatch) -> Result<FetchOutcome, TableError> {
        if patch.is_empty() {
            return Ok(FetchOutcome::Unchanged);
        }

        let (version, query) = {
            let mut state = self.lock();
            let next = state.query.merged(&patch);
            if next == state.query {
                return Ok(FetchOutcome::Unchanged);
            }
            state.query = next;
            state.bump()
        };

        self.run_fetch(version, query).await
    }

    /// Sort by `field`: same field reverses direction, a new one starts ascending.
    ///
    /// Fields that are not sortable columns leave the state alone.
    pub async fn toggle_sort(&self, field: &str) -> Result<FetchOutcome, TableError> {
        if self.descriptor.sortable_column(field).is_none() {
            tracing::debug!(resource = %self.descriptor.name, field, "ignoring sort on non-sortable field");
            return Ok(FetchOutcome::Unchanged);
        }

        let sort = self.lock().query.toggled_sort(field);
        self.set_query(QueryPatch::sort(sort.field, sort.dir)).await
    }

    /// Refetch at the current query state.
    pub async fn refresh(&self) -> Result<FetchOutcome, TableError> {
        let (version, query) = self.lock().bump();
        self.run_fetch(version, query).await
    }

    /// Read one page without touching controller state.
    pub async fn fetch_page(&self, query: &TableQuery) -> Result<ResultPage, RemoteError> {
        let params = query_pairs(&self.descriptor, query);
        let body = self.client.get(&self.descriptor.base_path, &params).await?;
        ResultPage::from_value(body)
    }

    async fn run_fetch(&self, version: u64, query: TableQuery) -> Result<FetchOutcome, TableError> {
        tracing::debug!(
            resource = %self.descriptor.name,
            version,
            page = query.page,
            "dispatching fetch"
        );

        let result = self.fetch_page(&query).await;

        let mut state = self.lock();
        if state.version != version {
            tracing::debug!(
                resource = %self.descriptor.name,
                version,
                latest = state.version,
                "discarding stale response"
            );
            return Ok(FetchOutcome::Stale);
        }

        state.loading = false;
        match result {
            Ok(page) => {
                state.rows = page.data;
                state.total = page.total;
                state.last_error = None;
                Ok(FetchOutcome::Applied)
            }
            Err(e) => {
                tracing::warn!(resource = %self.descriptor.name, version, "fetch failed: {e}");
                state.last_error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Refetch after a confirmed write; failures stay visible in the view.
    ///
    /// After a delete the page is clamped to the last page that still exists.
    async fn invalidate(&self, removed: Option<&str>) {
        let (version, query) = {
            let mut state = self.lock();
            if let Some(id) = removed {
                let visible = state
                    .rows
                    .iter()
                    .any(|r| self.descriptor.record_id(r).as_deref() == Some(id));
                let remaining = state.total.saturating_sub(1);
                let last_page = state.query.page_count(remaining).max(1);
                if state.query.page > last_page {
                    tracing::debug!(
                        resource = %self.descriptor.name,
                        from = state.query.page,
                        to = last_page,
                        visible,
                        "clamping page after delete"
                    );
                    state.query.page = last_page;
                }
            }
            state.bump()
        };

        if let Err(e) = self.run_fetch(version, query).await {
            tracing::warn!(resource = %self.descriptor.name, "refetch after write failed: {e}");
        }
    }

    fn writable(&self, kind: MutationKind) -> Result<(), TableError> {
        if self.descriptor.read_only {
            return Err(TableError::ReadOnly {
                resource: self.descriptor.name.clone(),
                kind,
            });
        }
        Ok(())
    }

    fn record_path(&self, id: &str) -> Result<String, TableError> {
        self.descriptor
            .record_path(id)
            .ok_or_else(|| TableError::InvalidId(id.to_string()))
    }

    /// Create a record; returns the server's representation.
    pub async fn create(&self, payload: Value) -> Result<Value, TableError> {
        self.writable(MutationKind::Create)?;
        let created = {
            let _slot = self.in_flight.acquire(MutationKind::Create)?;
            self.client
                .post(&self.descriptor.base_path, &payload)
                .await
                .inspect_err(|e| {
                    tracing::warn!(resource = %self.descriptor.name, "create failed: {e}")
                })?
        };

        self.invalidate(None).await;
        Ok(created)
    }

    /// Update record `id`; returns the server's representation.
    pub async fn update(&self, id: &str, payload: Value) -> Result<Value, TableError> {
        self.writable(MutationKind::Update)?;
        let path = self.record_path(id)?;
        let updated = {
            let _slot = self.in_flight.acquire(MutationKind::Update)?;
            let result = match self.descriptor.update_method {
                UpdateMethod::Put => self.client.put(&path, &payload).await,
                UpdateMethod::Patch => self.client.patch(&path, &payload).await,
            };
            result.inspect_err(|e| {
                tracing::warn!(resource = %self.descriptor.name, id, "update failed: {e}")
            })?
        };

        self.invalidate(None).await;
        Ok(updated)
    }

    /// Delete record `id`.
    ///
    /// When the current page no longer exists afterwards, the table moves to
    /// the new last page before refetching.
    pub async fn remove(&self, id: &str) -> Result<(), TableError> {
        self.writable(MutationKind::Delete)?;
        let path = self.record_path(id)?;
        {
            let _slot = self.in_flight.acquire(MutationKind::Delete)?;
            self.client.delete(&path).await.inspect_err(|e| {
                tracing::warn!(resource = %self.descriptor.name, id, "delete failed: {e}")
            })?;
        }

        self.invalidate(Some(id)).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutation_slot_is_released_on_drop() {
        let in_flight = InFlight::default();
        {
            let _slot = in_flight.acquire(MutationKind::Delete).unwrap();
            assert!(in_flight.is_busy(MutationKind::Delete));
            assert_eq!(
                in_flight.acquire(MutationKind::Delete).err(),
                Some(TableError::Busy(MutationKind::Delete))
            );
            // Other kinds are independent.
            assert!(in_flight.acquire(MutationKind::Create).is_ok());
        }
        assert!(!in_flight.is_busy(MutationKind::Delete));
        assert!(in_flight.acquire(MutationKind::Delete).is_ok());
    }

    #[test]
    fn view_pagination_helpers() {
        let view = TableView {
            query: TableQuery::default(),
            version: 1,
            rows: Vec::new(),
            total: 25,
            loading: false,
            last_error: None,
        };
        assert_eq!(view.page_count(), 3);
        assert!(view.has_next_page());
    }
}
