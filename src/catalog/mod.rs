//! Catalog state synchronizer.
//!
//! [`Catalog`] owns everything the handlers mutate: the four collections and
//! their page cursors, the active form with its cascades, and the search
//! overlay. Every operation leaves that state consistent before returning,
//! and reports user-facing outcomes as [`Notice`]s rather than printing.

pub mod cascade;
pub mod form;
pub mod paginator;
pub mod search;
pub mod store;

#[cfg(test)]
pub(crate) mod fake;

use std::time::{Duration, Instant};

use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::api::{ApiError, ApiResponse, Gateway};
use crate::models::{EntityKind, Id, Record};

use cascade::{Level, SelectOption};
use form::{EditingContext, FormError, FormState};
use search::SearchState;
use store::{Collection, EntityStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// No form was open.
    NoForm,
    /// Required fields missing; nothing was sent.
    Invalid(FormError),
    Saved,
    /// The server answered `success: false`.
    Rejected,
    /// The request itself failed.
    Failed,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("{0}")]
    Rejected(String),
}

pub struct Catalog<G> {
    gateway: G,
    page_size: usize,
    store: EntityStore,
    editing: EditingContext,
    search: SearchState,
    movement_type_options: Vec<SelectOption>,
    notices: Vec<Notice>,
}

impl<G: Gateway> Catalog<G> {
    pub fn new(gateway: G, page_size: usize, search_delay: Duration) -> Self {
        Self {
            gateway,
            page_size: page_size.max(1),
            store: EntityStore::default(),
            editing: EditingContext::default(),
            search: SearchState::new(search_delay),
            movement_type_options: Vec::new(),
            notices: Vec::new(),
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn collection(&self, kind: EntityKind) -> &Collection {
        self.store.get(kind)
    }

    pub fn editing(&self) -> &EditingContext {
        &self.editing
    }

    pub fn form(&self) -> Option<&FormState> {
        self.editing.form()
    }

    pub fn search(&self) -> &SearchState {
        &self.search
    }

    pub fn movement_type_options(&self) -> &[SelectOption] {
        &self.movement_type_options
    }

    /// Drain notices produced since the last call.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push(Notice {
            level,
            message: message.into(),
        });
    }

    // ── Loading ──────────────────────────────────────────────

    /// Movement-type options plus page 1 of every collection.
    pub fn load_initial(&mut self) {
        self.load_select_options();
        for kind in EntityKind::ALL {
            self.fetch_page(kind, 1);
        }
    }

    /// Reload the movement-type list feeding every form's root select.
    pub fn load_select_options(&mut self) -> bool {
        let action = EntityKind::MovementType.actions().list;
        let options = match self.gateway.call(action, json!({})) {
            Ok(mut resp) if resp.success => {
                serde_json::from_value::<Option<Vec<SelectOption>>>(resp.take_data())
                    .map(Option::unwrap_or_default)
                    .map_err(|e| e.to_string())
            }
            Ok(resp) => Err(resp.message.unwrap_or_else(|| "request rejected".into())),
            Err(e) => Err(e.to_string()),
        };

        match options {
            Ok(options) => {
                debug!(count = options.len(), "loaded movement type options");
                self.movement_type_options = options;
                if let Some(form) = self.editing.form_mut() {
                    form.chain.set_root_options(self.movement_type_options.clone());
                }
                true
            }
            Err(e) => {
                error!("Error loading select options: {e}");
                self.notify(NoticeLevel::Error, "Error loading options");
                false
            }
        }
    }

    /// Fetch `page` of `kind` and replace what the table shows.
    pub fn fetch_page(&mut self, kind: EntityKind, page: usize) -> bool {
        let page = page.max(1);
        let params = json!({ "page": page, "limit": self.page_size });
        let page_size = self.page_size;

        match self.gateway.call(kind.actions().list, params) {
            Ok(mut resp) if resp.success => match Record::decode_rows(kind, resp.take_data()) {
                Ok(rows) => {
                    debug!(%kind, page, rows = rows.len(), total = ?resp.total, "fetched page");
                    self.store
                        .get_mut(kind)
                        .apply_page(page, rows, resp.total, page_size);
                    true
                }
                Err(e) => {
                    warn!(%kind, page, "Error decoding page: {e}");
                    self.store.get_mut(kind).apply_failure(page);
                    self.notify(NoticeLevel::Error, format!("Error loading {kind}"));
                    false
                }
            },
            Ok(resp) => {
                warn!(%kind, page, message = ?resp.message, "page request rejected");
                self.store.get_mut(kind).apply_rejected(page);
                false
            }
            Err(e) => {
                warn!(%kind, page, "Error fetching page: {e}");
                self.store.get_mut(kind).apply_failure(page);
                self.notify(NoticeLevel::Error, format!("Error loading {kind}"));
                false
            }
        }
    }

    /// Refetch the current page of `kind`.
    pub fn refresh(&mut self, kind: EntityKind) -> bool {
        let page = self.store.get(kind).cursor().page;
        self.fetch_page(kind, page)
    }

    /// Fetch a single record by id.
    pub fn fetch_record(&self, kind: EntityKind, id: &Id) -> Result<Record, FetchError> {
        let mut resp = self.gateway.call(kind.actions().get, json!({ "id": id }))?;
        if !resp.success {
            return Err(FetchError::Rejected(
                resp.message
                    .unwrap_or_else(|| format!("{} {id} not found", kind.singular())),
            ));
        }
        Record::decode(kind, resp.take_data()).map_err(|e| ApiError::Decode(e.to_string()).into())
    }

    /// Children of `parent` one level below `level`.
    pub fn lookup_children(&self, level: Level, parent: &Id) -> Option<Vec<SelectOption>> {
        cascade::fetch_children(&self.gateway, level, parent)
    }

    // ── Pagination ───────────────────────────────────────────

    pub fn next_page(&mut self, kind: EntityKind) -> bool {
        self.step_page(kind, 1)
    }

    pub fn prev_page(&mut self, kind: EntityKind) -> bool {
        self.step_page(kind, -1)
    }

    fn step_page(&mut self, kind: EntityKind, delta: isize) -> bool {
        let collection = self.store.get(kind);
        if collection.in_search() {
            return false;
        }
        match collection.cursor().step(delta, self.page_size) {
            Some(target) => self.fetch_page(kind, target),
            None => false,
        }
    }

    /// Jump to `page`; out-of-range requests are ignored.
    pub fn goto_page(&mut self, kind: EntityKind, page: usize) -> bool {
        let collection = self.store.get(kind);
        if collection.in_search() {
            return false;
        }
        match collection.cursor().clamp_target(page, self.page_size) {
            Some(target) => self.fetch_page(kind, target),
            None => false,
        }
    }

    // ── Forms ────────────────────────────────────────────────

    /// Open a blank form of `kind`, replacing any open form.
    pub fn open_form(&mut self, kind: EntityKind) {
        let form = self.editing.open(kind);
        form.chain.set_root_options(self.movement_type_options.clone());
        if kind.cascade_depth() > 0 {
            self.load_select_options();
        }
    }

    pub fn hide_form(&mut self) {
        self.editing.clear();
    }

    /// Open the form of `kind` filled with record `id`.
    pub fn load_for_edit(&mut self, kind: EntityKind, id: Id) -> bool {
        self.editing.open(kind);
        let record = match self.fetch_record(kind, &id) {
            Ok(record) => record,
            Err(e) => {
                warn!(%kind, %id, "Error loading data for edit: {e}");
                self.editing.clear();
                self.notify(NoticeLevel::Error, "Error loading data for editing");
                return false;
            }
        };

        if kind.cascade_depth() > 0 && self.movement_type_options.is_empty() {
            self.load_select_options();
        }
        if let Some(form) = self.editing.form_mut() {
            form.name = record.name().to_string();
            form.chain.set_root_options(self.movement_type_options.clone());
            form.chain.hydrate(&self.gateway, &record.parent_ids());
        }
        self.editing.set_editing(id);
        true
    }

    pub fn set_form_name(&mut self, name: impl Into<String>) {
        if let Some(form) = self.editing.form_mut() {
            form.name = name.into();
        }
    }

    /// Change cascade level `index` of the open form.
    pub fn change_select(&mut self, index: usize, value: Option<Id>) -> bool {
        match self.editing.form_mut() {
            Some(form) => form.chain.on_parent_changed(&self.gateway, index, value),
            None => false,
        }
    }

    /// Create or update from the open form.
    pub fn submit(&mut self) -> SubmitOutcome {
        let checked = match self.editing.form() {
            Some(form) => form.validate().map(|()| (form.kind(), form.to_params())),
            None => return SubmitOutcome::NoForm,
        };
        let (kind, mut params) = match checked {
            Ok(ready) => ready,
            Err(e) => {
                debug!("form validation failed: {e}");
                self.notify(
                    NoticeLevel::Error,
                    "Please complete all required fields",
                );
                return SubmitOutcome::Invalid(e);
            }
        };

        let action = match self.editing.editing_id() {
            Some(id) => {
                params.insert("id".into(), json!(id));
                kind.actions().update
            }
            None => kind.actions().create,
        };

        match self.gateway.call(action, Value::Object(params)) {
            Ok(resp) if resp.success => {
                info!(action, "saved {}", kind.singular());
                self.notify(
                    NoticeLevel::Success,
                    resp.message.unwrap_or_else(|| "Data saved".into()),
                );
                self.editing.clear();
                self.fetch_page(kind, 1);
                if kind == EntityKind::MovementType {
                    self.load_select_options();
                }
                SubmitOutcome::Saved
            }
            Ok(resp) => {
                warn!(action, message = ?resp.message, "save rejected");
                self.notify(
                    NoticeLevel::Error,
                    resp.message.unwrap_or_else(|| "Error saving data".into()),
                );
                SubmitOutcome::Rejected
            }
            Err(e) => {
                error!(action, "Error saving data: {e}");
                self.notify(NoticeLevel::Error, "Error saving data");
                SubmitOutcome::Failed
            }
        }
    }

    /// Delete record `id` of `kind` and refetch the current page.
    pub fn delete(&mut self, kind: EntityKind, id: &Id) -> bool {
        let action = kind.actions().delete;
        match self.gateway.call(action, json!({ "id": id })) {
            Ok(resp) if resp.success => {
                info!(action, %id, "deleted {}", kind.singular());
                self.notify(
                    NoticeLevel::Success,
                    resp.message.unwrap_or_else(|| "Record deleted".into()),
                );
                if self.editing.active_kind() == Some(kind) && self.editing.editing_id() == Some(id) {
                    self.editing.clear();
                }
                self.refresh(kind);
                if kind == EntityKind::MovementType {
                    self.load_select_options();
                }
                true
            }
            Ok(resp) => {
                warn!(action, %id, message = ?resp.message, "delete rejected");
                self.notify(
                    NoticeLevel::Error,
                    resp.message.unwrap_or_else(|| "Error deleting data".into()),
                );
                false
            }
            Err(e) => {
                error!(action, %id, "Error deleting data: {e}");
                self.notify(NoticeLevel::Error, "Error deleting data");
                false
            }
        }
    }

    // ── Search ───────────────────────────────────────────────

    /// Record search input; it is applied once the debounce delay passes.
    pub fn queue_search(&mut self, input: &str, now: Instant) {
        self.search.debouncer().schedule(input, now);
    }

    /// Apply queued search input if its delay has elapsed.
    pub fn poll_search(&mut self, now: Instant) -> bool {
        match self.search.debouncer().poll(now) {
            Some(query) => {
                self.perform_search(&query);
                true
            }
            None => false,
        }
    }

    /// Apply `input` immediately, dropping any queued input.
    pub fn submit_search(&mut self, input: &str) {
        self.search.debouncer().cancel();
        self.perform_search(input);
    }

    /// Cancel queued input and return every table to its paged view.
    pub fn clear_search(&mut self) {
        self.search.debouncer().cancel();
        self.perform_search("");
    }

    /// Search all four collections, or restore paging for an empty query.
    pub fn perform_search(&mut self, query: &str) {
        let query = query.trim();
        self.search.set_query(query);

        if query.is_empty() {
            for kind in EntityKind::ALL {
                self.refresh(kind);
            }
            return;
        }

        debug!(query, "searching all collections");
        let gateway = &self.gateway;
        let results: Vec<(EntityKind, Result<ApiResponse, ApiError>)> =
            std::thread::scope(|scope| {
                let handles: Vec<_> = EntityKind::ALL
                    .iter()
                    .map(|&kind| {
                        let handle = scope.spawn(move || {
                            gateway.call(kind.actions().search, json!({ "q": query }))
                        });
                        (kind, handle)
                    })
                    .collect();
                handles
                    .into_iter()
                    .map(|(kind, handle)| {
                        let result = handle.join().unwrap_or_else(|_| {
                            Err(ApiError::Transport("search worker panicked".into()))
                        });
                        (kind, result)
                    })
                    .collect()
            });

        for (kind, result) in results {
            self.apply_search_result(kind, result);
        }
    }

    fn apply_search_result(&mut self, kind: EntityKind, result: Result<ApiResponse, ApiError>) {
        match result {
            Ok(mut resp) if resp.success => match Record::decode_rows(kind, resp.take_data()) {
                Ok(rows) => self.store.get_mut(kind).apply_search(rows),
                Err(e) => {
                    warn!(%kind, "Error decoding search results: {e}");
                    self.notify(NoticeLevel::Warning, format!("Search failed for {kind}"));
                }
            },
            Ok(resp) => {
                debug!(%kind, message = ?resp.message, "search rejected; keeping current rows");
            }
            Err(e) => {
                warn!(%kind, "Error performing search: {e}");
                self.notify(NoticeLevel::Warning, format!("Search failed for {kind}"));
            }
        }
    }
}

#[cfg(test)]
mod tests;
