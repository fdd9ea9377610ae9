use crate::models::{EntityKind, Record};

use super::paginator::{compute_window, PageCursor, PageWindow};

/// What a collection's table is currently showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Display {
    /// Nothing loaded yet.
    Idle,
    /// A page of rows.
    Paged(PageWindow),
    /// The page came back without rows.
    Empty,
    /// The page could not be loaded.
    Failed,
    /// Unpaginated search results.
    Search { hits: usize },
}

/// Read-through copy of one collection: rows are only ever replaced
/// wholesale from a server response.
#[derive(Debug, Clone)]
pub struct Collection {
    kind: EntityKind,
    cursor: PageCursor,
    rows: Vec<Record>,
    display: Display,
}

impl Collection {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            cursor: PageCursor::default(),
            rows: Vec::new(),
            display: Display::Idle,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn cursor(&self) -> PageCursor {
        self.cursor
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn in_search(&self) -> bool {
        matches!(self.display, Display::Search { .. })
    }

    /// The page window, when pagination applies.
    pub fn window(&self) -> Option<&PageWindow> {
        match &self.display {
            Display::Paged(window) => Some(window),
            _ => None,
        }
    }

    pub fn pagination_visible(&self) -> bool {
        self.window().is_some_and(PageWindow::controls_visible)
    }

    pub fn info_text(&self) -> String {
        match &self.display {
            Display::Idle => String::new(),
            Display::Paged(window) => window.info_text(),
            Display::Empty | Display::Failed => "Showing 0 record(s)".to_string(),
            Display::Search { hits: 0 } => "Showing 0 result(s)".to_string(),
            Display::Search { hits } => format!("Showing {hits} search result(s)"),
        }
    }

    /// Message for the single placeholder row shown instead of data.
    pub fn placeholder(&self) -> Option<&'static str> {
        match &self.display {
            Display::Idle => Some("Loading…"),
            Display::Empty => Some(self.kind.empty_message()),
            Display::Failed => Some("Error loading data"),
            Display::Search { hits: 0 } => Some("No results found"),
            Display::Paged(_) | Display::Search { .. } => None,
        }
    }

    /// Install a fetched page. A missing or zero `total` falls back to the
    /// row count.
    pub(crate) fn apply_page(
        &mut self,
        page: usize,
        rows: Vec<Record>,
        total: Option<usize>,
        page_size: usize,
    ) {
        self.cursor.page = page;
        if rows.is_empty() {
            self.cursor.total = total.unwrap_or(0);
            self.rows.clear();
            self.display = Display::Empty;
            return;
        }
        let total = total.filter(|&t| t > 0).unwrap_or(rows.len());
        self.cursor.total = total;
        self.display = Display::Paged(compute_window(page, total, page_size));
        self.rows = rows;
    }

    /// The page request was answered with `success: false`.
    pub(crate) fn apply_rejected(&mut self, page: usize) {
        self.cursor.page = page;
        self.rows.clear();
        self.display = Display::Empty;
    }

    /// The page request failed outright; the cursor keeps its last total.
    pub(crate) fn apply_failure(&mut self, page: usize) {
        self.cursor.page = page;
        self.rows.clear();
        self.display = Display::Failed;
    }

    pub(crate) fn apply_search(&mut self, rows: Vec<Record>) {
        self.display = Display::Search { hits: rows.len() };
        self.rows = rows;
    }
}

/// Per-collection state for the four catalog tables.
#[derive(Debug, Clone)]
pub struct EntityStore {
    collections: [Collection; 4],
}

impl Default for EntityStore {
    fn default() -> Self {
        Self {
            collections: EntityKind::ALL.map(Collection::new),
        }
    }
}

impl EntityStore {
    pub fn get(&self, kind: EntityKind) -> &Collection {
        &self.collections[kind.index()]
    }

    pub(crate) fn get_mut(&mut self, kind: EntityKind) -> &mut Collection {
        &mut self.collections[kind.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Collection> {
        self.collections.iter()
    }
}
