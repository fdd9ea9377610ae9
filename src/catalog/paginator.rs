/// Display window for one page of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: usize,
    /// 1-based index of the first row shown.
    pub start: usize,
    /// 1-based index of the last row shown.
    pub end: usize,
    pub total: usize,
    pub total_pages: usize,
}

impl PageWindow {
    pub fn prev_enabled(&self) -> bool {
        self.page > 1
    }

    pub fn next_enabled(&self) -> bool {
        self.page < self.total_pages
    }

    /// Pagination controls are only shown when there is somewhere to go.
    pub fn controls_visible(&self) -> bool {
        self.total_pages > 1
    }

    pub fn info_text(&self) -> String {
        if self.total == 0 {
            return "Showing 0 record(s)".to_string();
        }
        format!(
            "Showing {}-{} of {} record(s)",
            self.start, self.end, self.total
        )
    }

    pub fn status_text(&self) -> String {
        format!("{} of {}", self.page, self.total_pages)
    }
}

/// Compute the rows shown on `page` of `total_items` at `page_size` per page.
///
/// `page` and `page_size` are clamped to at least 1. Offsets saturate, so
/// any page number is accepted.
pub fn compute_window(page: usize, total_items: usize, page_size: usize) -> PageWindow {
    let page = page.max(1);
    let page_size = page_size.max(1);
    let start = (page - 1).saturating_mul(page_size).saturating_add(1);
    let end = start.saturating_add(page_size - 1).min(total_items);
    PageWindow {
        page,
        start,
        end,
        total: total_items,
        total_pages: total_pages(total_items, page_size),
    }
}

pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    total_items.div_ceil(page_size.max(1))
}

/// Current page and last known total of one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    pub page: usize,
    pub total: usize,
}

impl Default for PageCursor {
    fn default() -> Self {
        Self { page: 1, total: 0 }
    }
}

impl PageCursor {
    /// Page reached by moving `delta` pages, or `None` when moving back from
    /// page 1 or forward from the last page.
    pub fn step(&self, delta: isize, page_size: usize) -> Option<usize> {
        let target = self.page.checked_add_signed(delta)?;
        if delta < 0 {
            // Backwards stays allowed after the total shrank under the cursor.
            return (target >= 1 && target != self.page).then_some(target);
        }
        self.clamp_target(target, page_size)
    }

    /// `target` if it is a valid page other than the current one.
    pub fn clamp_target(&self, target: usize, page_size: usize) -> Option<usize> {
        let last = total_pages(self.total, page_size);
        if target < 1 || target > last || target == self.page {
            None
        } else {
            Some(target)
        }
    }
}
