//! Client-side list shaping: free-text filtering and page slicing.
//!
//! The backend hands the consumed endpoints full result sets; narrowing
//! and paging happen here, over data already in memory. [`ListView`]
//! composes the two and keeps the current page valid as the underlying
//! data or the filter changes.

use wardline_api::NotificationRecord;

// ── Filtering ────────────────────────────────────────────────────────

/// Something the free-text filter can look inside.
pub trait Searchable {
    /// The fields the needle is matched against.
    fn search_fields(&self) -> Vec<&str>;
}

impl Searchable for NotificationRecord {
    fn search_fields(&self) -> Vec<&str> {
        [
            &self.title,
            &self.title_en,
            &self.title_ar,
            &self.message,
            &self.message_en,
            &self.message_ar,
        ]
        .into_iter()
        .filter_map(|field| field.as_deref())
        .collect()
    }
}

/// Case-insensitive substring filter.
///
/// An empty (or all-whitespace) term keeps every item; otherwise an
/// item survives iff at least one of its search fields contains the
/// lowercased term. Every input item lands in exactly one of the two
/// outcomes, there is no third bucket.
pub fn filter_by_search<'a, T: Searchable>(items: &'a [T], term: &str) -> Vec<&'a T> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return items.iter().collect();
    }
    items
        .iter()
        .filter(|item| {
            item.search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}

// ── Pagination ───────────────────────────────────────────────────────

/// Where a [`Page`] sits in the full result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    /// 1-based page number as requested (not clamped).
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

/// One page of items plus its position.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub info: PageInfo,
}

/// Slice out one 1-based page.
///
/// A `page_size` of zero is floored to one rather than treated as an
/// error. A page past the end yields an empty `items` with the counts
/// still filled in.
pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let page = page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size);

    let start = (page - 1).saturating_mul(page_size);
    let items = if start >= total_items {
        Vec::new()
    } else {
        items
            .into_iter()
            .skip(start)
            .take(page_size)
            .collect()
    };

    Page {
        items,
        info: PageInfo {
            page,
            page_size,
            total_items,
            total_pages,
            has_next_page: page < total_pages,
            has_previous_page: page > 1 && page <= total_pages,
        },
    }
}

// ── ListView ─────────────────────────────────────────────────────────

/// A filtered, paginated view over an owned list.
///
/// Invariants maintained across every mutation: the current page is
/// always within `1..=max(total_pages, 1)` of the *filtered* set, and
/// changing the search term or the page size snaps back to page 1.
#[derive(Debug, Clone)]
pub struct ListView<T> {
    items: Vec<T>,
    search: String,
    page: usize,
    page_size: usize,
}

impl<T: Searchable> ListView<T> {
    pub fn new(page_size: usize) -> Self {
        Self {
            items: Vec::new(),
            search: String::new(),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    /// Replace the underlying items, keeping the current page where it
    /// remains valid and clamping it back otherwise.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.clamp_page();
    }

    /// Remove items in place (e.g. after a delete round-trips), then
    /// clamp the page so an emptied last page falls back to the new
    /// last page.
    pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) {
        self.items.retain(keep);
        self.clamp_page();
    }

    /// Change the filter term. Resets to page 1.
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
        self.page = 1;
    }

    /// Change the page size (zero floors to one). Resets to page 1.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page = 1;
    }

    /// Jump to a page, clamped into the valid range.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.clamp(1, self.last_page());
    }

    pub fn next_page(&mut self) {
        self.set_page(self.page + 1);
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.page.saturating_sub(1));
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// The current page of the filtered set.
    pub fn visible(&self) -> Page<&T> {
        paginate(
            filter_by_search(&self.items, &self.search),
            self.page,
            self.page_size,
        )
    }

    fn filtered_len(&self) -> usize {
        filter_by_search(&self.items, &self.search).len()
    }

    fn last_page(&self) -> usize {
        self.filtered_len().div_ceil(self.page_size).max(1)
    }

    fn clamp_page(&mut self) {
        self.page = self.page.clamp(1, self.last_page());
    }
}
