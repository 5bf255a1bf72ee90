// src/api/pagination.rs
//! Offset/limit page walking shared by the spaces and objects listings.

/// The slice of a listing requested by one page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub limit: usize,
    pub offset: usize,
}

impl PageWindow {
    /// The first page of a listing. A zero limit is raised to one.
    pub fn first(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            offset: 0,
        }
    }

    /// The window after a page that returned `returned` items, or `None`
    /// when the listing is exhausted.
    ///
    /// A short page ends the walk, as does an explicit `has_more: false`.
    /// Without a `has_more` flag a full page always triggers one more
    /// request, so a listing whose size is an exact multiple of the limit
    /// ends with a single empty page request.
    pub fn advance(self, returned: usize, has_more: Option<bool>) -> Option<Self> {
        if returned < self.limit || has_more == Some(false) {
            return None;
        }
        Some(Self {
            limit: self.limit,
            offset: self.offset + self.limit,
        })
    }
}

/// One parsed page of a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Raw entries in the response, including ones that were skipped.
    /// Termination is decided on this count, not on `items.len()`.
    pub returned: usize,
    pub has_more: Option<bool>,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            returned: 0,
            has_more: None,
        }
    }

    pub fn map_items<U>(self, f: impl FnMut(T) -> Option<U>) -> Page<U> {
        Page {
            items: self.items.into_iter().filter_map(f).collect(),
            returned: self.returned,
            has_more: self.has_more,
        }
    }
}
