//! Page windows over a flat collection
//!
//! Everything here is derived on demand from `(page, per_page)` and the
//! collection length, so the window and the display indices can never
//! disagree with their inputs.

use url::form_urlencoded;

use crate::errors::ConsoleError;

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_PER_PAGE: usize = 10;

const PAGE_PARAM: &str = "page";
const PER_PAGE_PARAM: &str = "perPage";

/// 1-based page number and page size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    page: usize,
    per_page: usize,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PaginationState {
    pub fn new(page: usize, per_page: usize) -> Result<Self, ConsoleError> {
        Ok(Self {
            page: validate(PAGE_PARAM, page)?,
            per_page: validate(PER_PAGE_PARAM, per_page)?,
        })
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    pub fn set_page(&mut self, page: usize) -> Result<(), ConsoleError> {
        self.page = validate(PAGE_PARAM, page)?;
        Ok(())
    }

    pub fn set_per_page(&mut self, per_page: usize) -> Result<(), ConsoleError> {
        self.per_page = validate(PER_PAGE_PARAM, per_page)?;
        Ok(())
    }

    /// Parse `page` and `perPage` from a query string; missing keys keep
    /// their defaults and unknown keys are ignored.
    pub fn from_query(query: &str) -> Result<Self, ConsoleError> {
        Self::default().with_query(query)
    }

    /// Apply the `page`/`perPage` keys of `query` on top of this state
    pub fn with_query(mut self, query: &str) -> Result<Self, ConsoleError> {
        let query = query.trim_start_matches('?');
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                PAGE_PARAM => self.set_page(parse_param(PAGE_PARAM, &value)?)?,
                PER_PAGE_PARAM => self.set_per_page(parse_param(PER_PAGE_PARAM, &value)?)?,
                _ => {}
            }
        }
        Ok(self)
    }

    /// Query string carrying both parameters
    pub fn to_query(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .append_pair(PAGE_PARAM, &self.page.to_string())
            .append_pair(PER_PAGE_PARAM, &self.per_page.to_string())
            .finish()
    }

    /// 1-based index of the first item on the page, `0` for an empty collection
    pub fn first_of_current_page(&self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.offset().saturating_add(1)
    }

    /// 1-based index of the last item on the page
    pub fn last_of_current_page(&self, len: usize) -> usize {
        len.min(self.page.saturating_mul(self.per_page))
    }

    pub fn total_pages(&self, len: usize) -> usize {
        len.div_ceil(self.per_page)
    }

    /// Items of the current page; empty past the last page
    pub fn window<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.offset();
        if start >= items.len() {
            return &[];
        }
        let end = items.len().min(start.saturating_add(self.per_page));
        &items[start..end]
    }

    fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

fn validate(name: &str, value: usize) -> Result<usize, ConsoleError> {
    if value == 0 {
        return Err(ConsoleError::ValidationError(format!(
            "{} must be at least 1",
            name
        )));
    }
    Ok(value)
}

fn parse_param(name: &str, value: &str) -> Result<usize, ConsoleError> {
    value.trim().parse().map_err(|_| {
        ConsoleError::ValidationError(format!("{} is not a page number: {:?}", name, value))
    })
}

/// One page of a collection with its display indices
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub first_of_current_page: usize,
    pub last_of_current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

/// A collection together with its pagination state
#[derive(Debug, Clone, Default)]
pub struct PaginatedCollection<T> {
    items: Vec<T>,
    state: PaginationState,
}

impl<T: Clone> PaginatedCollection<T> {
    pub fn new(items: Vec<T>, state: PaginationState) -> Self {
        Self { items, state }
    }

    pub fn state(&self) -> PaginationState {
        self.state
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
    }

    pub fn set_page(&mut self, page: usize) -> Result<(), ConsoleError> {
        self.state.set_page(page)
    }

    pub fn set_per_page(&mut self, per_page: usize) -> Result<(), ConsoleError> {
        self.state.set_per_page(per_page)
    }

    /// Apply `page`/`perPage` from a query string; on error nothing changes
    pub fn apply_query(&mut self, query: &str) -> Result<(), ConsoleError> {
        self.state = self.state.with_query(query)?;
        Ok(())
    }

    pub fn paged_items(&self) -> &[T] {
        self.state.window(&self.items)
    }

    pub fn first_of_current_page(&self) -> usize {
        self.state.first_of_current_page(self.items.len())
    }

    pub fn last_of_current_page(&self) -> usize {
        self.state.last_of_current_page(self.items.len())
    }

    pub fn total_pages(&self) -> usize {
        self.state.total_pages(self.items.len())
    }

    /// Owned view of the current page
    pub fn page(&self) -> Page<T> {
        Page {
            items: self.paged_items().to_vec(),
            page: self.state.page(),
            per_page: self.state.per_page(),
            first_of_current_page: self.first_of_current_page(),
            last_of_current_page: self.last_of_current_page(),
            total_pages: self.total_pages(),
            total_items: self.items.len(),
        }
    }
}
