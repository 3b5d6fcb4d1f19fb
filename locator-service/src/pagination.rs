use serde::{Deserialize, Serialize};

use crate::error::{LocatorError, LocatorResult};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// 1-based page plus page size, already validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, page_size: DEFAULT_PAGE_SIZE }
    }
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> LocatorResult<Self> {
        if page < 1 {
            return Err(LocatorError::invalid("invalid_page", "page must be >= 1"));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(LocatorError::invalid(
                "invalid_page_size",
                format!("limit must be between 1 and {MAX_PAGE_SIZE}"),
            ));
        }
        Ok(Self { page, page_size })
    }

    /// Parses raw `page` / `limit` query values, falling back to the defaults when absent.
    pub fn from_params(page: Option<&str>, limit: Option<&str>) -> LocatorResult<Self> {
        let page = parse_positive(page, 1, "invalid_page", "page")?;
        let page_size = parse_positive(limit, DEFAULT_PAGE_SIZE, "invalid_page_size", "limit")?;
        Self::new(page, page_size)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }

    pub fn pages_for(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.page_size))
    }
}

fn parse_positive(raw: Option<&str>, default: u32, code: &'static str, name: &str) -> LocatorResult<u32> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(value) => value
            .parse::<u32>()
            .map_err(|_| LocatorError::invalid(code, format!("{name} '{value}' must be a positive integer"))),
    }
}

/// Raw paging parameters as they arrive in a query string.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl PageParams {
    pub fn to_request(&self) -> LocatorResult<PageRequest> {
        PageRequest::from_params(self.page.as_deref(), self.limit.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            data,
            pagination: PaginationMeta {
                page: request.page,
                limit: request.page_size,
                total,
                pages: request.pages_for(total),
            },
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_params_absent() {
        let req = PageRequest::from_params(None, Some("")).unwrap();
        assert_eq!(req, PageRequest::default());
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn page_zero_and_oversized_limit_rejected() {
        assert_eq!(PageRequest::from_params(Some("0"), None).unwrap_err().code(), "invalid_page");
        assert_eq!(PageRequest::from_params(Some("-2"), None).unwrap_err().code(), "invalid_page");
        assert_eq!(PageRequest::from_params(None, Some("101")).unwrap_err().code(), "invalid_page_size");
        assert_eq!(PageRequest::from_params(None, Some("ten")).unwrap_err().code(), "invalid_page_size");
    }

    #[test]
    fn offset_and_pages() {
        let req = PageRequest::new(3, 20).unwrap();
        assert_eq!(req.offset(), 40);
        assert_eq!(req.pages_for(0), 0);
        assert_eq!(req.pages_for(41), 3);
        assert_eq!(req.pages_for(40), 2);
    }
}
