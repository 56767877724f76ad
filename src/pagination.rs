//! Pagination envelope shared by all list endpoints

use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageParams {
    /// Clamps page to >= 1 and limit to [1, 100].
    pub fn clamp(&self) -> (u32, u32) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(20).clamp(1, 100);
        (page, limit)
    }
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: i64) -> Self {
        let pages = if total == 0 { 0 } else { (total + i64::from(limit) - 1) / i64::from(limit) };
        Self {
            page,
            limit,
            total,
            pages,
            has_next: i64::from(page) < pages,
            has_prev: page > 1,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_defaults() {
        assert_eq!(PageParams::default().clamp(), (1, 20));
    }

    #[test]
    fn test_clamp_bounds() {
        let p = PageParams { page: Some(0), limit: Some(0) };
        assert_eq!(p.clamp(), (1, 1));
        let p = PageParams { page: Some(3), limit: Some(500) };
        assert_eq!(p.clamp(), (3, 100));
    }

    #[test]
    fn test_page_math() {
        let p = Pagination::new(2, 10, 25);
        assert_eq!(p.pages, 3);
        assert!(p.has_next);
        assert!(p.has_prev);
    }

    #[test]
    fn test_empty_result() {
        let p = Pagination::new(1, 10, 0);
        assert_eq!(p.pages, 0);
        assert!(!p.has_next);
        assert!(!p.has_prev);
    }

    #[test]
    fn test_last_page() {
        let p = Pagination::new(3, 10, 25);
        assert!(!p.has_next);
    }
}
