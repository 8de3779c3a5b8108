use serde::{Deserialize, Serialize};

use super::validation::FieldErrors;

pub const DEFAULT_PER_PAGE: u32 = 20;
pub const MAX_PER_PAGE: u32 = 100;

/// Page window requested by a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    /// Validates raw query values, falling back to page 1 / 20 per page
    pub fn parse(errors: &mut FieldErrors, page: Option<u32>, per_page: Option<u32>) -> Self {
        let page = page.unwrap_or(1);
        if page == 0 {
            errors.add("page", "La page doit être supérieure ou égale à 1");
        }
        let per_page = per_page.unwrap_or(DEFAULT_PER_PAGE);
        if per_page == 0 || per_page > MAX_PER_PAGE {
            errors.add(
                "per_page",
                format!("Le nombre d'éléments par page doit être entre 1 et {}", MAX_PER_PAGE),
            );
        }
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.per_page)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// One page of a filtered listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page,
            per_page: request.per_page,
        }
    }

    /// Slices an already filtered and sorted collection
    pub fn from_sorted(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.limit() as usize)
            .collect();
        Self::new(items, total, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_absent() {
        let mut errors = FieldErrors::new();
        let request = PageRequest::parse(&mut errors, None, None);
        assert!(errors.is_empty());
        assert_eq!(request, PageRequest::default());
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn offset_from_page() {
        let mut errors = FieldErrors::new();
        let request = PageRequest::parse(&mut errors, Some(3), Some(10));
        assert_eq!(request.offset(), 20);
        assert_eq!(request.limit(), 10);
    }

    #[test]
    fn rejects_zero_page_and_oversized_page() {
        let mut errors = FieldErrors::new();
        PageRequest::parse(&mut errors, Some(0), Some(500));
        assert!(errors.contains("page"));
        assert!(errors.contains("per_page"));
    }

    #[test]
    fn from_sorted_slices() {
        let request = PageRequest { page: 2, per_page: 2 };
        let page = Page::from_sorted(vec![1, 2, 3, 4, 5], request);
        assert_eq!(page.items, vec![3, 4]);
        assert_eq!(page.total, 5);
    }

    #[test]
    fn from_sorted_past_the_end() {
        let request = PageRequest { page: 9, per_page: 10 };
        let page: Page<i32> = Page::from_sorted(vec![1, 2], request);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 2);
    }
}
