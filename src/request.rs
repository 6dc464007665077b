use serde::Deserialize;

use crate::error::Error;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub email_address: Option<String>,
}

#[derive(Debug)]
pub struct Pagination {
    pub page: i64,
    pub page_size: i64,
    pub email_address: Option<String>,
}

impl ListParams {
    /// Rejects out-of-range values instead of clamping them.
    pub fn validate(self) -> Result<Pagination, Error> {
        let page = self.page.unwrap_or(1);
        if page < 1 {
            return Err(Error::InvalidParam(format!("page must be greater than or equal to 1, got {}", page)));
        }
        let page_size = self.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(Error::InvalidParam(format!("page_size must be between 1 and {}, got {}", MAX_PAGE_SIZE, page_size)));
        }
        Ok(Pagination {
            page,
            page_size,
            email_address: self.email_address.filter(|e| !e.is_empty()),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = ListParams {
            page: None,
            page_size: None,
            email_address: None,
        }
        .validate()
        .unwrap();
        assert_eq!(p.page, 1);
        assert_eq!(p.page_size, DEFAULT_PAGE_SIZE);
        assert!(p.email_address.is_none());
    }

    #[test]
    fn test_rejects_out_of_range() {
        for (page, page_size) in [(Some(0), None), (None, Some(0)), (None, Some(101)), (Some(-3), None)] {
            let res = ListParams {
                page,
                page_size,
                email_address: None,
            }
            .validate();
            assert!(res.is_err());
        }
    }

    #[test]
    fn test_accepts_bounds() {
        for page_size in [1, 100] {
            ListParams {
                page: Some(1),
                page_size: Some(page_size),
                email_address: None,
            }
            .validate()
            .unwrap();
        }
    }

    #[test]
    fn test_empty_email_filter_is_dropped() {
        let p = ListParams {
            page: None,
            page_size: None,
            email_address: Some("".into()),
        }
        .validate()
        .unwrap();
        assert!(p.email_address.is_none());
    }
}
