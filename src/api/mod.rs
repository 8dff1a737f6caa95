pub mod attendance;
pub mod employee;
pub mod leave_request;
pub mod pams;
pub mod payroll;
pub mod policy;
pub mod profile_update;
pub mod promotion;
pub mod provident_fund;
pub mod resignation;

use actix_web::{HttpResponse, http::header};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::workflow::chain::Decision;

const DEFAULT_PER_PAGE: u64 = 20;
const MAX_PER_PAGE: u64 = 100;

#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
pub struct Pagination {
    /// Pagination page number (start with 1)
    pub page: Option<u64>,
    /// Items per page, at most 100
    pub per_page: Option<u64>,
}

/// List envelope shared by every collection endpoint.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
}

impl Pagination {
    pub fn paginate<T>(self, items: Vec<T>) -> Page<T> {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);
        let total = items.len() as u64;
        let offset = ((page - 1) * per_page) as usize;
        let data = items.into_iter().skip(offset).take(per_page as usize).collect();
        Page {
            data,
            page,
            per_page,
            total,
        }
    }
}

/// Body for a single approve/reject decision on a chained request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[schema(example = json!({
    "decision": "approve",
    "comment": "Approved as per policy",
    "expected_version": 1
}))]
pub struct ReviewBody {
    pub decision: Decision,
    pub comment: Option<String>,
    /// Reject the write when the stored version has moved on
    pub expected_version: Option<u64>,
}

/// File download with an attachment disposition.
pub(crate) fn attachment(content_type: &str, file_name: &str, body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(content_type)
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file_name),
        ))
        .body(body)
}


#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, None, 1, 20, 20)]
    #[case(Some(3), Some(10), 3, 10, 5)]
    #[case(Some(0), Some(500), 1, 100, 25)]
    fn paginate_clamps_and_slices(
        #[case] page: Option<u64>,
        #[case] per_page: Option<u64>,
        #[case] expected_page: u64,
        #[case] expected_per_page: u64,
        #[case] expected_len: usize,
    ) {
        let items: Vec<u32> = (0..25).collect();
        let out = Pagination { page, per_page }.paginate(items);
        assert_eq!(out.page, expected_page);
        assert_eq!(out.per_page, expected_per_page);
        assert_eq!(out.total, 25);
        assert_eq!(out.data.len(), expected_len);
    }
}
