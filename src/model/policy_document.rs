use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum PolicyCategory {
    Leave,
    Recruitment,
    Finance,
    Conduct,
    Appraisal,
    General,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PolicyDocument {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub category: PolicyCategory,
    #[schema(example = "1.2 MB")]
    pub file_size: String,
    #[schema(example = "PDF")]
    pub format: String,
    #[schema(example = "2025-06-15")]
    pub last_updated: String,
    #[schema(example = "active")]
    pub status: String,
    #[schema(example = "/policies/leave-policy.pdf")]
    pub download_url: String,
}

fn doc(
    id: u32,
    title: &str,
    description: &str,
    category: PolicyCategory,
    file_size: &str,
    last_updated: &str,
    file: &str,
) -> PolicyDocument {
    PolicyDocument {
        id,
        title: title.to_string(),
        description: description.to_string(),
        category,
        file_size: file_size.to_string(),
        format: "PDF".to_string(),
        last_updated: last_updated.to_string(),
        status: "active".to_string(),
        download_url: format!("/policies/{}", file),
    }
}

pub static POLICY_DOCUMENTS: Lazy<Vec<PolicyDocument>> = Lazy::new(|| {
    vec![
        doc(
            1,
            "Leave Policy",
            "Entitlements, application rules and approval routing for all leave types",
            PolicyCategory::Leave,
            "1.2 MB",
            "2025-06-15",
            "leave-policy.pdf",
        ),
        doc(
            2,
            "Maternity Leave Guidelines",
            "Eligibility and advance-notice requirements for maternity leave",
            PolicyCategory::Leave,
            "640 KB",
            "2025-03-02",
            "maternity-guidelines.pdf",
        ),
        doc(
            3,
            "Recruitment and Selection Policy",
            "Faculty and staff hiring procedures",
            PolicyCategory::Recruitment,
            "2.1 MB",
            "2024-11-20",
            "recruitment-policy.pdf",
        ),
        doc(
            4,
            "CECPF Rules",
            "Provident fund contributions, loans and non-refundable withdrawals",
            PolicyCategory::Finance,
            "980 KB",
            "2025-01-10",
            "cecpf-rules.pdf",
        ),
        doc(
            5,
            "Code of Conduct",
            "Professional conduct expected from all employees",
            PolicyCategory::Conduct,
            "1.5 MB",
            "2024-08-05",
            "code-of-conduct.pdf",
        ),
        doc(
            6,
            "Performance Appraisal (PAMS) Handbook",
            "Workload reporting, rubric definitions and the review timeline",
            PolicyCategory::Appraisal,
            "3.4 MB",
            "2025-07-01",
            "pams-handbook.pdf",
        ),
        doc(
            7,
            "Resignation and Exit Procedure",
            "Notice, handover and clearance steps for departing employees",
            PolicyCategory::General,
            "720 KB",
            "2025-02-18",
            "exit-procedure.pdf",
        ),
    ]
});

pub fn list(category: Option<PolicyCategory>) -> Vec<PolicyDocument> {
    POLICY_DOCUMENTS
        .iter()
        .filter(|d| category.is_none_or(|c| d.category == c))
        .cloned()
        .collect()
}

pub fn find(id: u32) -> Option<&'static PolicyDocument> {
    POLICY_DOCUMENTS.iter().find(|d| d.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_by_category() {
        let leave = list(Some(PolicyCategory::Leave));
        assert_eq!(leave.len(), 2);
        assert!(leave.iter().all(|d| d.category == PolicyCategory::Leave));
        assert_eq!(list(None).len(), POLICY_DOCUMENTS.len());
    }

    #[test]
    fn ids_are_unique() {
        let mut ids: Vec<_> = POLICY_DOCUMENTS.iter().map(|d| d.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), POLICY_DOCUMENTS.len());
        assert_eq!(find(4).unwrap().title, "CECPF Rules");
        assert!(find(99).is_none());
    }
}
