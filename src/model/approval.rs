use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

/// Status shared by every single-outcome request kind
/// (leave, promotion, attendance correction, provident fund, profile update).
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn is_resolved(self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AuditEntry {
    #[schema(example = "approved by HOD")]
    pub action: String,
    #[schema(example = "Dr. Rahman")]
    pub by: String,
    pub date: DateTime<Utc>,
    pub comment: Option<String>,
}

impl AuditEntry {
    pub fn new(
        action: impl Into<String>,
        by: impl Into<String>,
        date: DateTime<Utc>,
        comment: Option<String>,
    ) -> Self {
        Self {
            action: action.into(),
            by: by.into(),
            date,
            comment,
        }
    }
}

/// Append-only audit log. Entries can be read or appended, never edited.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AuditTrail(Vec<AuditEntry>);

impl AuditTrail {
    pub fn append(&mut self, entry: AuditEntry) {
        self.0.push(entry);
    }

    #[cfg(test)]
    pub fn entries(&self) -> &[AuditEntry] {
        &self.0
    }

    pub fn latest(&self) -> Option<&AuditEntry> {
        self.0.last()
    }
}

/// Attached file descriptor, owned by exactly one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Document {
    pub id: u64,
    #[schema(example = "medical_certificate.pdf")]
    pub name: String,
    #[schema(example = 204800)]
    pub size: u64,
    #[serde(rename = "type")]
    #[schema(example = "application/pdf")]
    pub content_type: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DocumentInput {
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub content_type: String,
}

/// Assigns request-local ids to uploaded document descriptors.
pub fn attach_documents(inputs: Vec<DocumentInput>) -> Vec<Document> {
    inputs
        .into_iter()
        .enumerate()
        .map(|(index, input)| Document {
            id: index as u64 + 1,
            name: input.name,
            size: input.size,
            content_type: input.content_type,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audit_trail_keeps_append_order() {
        let now = Utc::now();
        let mut trail = AuditTrail::default();
        trail.append(AuditEntry::new("submitted", "alice", now, None));
        trail.append(AuditEntry::new("approved by HOD", "bob", now, Some("ok".into())));

        assert_eq!(trail.entries().len(), 2);
        assert_eq!(trail.entries()[0].action, "submitted");
        assert_eq!(trail.latest().unwrap().by, "bob");
    }

    #[test]
    fn document_type_is_serialized_as_type() {
        let docs = attach_documents(vec![DocumentInput {
            name: "a.pdf".into(),
            size: 10,
            content_type: "application/pdf".into(),
        }]);
        let json = serde_json::to_value(&docs[0]).unwrap();
        assert_eq!(json["type"], "application/pdf");
        assert_eq!(json["id"], 1);
    }
}
