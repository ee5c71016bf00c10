use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Resource, ResourceKind};
use crate::models::ids::ObjectId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobCardStatus {
    Open,
    InProgress,
    AwaitingParts,
    Resolved,
    Closed,
    #[serde(other)]
    Unknown,
}

impl JobCardStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobCardStatus::Resolved | JobCardStatus::Closed)
    }
}

/// Service ticket raised against a customer's product.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct JobCard {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_card_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technician: Option<ObjectId>,
    #[serde(default = "default_status")]
    pub status: JobCardStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_fault: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_status() -> JobCardStatus {
    JobCardStatus::Open
}

impl Resource for JobCard {
    const KIND: ResourceKind = ResourceKind::JobCards;

    fn id(&self) -> Option<&ObjectId> {
        self.id.as_ref()
    }
}
