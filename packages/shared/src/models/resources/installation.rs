use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Resource, ResourceKind};
use crate::models::ids::ObjectId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallationStatus {
    Pending,
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Installation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technician: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<NaiveDate>,
    #[serde(default = "default_status")]
    pub status: InstallationStatus,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_status() -> InstallationStatus {
    InstallationStatus::Pending
}

impl Resource for Installation {
    const KIND: ResourceKind = ResourceKind::Installations;

    fn id(&self) -> Option<&ObjectId> {
        self.id.as_ref()
    }
}
