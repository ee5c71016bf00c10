use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Resource, ResourceKind};
use crate::models::ids::ObjectId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarrantyStatus {
    Active,
    Expired,
    Void,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Warranty {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default = "default_status")]
    pub status: WarrantyStatus,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_status() -> WarrantyStatus {
    WarrantyStatus::Active
}

impl Warranty {
    /// Coverage check for a given day. A void warranty never covers; an
    /// open-ended date range is treated as unbounded on that side.
    pub fn covers(&self, day: NaiveDate) -> bool {
        if self.status == WarrantyStatus::Void {
            return false;
        }
        let started = self.start_date.map_or(true, |start| start <= day);
        let not_ended = self.end_date.map_or(true, |end| day <= end);
        started && not_ended
    }
}

impl Resource for Warranty {
    const KIND: ResourceKind = ResourceKind::Warranties;

    fn id(&self) -> Option<&ObjectId> {
        self.id.as_ref()
    }
}
