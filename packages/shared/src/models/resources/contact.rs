use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Resource, ResourceKind};
use crate::models::ids::ObjectId;

/// A customer known to the CRM, usually reached over WhatsApp.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Contact {
    pub fn new(name: impl Into<String>) -> Self {
        Contact {
            id: None,
            name: name.into(),
            whatsapp_id: None,
            email: None,
            phone: None,
            created_at: None,
            extra: Map::new(),
        }
    }
}

impl Resource for Contact {
    const KIND: ResourceKind = ResourceKind::Contacts;

    fn id(&self) -> Option<&ObjectId> {
        self.id.as_ref()
    }
}
