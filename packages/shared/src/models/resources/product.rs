use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Resource, ResourceKind};
use crate::models::ids::ObjectId;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    // Decimal fields arrive as strings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_active() -> bool {
    true
}

impl Resource for Product {
    const KIND: ResourceKind = ResourceKind::Products;

    fn id(&self) -> Option<&ObjectId> {
        self.id.as_ref()
    }
}
