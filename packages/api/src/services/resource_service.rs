use serde_json::{Map, Value};
use shared::models::resources::ResourceKind;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

use crate::services::errors::resource_service_errors::ResourceServiceError;

const REQUIRED: &str = "This field is required.";

/// One page of a collection, before URLs are attached.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSlice {
    pub count: usize,
    pub page: usize,
    pub has_next: bool,
    pub results: Vec<Value>,
}

/// In-memory stand-in for the CRM collections.
pub struct ResourceService {
    collections: RwLock<HashMap<ResourceKind, BTreeMap<i64, Value>>>,
    next_id: AtomicI64,
    page_size: usize,
}

impl ResourceService {
    pub fn new(page_size: usize) -> Self {
        ResourceService {
            collections: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
            page_size: page_size.max(1),
        }
    }

    /// `page` is 1-based.
    pub async fn list(&self, kind: ResourceKind, page: usize) -> Result<PageSlice, ResourceServiceError> {
        if page == 0 {
            return Err(ResourceServiceError::InvalidPage);
        }

        let collections = self.collections.read().await;
        let items: Vec<&Value> = collections
            .get(&kind)
            .map(|items| items.values().collect())
            .unwrap_or_default();
        let count = items.len();
        let start = match (page - 1).checked_mul(self.page_size) {
            Some(start) if start == 0 || start < count => start,
            _ => return Err(ResourceServiceError::InvalidPage),
        };

        let results: Vec<Value> = items
            .into_iter()
            .skip(start)
            .take(self.page_size)
            .cloned()
            .collect();
        Ok(PageSlice {
            count,
            page,
            has_next: start + results.len() < count,
            results,
        })
    }

    pub async fn get(&self, kind: ResourceKind, id: i64) -> Result<Value, ResourceServiceError> {
        self.collections
            .read()
            .await
            .get(&kind)
            .and_then(|items| items.get(&id))
            .cloned()
            .ok_or(ResourceServiceError::NotFound)
    }

    pub async fn create(&self, kind: ResourceKind, body: Value) -> Result<Value, ResourceServiceError> {
        let mut fields = into_object(body)?;
        validate_required(kind, &fields)?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        fields.insert("id".to_string(), Value::from(id));
        let item = Value::Object(fields);

        self.collections
            .write()
            .await
            .entry(kind)
            .or_default()
            .insert(id, item.clone());
        debug!("Created {} #{}", kind, id);
        Ok(item)
    }

    /// Merges `body` into the stored item. Without `partial`, required fields
    /// must be present in `body`.
    pub async fn update(
        &self,
        kind: ResourceKind,
        id: i64,
        body: Value,
        partial: bool,
    ) -> Result<Value, ResourceServiceError> {
        let changes = into_object(body)?;
        if !partial {
            validate_required(kind, &changes)?;
        }

        let mut collections = self.collections.write().await;
        let item = collections
            .get_mut(&kind)
            .and_then(|items| items.get_mut(&id))
            .ok_or(ResourceServiceError::NotFound)?;

        if let Value::Object(fields) = item {
            if !partial {
                fields.retain(|key, _| key == "id");
            }
            for (key, value) in changes {
                if key != "id" {
                    fields.insert(key, value);
                }
            }
        }
        debug!("Updated {} #{}", kind, id);
        Ok(item.clone())
    }

    pub async fn delete(&self, kind: ResourceKind, id: i64) -> Result<(), ResourceServiceError> {
        let removed = self
            .collections
            .write()
            .await
            .get_mut(&kind)
            .and_then(|items| items.remove(&id));
        match removed {
            Some(_) => {
                debug!("Deleted {} #{}", kind, id);
                Ok(())
            }
            None => Err(ResourceServiceError::NotFound),
        }
    }
}

fn into_object(body: Value) -> Result<Map<String, Value>, ResourceServiceError> {
    match body {
        Value::Object(fields) => Ok(fields),
        _ => Err(ResourceServiceError::field(
            "non_field_errors",
            "Invalid data. Expected a dictionary.",
        )),
    }
}

fn required_fields(kind: ResourceKind) -> &'static [&'static str] {
    match kind {
        ResourceKind::Contacts => &["name"],
        ResourceKind::Products => &["name", "sku"],
        ResourceKind::JobCards => &["customer"],
        ResourceKind::Warranties => &["product", "customer"],
        ResourceKind::Installations => &["customer"],
        ResourceKind::Flows => &["name"],
    }
}

fn validate_required(kind: ResourceKind, fields: &Map<String, Value>) -> Result<(), ResourceServiceError> {
    let mut errors = Map::new();
    for field in required_fields(kind) {
        let present = match fields.get(*field) {
            Some(Value::Null) | None => false,
            Some(Value::String(text)) => !text.trim().is_empty(),
            Some(_) => true,
        };
        if !present {
            errors.insert(field.to_string(), Value::Array(vec![Value::from(REQUIRED)]));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ResourceServiceError::ValidationError(errors))
    }
}
