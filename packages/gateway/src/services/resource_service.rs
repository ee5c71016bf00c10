use serde::Serialize;
use serde_json::Value;
use shared::models::ids::ObjectId;
use shared::models::pagination::{ListPayload, Page};
use shared::models::resources::{Resource, ResourceKind};
use std::collections::HashSet;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::services::dispatcher::{ApiRequest, RequestDispatcher};
use crate::services::errors::gateway_errors::GatewayError;

/// Typed CRUD access to one REST collection.
pub struct ResourceService<R: Resource> {
    dispatcher: Arc<RequestDispatcher>,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> Clone for ResourceService<R> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: self.dispatcher.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> ResourceService<R> {
    pub fn new(dispatcher: Arc<RequestDispatcher>) -> Self {
        Self {
            dispatcher,
            _resource: PhantomData,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        R::KIND
    }

    fn collection_path(&self) -> String {
        format!("{}/", R::KIND.path())
    }

    fn item_path(&self, id: &ObjectId) -> String {
        format!("{}/{}/", R::KIND.path(), id)
    }

    /// Fetches one page. `page` is 1-based; `None` lets the server pick.
    pub async fn list(&self, page: Option<u32>) -> Result<Page<R>, GatewayError> {
        let mut request = ApiRequest::get(self.collection_path());
        if let Some(page) = page {
            request = request.with_query("page", page);
        }
        self.fetch_page(request).await
    }

    /// Follows `next` links until the collection is exhausted.
    pub async fn list_all(&self) -> Result<Vec<R>, GatewayError> {
        let mut first = self.list(None).await?;
        let mut items = std::mem::take(&mut first.results);
        let mut next = first.next;
        let mut visited = HashSet::new();

        while let Some(url) = next {
            if !visited.insert(url.clone()) {
                warn!("Pagination loop detected at {}, stopping", url);
                break;
            }
            let mut page = self.fetch_page(ApiRequest::get(url)).await?;
            items.append(&mut page.results);
            next = page.next;
        }

        debug!("Fetched {} {}", items.len(), R::KIND);
        Ok(items)
    }

    pub async fn get(&self, id: &ObjectId) -> Result<R, GatewayError> {
        self.dispatcher.get_json(&self.item_path(id)).await
    }

    pub async fn create<B: Serialize + ?Sized>(&self, body: &B) -> Result<R, GatewayError> {
        self.dispatcher
            .post_json(&self.collection_path(), body)
            .await
    }

    /// Partial update (PATCH).
    pub async fn update(&self, id: &ObjectId, changes: &Value) -> Result<R, GatewayError> {
        self.dispatcher
            .patch_json(&self.item_path(id), changes)
            .await
    }

    /// Full replacement (PUT).
    pub async fn replace(&self, id: &ObjectId, item: &R) -> Result<R, GatewayError> {
        self.dispatcher.put_json(&self.item_path(id), item).await
    }

    pub async fn delete(&self, id: &ObjectId) -> Result<(), GatewayError> {
        self.dispatcher.delete(&self.item_path(id)).await
    }

    async fn fetch_page(&self, request: ApiRequest) -> Result<Page<R>, GatewayError> {
        let payload: ListPayload<R> = self.dispatcher.send(request).await?.json()?;
        Ok(payload.into())
    }
}
