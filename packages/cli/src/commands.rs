use gateway::{GatewayError, HannaClient};
use serde_json::Value;
use shared::models::ids::ObjectId;
use shared::models::resources::{
    Contact, Flow, Installation, JobCard, Product, Resource, ResourceKind, Warranty,
};

/// A CRUD operation on one collection.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceOp {
    List { page: Option<u32>, all: bool },
    Get { id: ObjectId },
    Create { body: Value },
    Update { id: ObjectId, body: Value },
    Delete { id: ObjectId },
}

/// Runs `op` through the typed service for `kind`. Returns the JSON to print,
/// if any.
pub async fn run_resource(
    client: &HannaClient,
    kind: ResourceKind,
    op: ResourceOp,
) -> Result<Option<Value>, GatewayError> {
    match kind {
        ResourceKind::Contacts => run_typed::<Contact>(client, op).await,
        ResourceKind::Products => run_typed::<Product>(client, op).await,
        ResourceKind::JobCards => run_typed::<JobCard>(client, op).await,
        ResourceKind::Warranties => run_typed::<Warranty>(client, op).await,
        ResourceKind::Installations => run_typed::<Installation>(client, op).await,
        ResourceKind::Flows => run_typed::<Flow>(client, op).await,
    }
}

async fn run_typed<R: Resource>(
    client: &HannaClient,
    op: ResourceOp,
) -> Result<Option<Value>, GatewayError> {
    let service = client.resources::<R>();
    let output = match op {
        ResourceOp::List { all: true, .. } => to_json(&service.list_all().await?)?,
        ResourceOp::List { page, all: false } => to_json(&service.list(page).await?)?,
        ResourceOp::Get { id } => to_json(&service.get(&id).await?)?,
        ResourceOp::Create { body } => to_json(&service.create(&body).await?)?,
        ResourceOp::Update { id, body } => to_json(&service.update(&id, &body).await?)?,
        ResourceOp::Delete { id } => {
            service.delete(&id).await?;
            return Ok(None);
        }
    };
    Ok(Some(output))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, GatewayError> {
    serde_json::to_value(value).map_err(|e| GatewayError::Decode(e.to_string()))
}

/// Parses a `--data` argument into a JSON object.
pub fn parse_body(raw: &str) -> Result<Value, String> {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(_) => Err("--data must be a JSON object".to_string()),
        Err(e) => Err(format!("--data is not valid JSON: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_body() {
        assert_eq!(
            parse_body(r#"{"name": "Chiedza"}"#).unwrap(),
            json!({ "name": "Chiedza" })
        );
        assert_eq!(
            parse_body("[1, 2]").unwrap_err(),
            "--data must be a JSON object"
        );
        assert!(parse_body("{oops").is_err());
    }
}
