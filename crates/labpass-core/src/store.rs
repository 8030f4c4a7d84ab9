//! Remote store seam.
//!
//! [`ResourceStore`] is what the pipeline uploads through. The HTTP
//! implementation lives in the CLI crate; [`MemoryStore`] keeps documents in
//! process and is used for dry runs and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{CoreError, Result};
use crate::id::generate_id;
use crate::model::{FhirResource, Resource};
use crate::time::now_utc;

#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Create a resource; returns the stored document with its assigned id.
    async fn create(&self, resource_type: &str, body: &Value) -> Result<Value>;

    async fn read(&self, resource_type: &str, id: &str) -> Result<Value>;
}

/// A resource after upload together with the document the store returned.
#[derive(Debug, Clone)]
pub struct Uploaded<R> {
    pub resource: R,
    pub document: Value,
}

impl<R: FhirResource> Uploaded<R> {
    pub fn id(&self) -> Option<&str> {
        self.resource.id()
    }
}

/// Serialize `resource`, create it on `store` and adopt the assigned id.
pub async fn upload<R: FhirResource>(store: &dyn ResourceStore, resource: &R) -> Result<Uploaded<R>> {
    let body = Into::<Resource>::into(resource.clone()).to_value()?;
    let document = store.create(R::RESOURCE_TYPE, &body).await?;

    let returned_type = document.get("resourceType").and_then(Value::as_str);
    if returned_type.is_some_and(|t| t != R::RESOURCE_TYPE) {
        return Err(CoreError::invalid_resource(format!(
            "store returned {} for a {} create",
            returned_type.unwrap_or_default(),
            R::RESOURCE_TYPE
        )));
    }

    let id = document
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            CoreError::invalid_resource(format!(
                "store response for {} carries no id",
                R::RESOURCE_TYPE
            ))
        })?
        .to_string();

    info!(resource_type = R::RESOURCE_TYPE, %id, "uploaded resource");

    let mut uploaded = resource.clone();
    uploaded.set_id(id);
    Ok(Uploaded {
        resource: uploaded,
        document,
    })
}

#[derive(Debug, Default)]
struct MemoryState {
    documents: HashMap<String, Value>,
    creates: Vec<String>,
}

/// In-process store assigning UUID ids.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
    reject: Option<(String, u16)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that answers creates of `resource_type` with `status`.
    pub fn rejecting(resource_type: impl Into<String>, status: u16) -> Self {
        Self {
            state: RwLock::default(),
            reject: Some((resource_type.into(), status)),
        }
    }

    /// Resource types of successful creates, in call order
    pub async fn creates(&self) -> Vec<String> {
        self.state.read().await.creates.clone()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.documents.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ResourceStore for MemoryStore {
    async fn create(&self, resource_type: &str, body: &Value) -> Result<Value> {
        if let Some((rejected, status)) = &self.reject
            && rejected == resource_type
        {
            return Err(CoreError::remote_rejection(
                *status,
                format!(r#"{{"resourceType":"OperationOutcome","issue":[{{"diagnostics":"{resource_type} rejected"}}]}}"#),
            ));
        }

        let Value::Object(mut document) = body.clone() else {
            return Err(CoreError::invalid_resource("resource body must be a JSON object"));
        };

        let id = generate_id();
        document.insert("id".into(), Value::String(id.clone()));
        document.insert(
            "meta".into(),
            serde_json::json!({"versionId": "1", "lastUpdated": now_utc().to_string()}),
        );
        let document = Value::Object(document);

        let mut state = self.state.write().await;
        state
            .documents
            .insert(format!("{resource_type}/{id}"), document.clone());
        state.creates.push(resource_type.to_string());
        debug!(resource_type, %id, "memory store create");

        Ok(document)
    }

    async fn read(&self, resource_type: &str, id: &str) -> Result<Value> {
        self.state
            .read()
            .await
            .documents
            .get(&format!("{resource_type}/{id}"))
            .cloned()
            .ok_or_else(|| {
                CoreError::remote_rejection(404, format!("{resource_type}/{id} not found"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::build_organization;
    use crate::model::Organization;

    #[tokio::test]
    async fn upload_adopts_assigned_id() {
        let store = MemoryStore::new();
        let org = build_organization("org1", "LabCo").unwrap();

        let uploaded = upload(&store, &org).await.unwrap();
        let id = uploaded.id().unwrap().to_string();
        assert_ne!(id, "org1");
        assert_eq!(uploaded.resource.name.as_deref(), Some("LabCo"));
        assert_eq!(uploaded.document["id"], id.as_str());
        assert_eq!(uploaded.document["meta"]["versionId"], "1");

        let read = store.read("Organization", &id).await.unwrap();
        assert_eq!(read, uploaded.document);
        assert_eq!(store.creates().await, ["Organization"]);
    }

    #[tokio::test]
    async fn read_of_unknown_id_is_a_rejection() {
        let store = MemoryStore::new();
        let err = store.read("Patient", "nope").await.unwrap_err();
        assert!(matches!(err, CoreError::RemoteRejection { status: 404, .. }));
    }

    #[tokio::test]
    async fn rejecting_store_surfaces_body() {
        let store = MemoryStore::rejecting("Organization", 422);
        let err = upload(&store, &Organization::default()).await.unwrap_err();
        match err {
            CoreError::RemoteRejection { status, body } => {
                assert_eq!(status, 422);
                assert!(body.contains("OperationOutcome"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(store.is_empty().await);
    }

    struct WrongTypeStore;

    #[async_trait]
    impl ResourceStore for WrongTypeStore {
        async fn create(&self, _resource_type: &str, _body: &Value) -> Result<Value> {
            Ok(serde_json::json!({"resourceType": "Patient", "id": "1"}))
        }

        async fn read(&self, _resource_type: &str, _id: &str) -> Result<Value> {
            unreachable!()
        }
    }

    #[tokio::test]
    async fn upload_rejects_mismatched_resource_type() {
        let err = upload(&WrongTypeStore, &Organization::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidResource { .. }));
    }
}
