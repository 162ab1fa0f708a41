// Copyright (C) 2025 Stratus Cloud, Inc.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Structured document bodies exchanged with the API.
//!
//! Every request and response body is a JSON-API shaped document: a
//! top-level `data` node carrying `type`, optional `id`, an `attributes`
//! object, and optional `relationships` linking to other resources. The
//! generic parameter is the attributes shape; resource wrappers supply their
//! own serde types for it.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SdkError};
use crate::pagination::Pagination;

/// A single resource node: `{type, id, attributes, relationships}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource<T> {
    #[serde(rename = "type")]
    pub kind: String,
    /// Server-assigned identifier. Absent on create payloads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub attributes: T,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub relationships: BTreeMap<String, Relationship>,
}

impl<T> Resource<T> {
    pub fn new(kind: impl Into<String>, attributes: T) -> Self {
        Self {
            kind: kind.into(),
            id: None,
            attributes,
            relationships: BTreeMap::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_relationship(
        mut self,
        name: impl Into<String>,
        relationship: Relationship,
    ) -> Self {
        self.relationships.insert(name.into(), relationship);
        self
    }

    /// Server-assigned identifier, or empty for payloads that have none yet.
    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or("")
    }

    /// Linked resource identifier of a to-one relationship, if present.
    pub fn related_id(&self, name: &str) -> Option<&ResourceIdentifier> {
        match self.relationships.get(name)?.data.as_ref()? {
            RelationshipData::One(identifier) => Some(identifier),
            RelationshipData::Many(_) => None,
        }
    }
}

/// A relationship node: `{"data": {...}}` or `{"data": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(default)]
    pub data: Option<RelationshipData>,
}

impl Relationship {
    /// To-one linkage to a single resource.
    pub fn to_one(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            data: Some(RelationshipData::One(ResourceIdentifier {
                kind: kind.into(),
                id: id.into(),
            })),
        }
    }

    /// To-many linkage to a set of resources.
    pub fn to_many(identifiers: Vec<ResourceIdentifier>) -> Self {
        Self {
            data: Some(RelationshipData::Many(identifiers)),
        }
    }
}

/// Relationship linkage data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelationshipData {
    One(ResourceIdentifier),
    Many(Vec<ResourceIdentifier>),
}

/// `{type, id}` reference to another resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
}

/// A document wrapping one resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document<T> {
    pub data: Resource<T>,
}

/// A document wrapping an ordered collection of resources.
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionDocument<T> {
    pub data: Vec<Resource<T>>,
    #[serde(default)]
    pub meta: Option<CollectionMeta>,
}

/// `meta` node of a collection document.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct CollectionMeta {
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Decode a single-resource document from a 2xx body.
pub(crate) fn decode_single<T: DeserializeOwned>(bytes: &[u8]) -> Result<Resource<T>> {
    let document: Document<T> =
        serde_json::from_slice(bytes).map_err(|e| SdkError::MalformedResponse(e.to_string()))?;
    Ok(document.data)
}

/// Decode a collection document from a 2xx body, preserving server order.
pub(crate) fn decode_collection<T: DeserializeOwned>(
    bytes: &[u8],
) -> Result<CollectionDocument<T>> {
    serde_json::from_slice(bytes).map_err(|e| SdkError::MalformedResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Attrs {
        name: String,
    }

    #[test]
    fn resource_serializes_with_type_tag() {
        let resource = Resource::new("workspaces", Attrs { name: "prod".into() });
        let value = serde_json::to_value(&resource).unwrap();
        assert_eq!(value, json!({"type": "workspaces", "attributes": {"name": "prod"}}));
    }

    #[test]
    fn create_payload_omits_id_and_empty_relationships() {
        let document = Document {
            data: Resource::new("workspaces", Attrs { name: "prod".into() }),
        };
        let value = serde_json::to_value(&document).unwrap();
        assert!(value["data"].get("id").is_none());
        assert!(value["data"].get("relationships").is_none());
    }

    #[test]
    fn relationship_round_trips() {
        let resource = Resource::new("workspaces", Attrs { name: "prod".into() })
            .with_relationship("organization", Relationship::to_one("organizations", "acme"));

        let value = serde_json::to_value(&resource).unwrap();
        assert_eq!(
            value["relationships"]["organization"]["data"],
            json!({"type": "organizations", "id": "acme"})
        );

        let back: Resource<Attrs> = serde_json::from_value(value).unwrap();
        let related = back.related_id("organization").unwrap();
        assert_eq!(related.kind, "organizations");
        assert_eq!(related.id, "acme");
    }

    #[test]
    fn decode_single_reads_server_document() {
        let body = json!({
            "data": {
                "type": "workspaces",
                "id": "ws-1",
                "attributes": {"name": "prod"}
            }
        });
        let resource: Resource<Attrs> =
            decode_single(body.to_string().as_bytes()).unwrap();
        assert_eq!(resource.id(), "ws-1");
        assert_eq!(resource.attributes.name, "prod");
    }

    #[test]
    fn decode_collection_preserves_order() {
        let body = json!({
            "data": [
                {"type": "workspaces", "id": "ws-2", "attributes": {"name": "b"}},
                {"type": "workspaces", "id": "ws-1", "attributes": {"name": "a"}}
            ],
            "meta": {"pagination": {"current-page": 1, "total-pages": 1, "total-count": 2}}
        });
        let document: CollectionDocument<Attrs> =
            decode_collection(body.to_string().as_bytes()).unwrap();
        assert_eq!(document.data.len(), 2);
        assert_eq!(document.data[0].id(), "ws-2");
        assert_eq!(document.data[1].id(), "ws-1");
        let meta = document.meta.unwrap().pagination.unwrap();
        assert_eq!(meta.total_count, 2);
    }

    #[test]
    fn decode_single_rejects_non_document_body() {
        let err = decode_single::<Attrs>(b"not json").unwrap_err();
        assert!(matches!(err, SdkError::MalformedResponse(_)));
    }

    #[test]
    fn to_many_relationship_round_trips() {
        let relationship: Relationship = serde_json::from_value(json!({
            "data": [
                {"type": "runs", "id": "run-1"},
                {"type": "runs", "id": "run-2"}
            ]
        }))
        .unwrap();

        let built = Relationship::to_many(vec![
            ResourceIdentifier {
                kind: "runs".into(),
                id: "run-1".into(),
            },
            ResourceIdentifier {
                kind: "runs".into(),
                id: "run-2".into(),
            },
        ]);
        assert_eq!(built, relationship);

        match relationship.data.unwrap() {
            RelationshipData::Many(ids) => assert_eq!(ids.len(), 2),
            RelationshipData::One(_) => panic!("expected to-many linkage"),
        }
    }
}
