use crate::{
    error::{Result, ZanzibarError},
    schema,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Typed reference to a backend object, e.g. `workspace:aspian_root`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectReference {
    pub object_type: String,
    pub object_id: String,
}

impl ObjectReference {
    pub fn new(object_type: &str, object_id: &str) -> Self {
        Self {
            object_type: object_type.to_string(),
            object_id: object_id.to_string(),
        }
    }
}

impl fmt::Display for ObjectReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.object_type, self.object_id)
    }
}

/// Subject of a relationship: an object, optionally narrowed to one of its
/// relations (a userset such as `group:g1#member`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectReference {
    pub object: ObjectReference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional_relation: Option<String>,
}

impl SubjectReference {
    pub fn new(object_type: &str, object_id: &str) -> Self {
        Self {
            object: ObjectReference::new(object_type, object_id),
            optional_relation: None,
        }
    }

    pub fn user(user_id: &str) -> Self {
        Self::new(schema::USER, user_id)
    }

    /// Every user, `user:*`
    pub fn all_users() -> Self {
        Self::new(schema::USER, schema::WILDCARD)
    }

    pub fn userset(object_type: &str, object_id: &str, relation: &str) -> Self {
        Self {
            object: ObjectReference::new(object_type, object_id),
            optional_relation: Some(relation.to_string()),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.object.object_id == schema::WILDCARD && self.optional_relation.is_none()
    }
}

impl fmt::Display for SubjectReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.optional_relation {
            Some(ref relation) => write!(f, "{}#{}", self.object, relation),
            None => write!(f, "{}", self.object),
        }
    }
}

/// A relationship tuple: `resource#relation@subject`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Relationship {
    pub resource: ObjectReference,
    pub relation: String,
    pub subject: SubjectReference,
}

impl Relationship {
    pub fn new(resource: ObjectReference, relation: &str, subject: SubjectReference) -> Self {
        Self {
            resource,
            relation: relation.to_string(),
            subject,
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}@{}", self.resource, self.relation, self.subject)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpdateOperation {
    /// Upsert: create the relationship if absent, no-op otherwise
    #[serde(rename = "OPERATION_TOUCH")]
    Touch,
    #[serde(rename = "OPERATION_DELETE")]
    Delete,
}

/// One entry of an atomic write batch
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationshipUpdate {
    pub operation: UpdateOperation,
    pub relationship: Relationship,
}

impl RelationshipUpdate {
    pub fn touch(relationship: Relationship) -> Self {
        Self {
            operation: UpdateOperation::Touch,
            relationship,
        }
    }

    pub fn delete(relationship: Relationship) -> Self {
        Self {
            operation: UpdateOperation::Delete,
            relationship,
        }
    }
}

impl fmt::Display for RelationshipUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.operation {
            UpdateOperation::Touch => "touch",
            UpdateOperation::Delete => "delete",
        };
        write!(f, "{} {}", op, self.relationship)
    }
}

/// Outcome of a permission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permissionship {
    HasPermission,
    NoPermission,
}

impl Permissionship {
    pub fn is_granted(self) -> bool {
        self == Permissionship::HasPermission
    }
}

/// Filter for reading stored relationships. `None` fields match anything.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RelationshipFilter {
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub subject_type: Option<String>,
}

impl RelationshipFilter {
    pub fn new(resource_type: &str) -> Self {
        Self {
            resource_type: resource_type.to_string(),
            ..Default::default()
        }
    }

    pub fn with_resource_id(mut self, resource_id: &str) -> Self {
        self.resource_id = Some(resource_id.to_string());
        self
    }

    pub fn with_subject_type(mut self, subject_type: &str) -> Self {
        self.subject_type = Some(subject_type.to_string());
        self
    }

    pub fn matches(&self, relationship: &Relationship) -> bool {
        if relationship.resource.object_type != self.resource_type {
            return false;
        }

        if let Some(ref id) = self.resource_id {
            if relationship.resource.object_id != *id {
                return false;
            }
        }

        if let Some(ref subject_type) = self.subject_type {
            if relationship.subject.object.object_type != *subject_type {
                return false;
            }
        }

        true
    }
}

/// The identity a request acts for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub org: String,
    pub username: String,
}

impl Principal {
    pub fn new(org: &str, username: &str) -> Result<Self> {
        let org = org.trim();
        let username = username.trim();

        if org.is_empty() {
            return Err(ZanzibarError::ValidationError("org must not be empty".to_string()));
        }
        if username.is_empty() {
            return Err(ZanzibarError::ValidationError("username must not be empty".to_string()));
        }

        Ok(Self {
            org: org.to_string(),
            username: username.to_string(),
        })
    }

    /// Id of the org's root workspace, against which unrestricted grants
    /// are checked
    pub fn root_workspace(&self) -> String {
        format!("{}{}", self.org, schema::ROOT_WORKSPACE_SUFFIX)
    }

    pub fn root_workspace_ref(&self) -> ObjectReference {
        ObjectReference::new(schema::WORKSPACE, &self.root_workspace())
    }

    pub fn subject(&self) -> SubjectReference {
        SubjectReference::user(&self.username)
    }
}

/// Parse a role or group identifier, rejecting anything that is not a UUID
/// before it reaches the backend.
pub fn parse_object_id(kind: &str, raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| ZanzibarError::InvalidIdentifier(format!("invalid {} id '{}': expected a UUID", kind, raw)))
}
