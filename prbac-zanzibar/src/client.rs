use crate::{
    error::{Result, ZanzibarError},
    models::*,
};
use async_trait::async_trait;
use dashmap::DashMap;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use std::collections::HashSet;
use std::hash::Hash;
use std::sync::Arc;
use tracing::debug;

pub mod spicedb;

pub use spicedb::SpiceDbClient;

/// Finite, non-restartable sequence of results from a streaming backend
/// call. The stream ending is the end-of-stream marker; an `Err` item is
/// terminal.
pub type RelationshipStream<T> = BoxStream<'static, Result<T>>;

/// Primitives the relationship backend exposes to this crate
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RelationshipClient: Send + Sync {
    /// Does `subject` hold `permission` on `resource`?
    async fn check_permission(
        &self,
        resource: &ObjectReference,
        permission: &str,
        subject: &SubjectReference,
    ) -> Result<Permissionship>;

    /// Ids of every `resource_type` object on which `subject` holds
    /// `permission`
    async fn lookup_resources(
        &self,
        resource_type: &str,
        permission: &str,
        subject: &SubjectReference,
    ) -> Result<RelationshipStream<String>>;

    /// Ids of every `subject_object_type` subject holding `permission` on
    /// `resource`
    async fn lookup_subjects(
        &self,
        resource: &ObjectReference,
        permission: &str,
        subject_object_type: &str,
    ) -> Result<RelationshipStream<String>>;

    async fn read_relationships(
        &self,
        filter: &RelationshipFilter,
    ) -> Result<RelationshipStream<Relationship>>;

    /// Apply all updates atomically
    async fn write_relationships(&self, updates: Vec<RelationshipUpdate>) -> Result<()>;
}

/// Drain a stream to completion, failing on the first error item.
pub async fn collect_stream<T>(stream: RelationshipStream<T>) -> Result<Vec<T>> {
    stream.try_collect().await
}

/// Drain a stream, keeping the first occurrence of every item.
pub async fn collect_distinct<T>(stream: RelationshipStream<T>) -> Result<Vec<T>>
where
    T: Clone + Eq + Hash,
{
    let items = collect_stream(stream).await?;
    let mut seen = HashSet::with_capacity(items.len());
    Ok(items.into_iter().filter(|item| seen.insert(item.clone())).collect())
}

/// Wrap already materialised results as a stream
pub fn stream_from_results<T: Send + 'static>(items: Vec<Result<T>>) -> RelationshipStream<T> {
    stream::iter(items).boxed()
}

/// In-process relationship store for development and tests.
///
/// Permissions are evaluated as direct relations: `check_permission` and
/// the lookups match stored tuples whose relation equals the requested
/// permission, honouring `type:*` wildcard subjects. No schema rewrites
/// are applied.
pub struct InMemoryRelationshipClient {
    relationships: Arc<DashMap<String, Relationship>>,
}

impl InMemoryRelationshipClient {
    pub fn new() -> Self {
        Self {
            relationships: Arc::new(DashMap::new()),
        }
    }

    pub fn with_relationships(relationships: impl IntoIterator<Item = Relationship>) -> Self {
        let client = Self::new();
        for relationship in relationships {
            client.touch(relationship);
        }
        client
    }

    pub fn touch(&self, relationship: Relationship) {
        self.relationships.insert(relationship.to_string(), relationship);
    }

    /// Sorted snapshot of every stored relationship
    pub fn relationships(&self) -> Vec<Relationship> {
        let mut all: Vec<Relationship> = self
            .relationships
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        all.sort();
        all
    }

    pub fn contains(&self, relationship: &Relationship) -> bool {
        self.relationships.contains_key(&relationship.to_string())
    }

    pub fn len(&self) -> usize {
        self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }

    fn subject_matches(stored: &SubjectReference, requested: &SubjectReference) -> bool {
        if stored == requested {
            return true;
        }
        stored.is_wildcard()
            && requested.optional_relation.is_none()
            && stored.object.object_type == requested.object.object_type
    }

    fn sorted_ids(mut ids: Vec<String>) -> Vec<String> {
        ids.sort();
        ids.dedup();
        ids
    }
}

impl Default for InMemoryRelationshipClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RelationshipClient for InMemoryRelationshipClient {
    async fn check_permission(
        &self,
        resource: &ObjectReference,
        permission: &str,
        subject: &SubjectReference,
    ) -> Result<Permissionship> {
        let granted = self.relationships.iter().any(|entry| {
            let rel = entry.value();
            rel.resource == *resource
                && rel.relation == permission
                && Self::subject_matches(&rel.subject, subject)
        });

        debug!("In-memory check {}#{}@{}: {}", resource, permission, subject, granted);

        Ok(if granted {
            Permissionship::HasPermission
        } else {
            Permissionship::NoPermission
        })
    }

    async fn lookup_resources(
        &self,
        resource_type: &str,
        permission: &str,
        subject: &SubjectReference,
    ) -> Result<RelationshipStream<String>> {
        let ids = self
            .relationships
            .iter()
            .filter(|entry| {
                let rel = entry.value();
                rel.resource.object_type == resource_type
                    && rel.relation == permission
                    && Self::subject_matches(&rel.subject, subject)
            })
            .map(|entry| entry.value().resource.object_id.clone())
            .collect();

        Ok(stream_from_results(Self::sorted_ids(ids).into_iter().map(Ok).collect()))
    }

    async fn lookup_subjects(
        &self,
        resource: &ObjectReference,
        permission: &str,
        subject_object_type: &str,
    ) -> Result<RelationshipStream<String>> {
        let ids = self
            .relationships
            .iter()
            .filter(|entry| {
                let rel = entry.value();
                rel.resource == *resource
                    && rel.relation == permission
                    && rel.subject.object.object_type == subject_object_type
            })
            .map(|entry| entry.value().subject.object.object_id.clone())
            .collect();

        Ok(stream_from_results(Self::sorted_ids(ids).into_iter().map(Ok).collect()))
    }

    async fn read_relationships(
        &self,
        filter: &RelationshipFilter,
    ) -> Result<RelationshipStream<Relationship>> {
        let matching = self
            .relationships()
            .into_iter()
            .filter(|rel| filter.matches(rel))
            .map(Ok)
            .collect();

        Ok(stream_from_results(matching))
    }

    async fn write_relationships(&self, updates: Vec<RelationshipUpdate>) -> Result<()> {
        for update in updates {
            let key = update.relationship.to_string();
            match update.operation {
                UpdateOperation::Touch => {
                    self.relationships.insert(key, update.relationship);
                }
                UpdateOperation::Delete => {
                    self.relationships.remove(&key);
                }
            }
        }
        Ok(())
    }
}

/// Stream whose only item is `error`, as after a broken connection
#[cfg(test)]
pub(crate) fn failed_stream<T: Send + 'static>(error: ZanzibarError) -> RelationshipStream<T> {
    stream_from_results(vec![Err(error)])
}
