//! Contains the options that can be used to configure a bulk write.

use std::{fmt, sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use typed_builder::TypedBuilder;

use crate::{
    bson::{oid::ObjectId, Bson, Document},
    concern::WriteConcern,
    serde_util,
};

/// Specifies the options to a bulk write.
#[skip_serializing_none]
#[derive(Clone, Debug, Default, TypedBuilder, Serialize)]
#[serde(rename_all = "camelCase")]
#[builder(field_defaults(default, setter(into)))]
#[non_exhaustive]
pub struct BulkWriteOptions {
    /// Whether the writes are applied in the order given and whether a failed batch stops later
    /// batches from being issued.
    ///
    /// Defaults to true.
    pub ordered: Option<bool>,

    /// The write concern to apply to all of the writes.
    pub write_concern: Option<WriteConcern>,

    /// Opt out of document-level validation.
    pub bypass_document_validation: Option<bool>,

    /// The maximum amount of time the server should allow each dispatched batch to run. This is
    /// passed through to the server; no client-side timer is ever started.
    #[serde(rename = "maxTimeMS")]
    #[serde(serialize_with = "serde_util::serialize_duration_option_as_int_millis")]
    pub max_time: Option<Duration>,

    /// An arbitrary comment to attach to the dispatched commands for diagnostic purposes.
    pub comment: Option<Bson>,

    /// The generator used to populate the `_id` field of inserted documents that lack one.
    ///
    /// Defaults to [`ObjectIdGenerator`].
    #[serde(skip)]
    pub id_generator: Option<Arc<dyn IdGenerator>>,
}

impl BulkWriteOptions {
    pub(crate) fn is_ordered(&self) -> bool {
        self.ordered.unwrap_or(true)
    }

    pub(crate) fn is_acknowledged(&self) -> bool {
        self.write_concern
            .as_ref()
            .map_or(true, WriteConcern::is_acknowledged)
    }
}

/// Generates `_id` values for inserted documents that do not already have one.
pub trait IdGenerator: fmt::Debug + Send + Sync {
    /// Produces a new document id.
    fn generate(&self) -> Bson;
}

/// The default [`IdGenerator`], producing new [`ObjectId`]s.
#[derive(Clone, Copy, Debug, Default)]
pub struct ObjectIdGenerator;

impl IdGenerator for ObjectIdGenerator {
    fn generate(&self) -> Bson {
        Bson::ObjectId(ObjectId::new())
    }
}

/// An update to apply to matching documents: either a modification document containing update
/// operators or an aggregation pipeline.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
#[non_exhaustive]
pub enum UpdateModifications {
    /// A document containing only update operator expressions.
    Document(Document),

    /// An aggregation pipeline.
    Pipeline(Vec<Document>),
}

impl From<Document> for UpdateModifications {
    fn from(document: Document) -> Self {
        Self::Document(document)
    }
}

impl From<Vec<Document>> for UpdateModifications {
    fn from(pipeline: Vec<Document>) -> Self {
        Self::Pipeline(pipeline)
    }
}

/// Specifies the index to use for an operation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
#[non_exhaustive]
pub enum Hint {
    /// Specifies the keys of the index to use.
    Keys(Document),

    /// Specifies the name of the index to use.
    Name(String),
}
