//! Contains the types of results returned by a bulk write.

use serde::{Deserialize, Serialize};

use crate::{
    bson::Bson,
    error::{BulkWriteError, WriteConcernError},
};

/// The aggregate result of a bulk write. Counts are sums over every batch the server acknowledged;
/// indexes in [`upserted_ids`](BulkWriteResult::upserted_ids) and
/// [`write_errors`](BulkWriteResult::write_errors) refer to positions in the original list of
/// write models, not to positions within any dispatched batch.
///
/// For an unacknowledged write concern all counts are 0 and the error lists are empty.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct BulkWriteResult {
    /// The number of documents that were inserted.
    pub inserted_count: u64,

    /// The number of documents that matched an update or replace filter.
    pub matched_count: u64,

    /// The number of documents that were modified.
    pub modified_count: u64,

    /// The number of documents that were upserted.
    pub upserted_count: u64,

    /// The number of documents that were deleted.
    pub deleted_count: u64,

    /// The `_id` values of the upserted documents.
    pub upserted_ids: Vec<UpsertedId>,

    /// The errors that occurred for individual writes.
    pub write_errors: Vec<BulkWriteError>,

    /// The write concern errors that occurred.
    pub write_concern_errors: Vec<WriteConcernError>,
}

impl BulkWriteResult {
    /// Whether any document-level or write-concern error was recorded.
    pub fn has_errors(&self) -> bool {
        !self.write_errors.is_empty() || !self.write_concern_errors.is_empty()
    }
}

/// The `_id` of a document upserted by an update or replace.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[non_exhaustive]
pub struct UpsertedId {
    /// Index into the original list of write models of the write that upserted.
    pub index: usize,

    /// The `_id` of the upserted document.
    #[serde(rename = "_id")]
    pub id: Bson,
}
