//! Contains the write models that make up a bulk write.

use serde::Serialize;
use serde_with::skip_serializing_none;

use crate::{
    bson::Document,
    bson_util,
    collation::Collation,
    error::Result,
    options::{Hint, UpdateModifications},
};

/// A single write to perform as part of a bulk write.
///
/// A model's position in the list passed to [`BulkWrite`](crate::BulkWrite) is its identity: any
/// error the server reports for it is surfaced under that index regardless of how the list is
/// combined and split for dispatch.
#[skip_serializing_none]
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
#[non_exhaustive]
pub enum WriteModel {
    /// Inserts a single document.
    #[non_exhaustive]
    InsertOne {
        /// The document to insert.
        document: Document,
    },

    /// Updates the first document matching a filter.
    #[non_exhaustive]
    #[serde(rename_all = "camelCase")]
    UpdateOne {
        /// The filter selecting the document to update.
        filter: Document,

        /// The modifications to apply.
        #[serde(rename = "updateMods")]
        update: UpdateModifications,

        /// Whether to insert a document if no document matches the filter.
        upsert: Option<bool>,

        /// The collation to use for filter comparisons.
        collation: Option<Collation>,

        /// Filters selecting the array elements `$[<identifier>]` operators apply to.
        array_filters: Option<Vec<Document>>,

        /// The index for the server to use for the filter.
        hint: Option<Hint>,
    },

    /// Updates all documents matching a filter.
    #[non_exhaustive]
    #[serde(rename_all = "camelCase")]
    UpdateMany {
        /// The filter selecting the documents to update.
        filter: Document,

        /// The modifications to apply.
        #[serde(rename = "updateMods")]
        update: UpdateModifications,

        /// Whether to insert a document if no document matches the filter.
        upsert: Option<bool>,

        /// The collation to use for filter comparisons.
        collation: Option<Collation>,

        /// Filters selecting the array elements `$[<identifier>]` operators apply to.
        array_filters: Option<Vec<Document>>,

        /// The index for the server to use for the filter.
        hint: Option<Hint>,
    },

    /// Replaces the first document matching a filter.
    #[non_exhaustive]
    ReplaceOne {
        /// The filter selecting the document to replace.
        filter: Document,

        /// The replacement document. Must not contain update operators.
        replacement: Document,

        /// Whether to insert the replacement if no document matches the filter.
        upsert: Option<bool>,

        /// The collation to use for filter comparisons.
        collation: Option<Collation>,

        /// The index for the server to use for the filter.
        hint: Option<Hint>,
    },

    /// Deletes the first document matching a filter.
    #[non_exhaustive]
    DeleteOne {
        /// The filter selecting the document to delete.
        filter: Document,

        /// The collation to use for filter comparisons.
        collation: Option<Collation>,

        /// The index for the server to use for the filter.
        hint: Option<Hint>,
    },

    /// Deletes all documents matching a filter.
    #[non_exhaustive]
    DeleteMany {
        /// The filter selecting the documents to delete.
        filter: Document,

        /// The collation to use for filter comparisons.
        collation: Option<Collation>,

        /// The index for the server to use for the filter.
        hint: Option<Hint>,
    },
}

impl WriteModel {
    /// The kind of this model.
    pub fn kind(&self) -> WriteModelKind {
        match self {
            Self::InsertOne { .. } => WriteModelKind::InsertOne,
            Self::UpdateOne { .. } => WriteModelKind::UpdateOne,
            Self::UpdateMany { .. } => WriteModelKind::UpdateMany,
            Self::ReplaceOne { .. } => WriteModelKind::ReplaceOne,
            Self::DeleteOne { .. } => WriteModelKind::DeleteOne,
            Self::DeleteMany { .. } => WriteModelKind::DeleteMany,
        }
    }

    pub(crate) fn collation(&self) -> Option<&Collation> {
        match self {
            Self::InsertOne { .. } => None,
            Self::UpdateOne { collation, .. }
            | Self::UpdateMany { collation, .. }
            | Self::ReplaceOne { collation, .. }
            | Self::DeleteOne { collation, .. }
            | Self::DeleteMany { collation, .. } => collation.as_ref(),
        }
    }

    pub(crate) fn array_filters(&self) -> Option<&[Document]> {
        match self {
            Self::UpdateOne { array_filters, .. } | Self::UpdateMany { array_filters, .. } => {
                array_filters.as_deref()
            }
            _ => None,
        }
    }

    pub(crate) fn hint(&self) -> Option<&Hint> {
        match self {
            Self::InsertOne { .. } => None,
            Self::UpdateOne { hint, .. }
            | Self::UpdateMany { hint, .. }
            | Self::ReplaceOne { hint, .. }
            | Self::DeleteOne { hint, .. }
            | Self::DeleteMany { hint, .. } => hint.as_ref(),
        }
    }

    /// Rejects models the server would be unable to apply, before any combining or dispatch.
    pub(crate) fn validate(&self) -> Result<()> {
        match self {
            Self::UpdateOne { update, .. } | Self::UpdateMany { update, .. } => {
                if let UpdateModifications::Document(document) = update {
                    bson_util::update_document_check(document)?;
                }
            }
            Self::ReplaceOne { replacement, .. } => {
                bson_util::replacement_document_check(replacement)?;
            }
            _ => {}
        }
        Ok(())
    }
}

/// The kind of a [`WriteModel`]. Models of the same kind can be dispatched together in one batch.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum WriteModelKind {
    /// See [`WriteModel::InsertOne`].
    InsertOne,
    /// See [`WriteModel::UpdateOne`].
    UpdateOne,
    /// See [`WriteModel::UpdateMany`].
    UpdateMany,
    /// See [`WriteModel::ReplaceOne`].
    ReplaceOne,
    /// See [`WriteModel::DeleteOne`].
    DeleteOne,
    /// See [`WriteModel::DeleteMany`].
    DeleteMany,
}

impl WriteModelKind {
    /// The name of the server-side command that executes writes of this kind.
    pub fn command_name(&self) -> &'static str {
        match self {
            Self::InsertOne => "insert",
            Self::UpdateOne | Self::UpdateMany | Self::ReplaceOne => "update",
            Self::DeleteOne | Self::DeleteMany => "delete",
        }
    }

    /// Whether writes of this kind affect at most one document and may therefore carry a
    /// retryable-write transaction number. Multi-statement kinds never carry one.
    pub fn is_single_statement(&self) -> bool {
        match self {
            Self::InsertOne | Self::UpdateOne | Self::ReplaceOne | Self::DeleteOne => true,
            Self::UpdateMany | Self::DeleteMany => false,
        }
    }
}

/// A [`WriteModel`] tagged with its position in the original request list.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct IndexedModel {
    /// Position of the model in the list the caller provided.
    pub index: usize,

    /// The write itself.
    pub model: WriteModel,
}
