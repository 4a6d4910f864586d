use std::time::Duration;

use futures_core::future::BoxFuture;

use crate::{
    bson::{Bson, Document},
    bulk::models::{IndexedModel, WriteModelKind},
    concern::WriteConcern,
    error::Result,
    Namespace,
};

use super::StreamDescription;

/// One batch of homogeneous writes handed to a [`Connection`] for dispatch. Payload encoding is
/// owned by the connection; the engine guarantees `models` respects the connection's advertised
/// `max_write_batch_size`.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct WriteCommand<'a> {
    /// The collection targeted by every write in the batch.
    pub namespace: &'a Namespace,

    /// The kind of write every model in the batch shares.
    pub kind: WriteModelKind,

    /// The writes to dispatch, tagged with their positions in the original request list.
    pub models: &'a [IndexedModel],

    /// Whether the server should stop processing the batch at the first failing write.
    pub ordered: bool,

    /// The write concern for the batch, passed through unmodified.
    pub write_concern: Option<&'a WriteConcern>,

    /// Opt out of server-side document validation.
    pub bypass_document_validation: Option<bool>,

    /// Server-side time limit for the batch.
    pub max_time: Option<Duration>,

    /// Arbitrary comment attached to the command.
    pub comment: Option<&'a Bson>,

    /// The retryable-write transaction number, present only for single-statement kinds dispatched
    /// under an acknowledged write concern to a server supporting retryable writes.
    pub txn_number: Option<u64>,

    /// Correlation id tying together every batch dispatched by one bulk write call.
    pub operation_id: u64,
}

/// One server response for one dispatched batch.
///
/// Command-protocol servers reply with exactly one document; legacy servers acknowledge each
/// statement separately, producing one document per write.
#[derive(Clone, Debug)]
pub struct RawReply {
    /// The raw reply documents, in statement order for legacy replies.
    pub documents: Vec<Document>,
}

impl RawReply {
    /// A reply for a command-protocol response.
    pub fn command(document: Document) -> Self {
        Self {
            documents: vec![document],
        }
    }

    /// A reply made of per-statement legacy acknowledgments.
    pub fn legacy(documents: Vec<Document>) -> Self {
        Self { documents }
    }
}

/// An established connection to a server, exposing the server's advertised limits and a dispatch
/// operation. Implementations own encoding, socket I/O, and timeouts; a batch that cannot be
/// encoded within the server's size limits must fail with
/// [`Error::size_exceeded`](crate::error::Error::size_exceeded) so the engine can split and
/// redispatch it.
pub trait Connection: Send {
    /// The server metadata negotiated when this connection was established.
    fn stream_description(&self) -> &StreamDescription;

    /// Dispatches one batch and resolves with the server's raw reply.
    fn send_write<'a>(&'a mut self, command: WriteCommand<'a>) -> BoxFuture<'a, Result<RawReply>>;
}

/// Source of connections for write dispatch. Checking out may suspend until a connection is
/// available or fail once the implementor's selection timeout elapses.
pub trait ConnectionPool: Send + Sync {
    /// The connection type produced by this pool.
    type Conn: Connection;

    /// Checks out a connection to the server that should execute the next batch.
    fn check_out(&self) -> BoxFuture<'_, Result<Self::Conn>>;
}
