//! A batching execution engine for MongoDB-style bulk writes.
//!
//! This crate turns an arbitrary list of heterogeneous write models into the smallest number of
//! server round trips the wire protocol allows, while presenting results and errors to the caller
//! as if each write had been issued individually:
//!
//! - [`WriteModel`]s of the same kind are combined into batches: adjacent runs only in ordered
//!   mode, all models of a kind in unordered mode.
//! - Batches larger than the server's advertised `maxWriteBatchSize` are split up front; batches
//!   the server rejects as over its byte limits are split in half and redispatched.
//! - Single-document batches executed in a [`ClientSession`] are tagged with transaction numbers
//!   so the cluster can suppress duplicate application if an external retry layer re-sends them.
//! - Per-batch server replies, modern or legacy, are folded into one
//!   [`BulkWriteResult`](results::BulkWriteResult) whose counts and error indexes refer to the
//!   caller's original list of models.
//!
//! The engine does not own sockets. Callers provide the transport by implementing
//! [`ConnectionPool`](cmap::ConnectionPool) and [`Connection`](cmap::Connection), and drive a call
//! through [`BulkWrite`].

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub use bson;

pub mod bulk;
pub mod cache;
pub mod cmap;
pub mod collation;
pub mod concern;
pub mod error;
pub mod options;
pub mod results;

mod bson_util;
mod namespace;
mod serde_util;
mod session;


pub use crate::{
    bulk::{
        models::{IndexedModel, WriteModel, WriteModelKind},
        BulkWrite,
    },
    error::{Error, ErrorKind, Result},
    namespace::Namespace,
    session::ClientSession,
};
