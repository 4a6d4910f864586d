//! Contains the connection-facing contracts this crate consumes. Connection establishment,
//! pooling, server selection, and wire-format encoding are all owned by the implementor; the
//! execution engine only sees the surface defined here.

mod conn;
mod stream_description;

pub use self::{
    conn::{Connection, ConnectionPool, RawReply, WriteCommand},
    stream_description::StreamDescription,
};
