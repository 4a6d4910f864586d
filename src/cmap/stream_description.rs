use std::time::Duration;

const SERVER_2_6_0_WIRE_VERSION: i32 = 2;
const SERVER_3_4_0_WIRE_VERSION: i32 = 5;
const SERVER_3_6_0_WIRE_VERSION: i32 = 6;
const SERVER_4_2_0_WIRE_VERSION: i32 = 8;

/// Contains information about a given server in a format digestible by the execution engine.
/// Implementors populate this from their handshake with the server.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct StreamDescription {
    /// The maximum wire version that the server understands.
    pub max_wire_version: i32,

    /// The maximum number of inserts, updates, or deletes that can be included in a single
    /// dispatched batch. If more writes than this are included, the server cannot guarantee space
    /// in the response document to reply to the batch.
    pub max_write_batch_size: usize,

    /// The maximum size in bytes of a single document in a write payload.
    pub max_bson_object_size: i64,

    /// The maximum permitted size of a wire protocol message.
    pub max_message_size_bytes: i64,

    /// How long sessions started on this server will stay alive without executing an operation
    /// before the server kills them. `None` indicates the server does not support sessions.
    pub logical_session_timeout: Option<Duration>,
}

impl StreamDescription {
    /// Whether this server reports write errors per command reply rather than per legacy
    /// statement reply. Decides which reply adapter interprets raw replies for the call.
    pub fn supports_write_commands(&self) -> bool {
        self.max_wire_version >= SERVER_2_6_0_WIRE_VERSION
    }

    /// Whether this server supports per-operation collations.
    pub fn supports_collation(&self) -> bool {
        self.max_wire_version >= SERVER_3_4_0_WIRE_VERSION
    }

    /// Whether this server supports `arrayFilters` on update operations.
    pub fn supports_array_filters(&self) -> bool {
        self.max_wire_version >= SERVER_3_6_0_WIRE_VERSION
    }

    /// Whether this server validates `hint` values on write operations. Servers older than this
    /// silently ignore hints, so sending one would give no indication it was not honored.
    pub fn supports_hint_validation(&self) -> bool {
        self.max_wire_version >= SERVER_4_2_0_WIRE_VERSION
    }

    /// Whether this server supports retryable writes.
    pub fn supports_retryable_writes(&self) -> bool {
        self.logical_session_timeout.is_some()
            && self.max_wire_version >= SERVER_3_6_0_WIRE_VERSION
    }

    /// Gets a description of a stream for a connection to a server with the provided
    /// maxWireVersion and default size limits.
    pub fn with_wire_version(max_wire_version: i32) -> Self {
        Self {
            max_wire_version,
            max_write_batch_size: 100_000,
            max_bson_object_size: 16 * 1024 * 1024,
            max_message_size_bytes: 48_000_000,
            logical_session_timeout: Some(Duration::from_secs(30 * 60)),
        }
    }

    /// Gets a description of a stream for a 4.2 connection.
    #[cfg(test)]
    pub(crate) fn new_testing() -> Self {
        Self::with_wire_version(SERVER_4_2_0_WIRE_VERSION)
    }
}
