//! Contains the bulk write execution engine.

pub(crate) mod combine;
pub(crate) mod executor;
pub mod models;
pub(crate) mod reply;
pub(crate) mod result_combiner;

use std::sync::atomic::{AtomicU64, Ordering};

use crate::{
    bson_util,
    cache::QueryCache,
    cmap::{Connection, ConnectionPool},
    error::{Error, Result},
    options::{BulkWriteOptions, IdGenerator, ObjectIdGenerator},
    results::BulkWriteResult,
    session::ClientSession,
    Namespace,
};

use self::{
    combine::{combine_ordered, combine_unordered},
    executor::OperationExecutor,
    models::WriteModel,
    reply::{select_adapter, ReplyAdapter},
    result_combiner::ResultCombiner,
};

pub(crate) const COMMAND_TRACING_TARGET: &str = "mongodb_bulkwrite::command";

static NEXT_OPERATION_ID: AtomicU64 = AtomicU64::new(0);

/// Performs multiple write operations against a collection in as few round trips as possible.
///
/// Writes of the same kind are combined into batches; batches that exceed the server's advertised
/// limits are split and redispatched transparently. The returned
/// [`BulkWriteResult`](crate::results::BulkWriteResult) reports counts and errors in terms of the
/// original list of models, never in terms of the batches actually dispatched.
#[must_use]
pub struct BulkWrite<'a, P: ConnectionPool> {
    pool: &'a P,
    namespace: Namespace,
    models: Vec<WriteModel>,
    options: BulkWriteOptions,
    session: Option<&'a mut ClientSession>,
    cache: Option<&'a dyn QueryCache>,
}

impl<'a, P: ConnectionPool> BulkWrite<'a, P> {
    /// Creates a bulk write of the given models against `namespace`, dispatching over connections
    /// checked out from `pool`.
    pub fn new(pool: &'a P, namespace: Namespace, models: Vec<WriteModel>) -> Self {
        Self {
            pool,
            namespace,
            models,
            options: BulkWriteOptions::default(),
            session: None,
            cache: None,
        }
    }

    /// Sets the options for this bulk write.
    pub fn with_options(mut self, options: BulkWriteOptions) -> Self {
        self.options = options;
        self
    }

    /// Runs the bulk write within the given session, enabling retryable-write transaction numbers
    /// for batches consisting of single-document writes.
    pub fn session(mut self, session: &'a mut ClientSession) -> Self {
        self.session = Some(session);
        self
    }

    /// Registers a query cache to invalidate before each dispatched batch.
    pub fn cache(mut self, cache: &'a dyn QueryCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Executes the bulk write.
    ///
    /// For an acknowledged write concern, any write error, write concern error, or transport
    /// fault surfaces as [`ErrorKind::BulkWrite`](crate::error::ErrorKind::BulkWrite) carrying
    /// the partial result accumulated before the call ended. For an unacknowledged write concern
    /// the call succeeds with a zeroed result as soon as every batch has been handed off.
    pub async fn execute(mut self) -> Result<BulkWriteResult> {
        let operation_id = NEXT_OPERATION_ID.fetch_add(1, Ordering::SeqCst);

        if self.models.is_empty() {
            return Err(Error::invalid_argument(
                "bulk write must contain at least one write",
            ));
        }
        if let Some(write_concern) = self.options.write_concern.as_ref() {
            write_concern.validate()?;
        }
        for model in &self.models {
            model.validate()?;
        }

        let default_generator = ObjectIdGenerator;
        let generator: &dyn IdGenerator = self
            .options
            .id_generator
            .as_deref()
            .unwrap_or(&default_generator);
        for model in &mut self.models {
            if let WriteModel::InsertOne { document } = model {
                bson_util::get_or_insert_id(document, generator);
            }
        }

        let ordered = self.options.is_ordered();
        let acknowledged = self.options.is_acknowledged();

        tracing::debug!(
            target: COMMAND_TRACING_TARGET,
            operation_id,
            namespace = %self.namespace,
            model_count = self.models.len(),
            ordered,
            acknowledged,
            "executing bulk write"
        );

        let operations = if ordered {
            combine_ordered(self.models)
        } else {
            combine_unordered(self.models)
        };

        let mut combiner = ResultCombiner::new(acknowledged);
        let mut adapter: Option<Box<dyn ReplyAdapter>> = None;
        let mut fault: Option<Error> = None;

        for operation in &operations {
            let mut connection = match self.pool.check_out().await {
                Ok(connection) => connection,
                Err(error) => {
                    if ordered {
                        fault = Some(error);
                        break;
                    }
                    fault.get_or_insert(error);
                    continue;
                }
            };

            // The reply protocol is negotiated once per call, from the first connection.
            let adapter_ref: &dyn ReplyAdapter = &**adapter.get_or_insert_with(|| {
                select_adapter(connection.stream_description(), acknowledged)
            });

            let mut executor = OperationExecutor {
                connection: &mut connection,
                adapter: adapter_ref,
                namespace: &self.namespace,
                options: &self.options,
                session: self.session.as_deref_mut(),
                cache: self.cache,
                combiner: &mut combiner,
                operation_id,
            };

            match executor.execute(operation).await {
                Ok(()) => {
                    // In ordered mode a failed write blocks every write positioned after it,
                    // which is everything in the remaining combined operations.
                    if ordered && combiner.has_write_errors() {
                        break;
                    }
                }
                Err(error) if error.is_invalid_argument() => return Err(error),
                Err(error) => {
                    if ordered {
                        fault = Some(error);
                        break;
                    }
                    fault.get_or_insert(error);
                }
            }
        }

        combiner.finish(fault)
    }
}
