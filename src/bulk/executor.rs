use futures_core::future::BoxFuture;

use crate::{
    cache::QueryCache,
    cmap::{Connection, WriteCommand},
    error::{Error, Result},
    options::BulkWriteOptions,
    session::ClientSession,
    Namespace,
};

use super::{
    combine::CombinedOperation,
    models::{IndexedModel, WriteModelKind},
    reply::ReplyAdapter,
    result_combiner::ResultCombiner,
    COMMAND_TRACING_TARGET,
};

/// Drives one combined operation through a connection: validates capabilities against the
/// server's advertised wire version, splits oversized batches, tags retryable batches with
/// transaction numbers, and folds each reply into the aggregate result.
pub(crate) struct OperationExecutor<'a, C: Connection> {
    pub(crate) connection: &'a mut C,
    pub(crate) adapter: &'a dyn ReplyAdapter,
    pub(crate) namespace: &'a Namespace,
    pub(crate) options: &'a BulkWriteOptions,
    pub(crate) session: Option<&'a mut ClientSession>,
    pub(crate) cache: Option<&'a dyn QueryCache>,
    pub(crate) combiner: &'a mut ResultCombiner,
    pub(crate) operation_id: u64,
}

impl<C: Connection> OperationExecutor<'_, C> {
    pub(crate) async fn execute(&mut self, operation: &CombinedOperation) -> Result<()> {
        self.validate_capabilities(operation)?;
        let txn_number = self.next_txn_number(operation.kind);
        self.dispatch(operation.kind, &operation.models, txn_number)
            .await
    }

    /// Rejects the operation before any of it is dispatched if it uses a feature the connected
    /// server does not understand. Partially applying an operation the server would misinterpret
    /// is worse than failing it outright.
    fn validate_capabilities(&self, operation: &CombinedOperation) -> Result<()> {
        let description = self.connection.stream_description();
        if operation.uses_collation && !description.supports_collation() {
            return Err(Error::invalid_argument(
                "Specifying a collation is not supported by the connected server",
            ));
        }
        if operation.uses_array_filters && !description.supports_array_filters() {
            return Err(Error::invalid_argument(
                "Specifying array filters is not supported by the connected server",
            ));
        }
        if operation.uses_hint && !description.supports_hint_validation() {
            return Err(Error::invalid_argument(
                "Specifying a hint is not supported by the connected server",
            ));
        }
        // An unacknowledged server would silently drop an unsupported hint with no way to report
        // it back.
        if operation.uses_hint && !self.options.is_acknowledged() {
            return Err(Error::invalid_argument(
                "Specifying a hint requires an acknowledged write concern",
            ));
        }
        Ok(())
    }

    /// A transaction number is attached only when every write in the batch affects at most one
    /// document, the write concern is acknowledged, the server supports retryable writes, and a
    /// session was provided. Otherwise a retry could double-apply.
    fn next_txn_number(&mut self, kind: WriteModelKind) -> Option<u64> {
        if !kind.is_single_statement() || !self.options.is_acknowledged() {
            return None;
        }
        if !self.connection.stream_description().supports_retryable_writes() {
            return None;
        }
        self.session
            .as_deref_mut()
            .map(ClientSession::get_and_increment_txn_number)
    }

    /// Dispatches one batch, halving it when it cannot go out as-is. Splitting has two
    /// independent triggers: proactively when the batch holds more writes than the server's
    /// advertised batch size, and reactively when the server rejects the dispatched bytes as too
    /// large even though the count was within limits.
    fn dispatch<'b>(
        &'b mut self,
        kind: WriteModelKind,
        models: &'b [IndexedModel],
        txn_number: Option<u64>,
    ) -> BoxFuture<'b, Result<()>> {
        Box::pin(async move {
            let max_batch_size = self
                .connection
                .stream_description()
                .max_write_batch_size
                .max(1);
            if models.len() > max_batch_size {
                tracing::debug!(
                    target: COMMAND_TRACING_TARGET,
                    operation_id = self.operation_id,
                    batch_size = models.len(),
                    max_batch_size,
                    "batch exceeds advertised write batch size; splitting"
                );
                return self.split(kind, models, txn_number).await;
            }

            // A write may partially apply before a fault is observed, so cached reads for the
            // namespace are invalidated before every attempt, including redispatched halves.
            if let Some(cache) = self.cache {
                cache.clear_namespace(self.namespace);
            }

            tracing::debug!(
                target: COMMAND_TRACING_TARGET,
                operation_id = self.operation_id,
                command_name = kind.command_name(),
                batch_size = models.len(),
                txn_number,
                "dispatching write batch"
            );

            let command = WriteCommand {
                namespace: self.namespace,
                kind,
                models,
                ordered: self.options.is_ordered(),
                write_concern: self.options.write_concern.as_ref(),
                bypass_document_validation: self.options.bypass_document_validation,
                max_time: self.options.max_time,
                comment: self.options.comment.as_ref(),
                txn_number,
                operation_id: self.operation_id,
            };

            match self.connection.send_write(command).await {
                Ok(reply) => {
                    let summary = self.adapter.summarize(kind, &reply)?;
                    let indexes: Vec<usize> = models.iter().map(|m| m.index).collect();
                    self.combiner.combine(summary, &indexes)
                }
                Err(error) if error.is_size_exceeded() && models.len() > 1 => {
                    tracing::debug!(
                        target: COMMAND_TRACING_TARGET,
                        operation_id = self.operation_id,
                        batch_size = models.len(),
                        "batch exceeded server byte limits; splitting"
                    );
                    self.split(kind, models, txn_number).await
                }
                // A single write that exceeds the size limits cannot shrink further; its fault
                // surfaces like any other transport fault.
                Err(error) => Err(error),
            }
        })
    }

    /// Halves a batch and redispatches the halves in order. The left half keeps the batch's
    /// transaction number and the right half draws a fresh one; the halves target disjoint
    /// writes, so the cluster must not suppress either as a duplicate of the other.
    fn split<'b>(
        &'b mut self,
        kind: WriteModelKind,
        models: &'b [IndexedModel],
        txn_number: Option<u64>,
    ) -> BoxFuture<'b, Result<()>> {
        Box::pin(async move {
            let (left, right) = models.split_at(models.len().div_ceil(2));
            self.dispatch(kind, left, txn_number).await?;
            let right_txn_number = self.next_txn_number(kind);
            self.dispatch(kind, right, right_txn_number).await
        })
    }
}
