use crate::{
    error::{BulkWriteFailure, Error, ErrorKind, Result},
    results::{BulkWriteResult, UpsertedId},
};

use super::reply::BatchSummary;

/// Accumulates batch summaries into one aggregate result, remapping batch-local indexes back to
/// positions in the caller's original list of write models.
#[derive(Debug)]
pub(crate) struct ResultCombiner {
    acknowledged: bool,
    result: BulkWriteResult,
}

impl ResultCombiner {
    pub(crate) fn new(acknowledged: bool) -> Self {
        Self {
            acknowledged,
            result: BulkWriteResult::default(),
        }
    }

    /// Folds one batch summary into the aggregate. `indexes` maps batch-local positions to
    /// original request positions for the batch the summary describes; a reply referencing a
    /// position outside the dispatched batch is malformed and fails the fold.
    pub(crate) fn combine(&mut self, mut summary: BatchSummary, indexes: &[usize]) -> Result<()> {
        if self.acknowledged {
            self.result.inserted_count += summary.inserted_count;
            self.result.matched_count += summary.matched_count;
            self.result.modified_count += summary.modified_count;
            self.result.deleted_count += summary.deleted_count;

            for (local_index, id) in summary.upserted.drain(..) {
                let index = remap(indexes, local_index)?;
                self.result.upserted_count += 1;
                self.result.upserted_ids.push(UpsertedId { index, id });
            }

            for mut error in summary.write_errors.drain(..) {
                error.index = remap(indexes, error.index)?;
                self.result.write_errors.push(error);
            }

            self.result
                .write_concern_errors
                .append(&mut summary.write_concern_errors);
        }
        Ok(())
    }

    /// Whether any write error has been recorded so far. Write concern errors do not count; the
    /// underlying writes applied.
    pub(crate) fn has_write_errors(&self) -> bool {
        !self.result.write_errors.is_empty()
    }

    /// Consumes the combiner, producing the final outcome of the call. A transport fault that
    /// ended the call early is folded in as the failure's `source`.
    pub(crate) fn finish(self, source: Option<Error>) -> Result<BulkWriteResult> {
        if !self.acknowledged {
            // Unacknowledged calls report success with zeroed counts no matter what individual
            // replies or faults occurred.
            return Ok(self.result);
        }
        if self.result.has_errors() || source.is_some() {
            let labels: Vec<String> = source
                .as_ref()
                .map(|err| err.labels().to_vec())
                .unwrap_or_default();
            let failure = BulkWriteFailure {
                write_errors: self.result.write_errors.clone(),
                write_concern_errors: self.result.write_concern_errors.clone(),
                partial_result: Some(self.result),
                source: source.map(Box::new),
            };
            return Err(Error::new(ErrorKind::BulkWrite(failure), Some(labels)));
        }
        Ok(self.result)
    }
}

fn remap(indexes: &[usize], local_index: usize) -> Result<usize> {
    indexes.get(local_index).copied().ok_or_else(|| {
        Error::internal(format!(
            "server reply referenced index {} in a batch of {} writes",
            local_index,
            indexes.len(),
        ))
    })
}
