use super::models::{IndexedModel, WriteModel, WriteModelKind};

/// A maximal run of same-kind writes that can be dispatched with one command, tagged with the
/// capability usage the pre-dispatch validators need.
#[derive(Debug)]
pub(crate) struct CombinedOperation {
    pub(crate) kind: WriteModelKind,
    pub(crate) models: Vec<IndexedModel>,
    pub(crate) uses_collation: bool,
    pub(crate) uses_array_filters: bool,
    pub(crate) uses_hint: bool,
}

impl CombinedOperation {
    fn new(kind: WriteModelKind) -> Self {
        Self {
            kind,
            models: Vec::new(),
            uses_collation: false,
            uses_array_filters: false,
            uses_hint: false,
        }
    }

    fn push(&mut self, index: usize, model: WriteModel) {
        self.uses_collation |= model.collation().is_some();
        self.uses_array_filters |= model.array_filters().is_some();
        self.uses_hint |= model.hint().is_some();
        self.models.push(IndexedModel { index, model });
    }
}

/// Combines adjacent same-kind models only. Flattening the output reproduces the input exactly,
/// so ordered execution never dispatches a write whose original position could follow a write
/// that has not been confirmed yet.
pub(crate) fn combine_ordered(models: Vec<WriteModel>) -> Vec<CombinedOperation> {
    let mut operations: Vec<CombinedOperation> = Vec::new();
    for (index, model) in models.into_iter().enumerate() {
        match operations.last_mut() {
            Some(current) if current.kind == model.kind() => current.push(index, model),
            _ => {
                let mut operation = CombinedOperation::new(model.kind());
                operation.push(index, model);
                operations.push(operation);
            }
        }
    }
    operations
}

/// Groups all models of a kind together regardless of position, minimizing round trips to one
/// per distinct kind. Flattening the output reproduces the input as a multiset; kinds appear in
/// order of first occurrence.
pub(crate) fn combine_unordered(models: Vec<WriteModel>) -> Vec<CombinedOperation> {
    let mut operations: Vec<CombinedOperation> = Vec::new();
    for (index, model) in models.into_iter().enumerate() {
        let kind = model.kind();
        match operations.iter_mut().find(|op| op.kind == kind) {
            Some(operation) => operation.push(index, model),
            None => {
                let mut operation = CombinedOperation::new(kind);
                operation.push(index, model);
                operations.push(operation);
            }
        }
    }
    operations
}
