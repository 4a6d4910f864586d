use serde::Deserialize;

use crate::{
    bson::Bson,
    bson_util,
    cmap::{RawReply, StreamDescription},
    error::{BulkWriteError, Result, WriteConcernError},
};

use super::models::WriteModelKind;

// Fixed fallbacks for legacy servers that report an error without a code, keeping error text
// stable against old deployments.
const LEGACY_BAD_VALUE_CODE: i32 = 2;
const LEGACY_BAD_VALUE_MESSAGE: &str = "bad value";
const LEGACY_UNKNOWN_ERROR_CODE: i32 = 8;
const LEGACY_UNKNOWN_ERROR_MESSAGE: &str = "unknown error";

/// What one raw reply contributed to the aggregate result. Write-error and upsert indexes are
/// local to the dispatched batch; the result combiner remaps them.
#[derive(Debug, Default)]
pub(crate) struct BatchSummary {
    pub(crate) inserted_count: u64,
    pub(crate) matched_count: u64,
    pub(crate) modified_count: u64,
    pub(crate) deleted_count: u64,
    pub(crate) upserted: Vec<(usize, Bson)>,
    pub(crate) write_errors: Vec<BulkWriteError>,
    pub(crate) write_concern_errors: Vec<WriteConcernError>,
}

/// Interprets raw replies for one protocol generation. Selected once per bulk write call from the
/// first checked-out connection; the negotiated generation cannot change mid-call.
pub(crate) trait ReplyAdapter: Send + Sync {
    fn summarize(&self, kind: WriteModelKind, reply: &RawReply) -> Result<BatchSummary>;
}

pub(crate) fn select_adapter(
    description: &StreamDescription,
    acknowledged: bool,
) -> Box<dyn ReplyAdapter> {
    if description.supports_write_commands() {
        Box::new(CommandReplyAdapter)
    } else {
        Box::new(LegacyReplyAdapter { acknowledged })
    }
}

/// Interprets modern command replies: one document per batch with an explicit written count and
/// batch-local-indexed error arrays.
pub(crate) struct CommandReplyAdapter;

#[derive(Debug, Deserialize)]
struct CommandReplyBody {
    #[serde(default)]
    ok: Option<Bson>,

    #[serde(default)]
    n: u64,

    #[serde(rename = "nModified", default)]
    n_modified: u64,

    upserted: Option<Vec<CommandUpsertedId>>,

    #[serde(rename = "writeErrors")]
    write_errors: Option<Vec<BulkWriteError>>,

    #[serde(rename = "writeConcernError")]
    write_concern_error: Option<WriteConcernError>,

    #[serde(rename = "errmsg")]
    errmsg: Option<String>,

    code: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct CommandUpsertedId {
    index: usize,
    #[serde(rename = "_id")]
    id: Bson,
}

impl ReplyAdapter for CommandReplyAdapter {
    fn summarize(&self, kind: WriteModelKind, reply: &RawReply) -> Result<BatchSummary> {
        let mut summary = BatchSummary::default();
        let Some(document) = reply.documents.first() else {
            return Ok(summary);
        };
        let body: CommandReplyBody = bson::from_document(document.clone())?;

        match kind.command_name() {
            "insert" => summary.inserted_count = body.n,
            "update" => {
                let upserted = body.upserted.unwrap_or_default();
                summary.matched_count = body.n.saturating_sub(upserted.len() as u64);
                summary.modified_count = body.n_modified;
                summary.upserted = upserted.into_iter().map(|u| (u.index, u.id)).collect();
            }
            _ => summary.deleted_count = body.n,
        }

        if let Some(write_errors) = body.write_errors {
            summary.write_errors = write_errors;
        }
        if let Some(write_concern_error) = body.write_concern_error {
            summary.write_concern_errors.push(write_concern_error);
        } else if let Some(message) = body.errmsg {
            // Replies carrying only a top-level message/code pair still describe a failure to
            // satisfy the write concern.
            let failed = body.ok.as_ref().and_then(bson_util::get_int) != Some(1);
            if failed {
                summary.write_concern_errors.push(WriteConcernError {
                    code: body.code.unwrap_or(LEGACY_UNKNOWN_ERROR_CODE),
                    code_name: String::new(),
                    message,
                    details: None,
                    labels: Vec::new(),
                });
            }
        }

        Ok(summary)
    }
}

/// Interprets legacy per-statement replies. Old servers report no explicit written count, so the
/// inserted count is derived by counting replies without an error marker.
pub(crate) struct LegacyReplyAdapter {
    pub(crate) acknowledged: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct LegacyReplyBody {
    err: Option<String>,
    errmsg: Option<String>,
    code: Option<i32>,
    n: Option<i64>,
    upserted: Option<Bson>,
    updated_existing: Option<bool>,
    wtimeout: Option<bool>,
    wnote: Option<String>,
    jnote: Option<String>,
}

impl LegacyReplyBody {
    fn write_concern_note(&self) -> Option<String> {
        if self.wtimeout == Some(true) {
            return Some(
                self.errmsg
                    .clone()
                    .unwrap_or_else(|| LEGACY_UNKNOWN_ERROR_MESSAGE.to_string()),
            );
        }
        self.wnote.clone().or_else(|| self.jnote.clone())
    }
}

impl ReplyAdapter for LegacyReplyAdapter {
    fn summarize(&self, kind: WriteModelKind, reply: &RawReply) -> Result<BatchSummary> {
        let mut summary = BatchSummary::default();
        if !self.acknowledged {
            return Ok(summary);
        }

        for (local_index, document) in reply.documents.iter().enumerate() {
            let body: LegacyReplyBody = bson::from_document(document.clone())?;

            if let Some(note) = body.write_concern_note() {
                summary.write_concern_errors.push(WriteConcernError {
                    code: body.code.unwrap_or(LEGACY_UNKNOWN_ERROR_CODE),
                    code_name: String::new(),
                    message: note,
                    details: None,
                    labels: Vec::new(),
                });
                continue;
            }

            if body.err.is_some() || body.errmsg.is_some() {
                summary.write_errors.push(BulkWriteError {
                    index: local_index,
                    code: body.code.unwrap_or(LEGACY_BAD_VALUE_CODE),
                    code_name: None,
                    message: body
                        .err
                        .or(body.errmsg)
                        .unwrap_or_else(|| LEGACY_BAD_VALUE_MESSAGE.to_string()),
                });
                continue;
            }

            let n = body.n.unwrap_or(0).max(0) as u64;
            match kind.command_name() {
                "insert" => summary.inserted_count += 1,
                "update" => {
                    if let Some(id) = body.upserted {
                        summary.upserted.push((local_index, id));
                    } else {
                        summary.matched_count += n;
                        if body.updated_existing == Some(true) {
                            summary.modified_count += n;
                        }
                    }
                }
                _ => summary.deleted_count += n,
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod test {
    use crate::{
        bson::{doc, Bson},
        cmap::RawReply,
    };

    use super::{
        super::models::WriteModelKind,
        CommandReplyAdapter,
        LegacyReplyAdapter,
        ReplyAdapter,
        LEGACY_BAD_VALUE_CODE,
        LEGACY_UNKNOWN_ERROR_CODE,
    };

    #[test]
    fn command_insert_counts() {
        let reply = RawReply::command(doc! { "ok": 1, "n": 3 });
        let summary = CommandReplyAdapter
            .summarize(WriteModelKind::InsertOne, &reply)
            .unwrap();
        assert_eq!(summary.inserted_count, 3);
        assert!(summary.write_errors.is_empty());
    }

    #[test]
    fn command_update_with_upsert() {
        let reply = RawReply::command(doc! {
            "ok": 1,
            "n": 3,
            "nModified": 2,
            "upserted": [{ "index": 1, "_id": 42 }],
        });
        let summary = CommandReplyAdapter
            .summarize(WriteModelKind::UpdateOne, &reply)
            .unwrap();
        // The server's n counts upserts; matched must not.
        assert_eq!(summary.matched_count, 2);
        assert_eq!(summary.modified_count, 2);
        assert_eq!(summary.upserted, vec![(1, Bson::Int32(42))]);
    }

    #[test]
    fn command_write_errors_stay_batch_local() {
        let reply = RawReply::command(doc! {
            "ok": 1,
            "n": 1,
            "writeErrors": [
                { "index": 1, "code": 11000, "errmsg": "E11000 duplicate key" },
            ],
        });
        let summary = CommandReplyAdapter
            .summarize(WriteModelKind::InsertOne, &reply)
            .unwrap();
        assert_eq!(summary.write_errors.len(), 1);
        assert_eq!(summary.write_errors[0].index, 1);
        assert_eq!(summary.write_errors[0].code, 11000);
    }

    #[test]
    fn command_write_concern_error_field() {
        let reply = RawReply::command(doc! {
            "ok": 1,
            "n": 2,
            "writeConcernError": { "code": 64, "codeName": "WriteConcernFailed", "errmsg": "waiting for replication timed out" },
        });
        let summary = CommandReplyAdapter
            .summarize(WriteModelKind::DeleteOne, &reply)
            .unwrap();
        assert_eq!(summary.deleted_count, 2);
        assert_eq!(summary.write_concern_errors.len(), 1);
        assert_eq!(summary.write_concern_errors[0].code, 64);
    }

    #[test]
    fn command_synthesizes_write_concern_error_from_top_level_fields() {
        let reply = RawReply::command(doc! { "ok": 0, "errmsg": "not master", "code": 10107, "n": 0 });
        let summary = CommandReplyAdapter
            .summarize(WriteModelKind::InsertOne, &reply)
            .unwrap();
        assert_eq!(summary.write_concern_errors.len(), 1);
        assert_eq!(summary.write_concern_errors[0].code, 10107);
        assert_eq!(summary.write_concern_errors[0].message, "not master");

        // A successful reply with an incidental errmsg is not an error.
        let ok_reply = RawReply::command(doc! { "ok": 1, "n": 1 });
        let summary = CommandReplyAdapter
            .summarize(WriteModelKind::InsertOne, &ok_reply)
            .unwrap();
        assert!(summary.write_concern_errors.is_empty());
    }

    #[test]
    fn legacy_insert_counts_unerrored_replies() {
        let adapter = LegacyReplyAdapter { acknowledged: true };
        let reply = RawReply::legacy(vec![
            doc! { "ok": 1 },
            doc! { "ok": 1, "err": "E11000 duplicate key", "code": 11000 },
            doc! { "ok": 1 },
        ]);
        let summary = adapter.summarize(WriteModelKind::InsertOne, &reply).unwrap();
        assert_eq!(summary.inserted_count, 2);
        assert_eq!(summary.write_errors.len(), 1);
        assert_eq!(summary.write_errors[0].index, 1);
        assert_eq!(summary.write_errors[0].code, 11000);
    }

    #[test]
    fn legacy_fallback_constants() {
        let adapter = LegacyReplyAdapter { acknowledged: true };
        let reply = RawReply::legacy(vec![
            doc! { "ok": 1, "err": "something broke" },
            doc! { "ok": 1, "wnote": "no replication has been yet configured" },
        ]);
        let summary = adapter.summarize(WriteModelKind::InsertOne, &reply).unwrap();
        assert_eq!(summary.write_errors[0].code, LEGACY_BAD_VALUE_CODE);
        assert_eq!(summary.write_concern_errors[0].code, LEGACY_UNKNOWN_ERROR_CODE);
    }

    #[test]
    fn legacy_update_counts() {
        let adapter = LegacyReplyAdapter { acknowledged: true };
        let reply = RawReply::legacy(vec![
            doc! { "ok": 1, "n": 1, "updatedExisting": true },
            doc! { "ok": 1, "n": 1, "upserted": 7 },
        ]);
        let summary = adapter.summarize(WriteModelKind::UpdateOne, &reply).unwrap();
        assert_eq!(summary.matched_count, 1);
        assert_eq!(summary.modified_count, 1);
        assert_eq!(summary.upserted, vec![(1, Bson::Int32(7))]);
    }

    #[test]
    fn legacy_unacknowledged_short_circuits() {
        let adapter = LegacyReplyAdapter {
            acknowledged: false,
        };
        let reply = RawReply::legacy(vec![doc! { "ok": 1, "err": "ignored", "n": 5 }]);
        let summary = adapter.summarize(WriteModelKind::InsertOne, &reply).unwrap();
        assert_eq!(summary.inserted_count, 0);
        assert!(summary.write_errors.is_empty());
        assert!(summary.write_concern_errors.is_empty());
    }
}
