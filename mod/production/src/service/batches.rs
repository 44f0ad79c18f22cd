use konveksi_core::{Actor, ListParams, ListResult, ServiceError, new_id, now_rfc3339};
use konveksi_sql::Value;

use crate::model::{
    Batch, BatchStatus, CreateBatchRequest, Stage, SubBatch, TaskStatus, TimelineEvent, WorkTask,
};

use super::ProductionService;

/// Filters for `GET /production/batches`.
#[derive(Debug, Default)]
pub struct BatchFilters {
    pub status: Option<String>,
    pub product: Option<String>,
}

impl ProductionService {
    // ── Batch CRUD ──

    /// Create a new batch in PENDING status.
    pub fn create_batch(
        &self,
        actor: &Actor,
        req: CreateBatchRequest,
    ) -> Result<Batch, ServiceError> {
        actor.require_supervisor()?;

        if req.size_breakdown.is_empty() {
            return Err(ServiceError::Validation(
                "Rincian ukuran tidak boleh kosong / size breakdown must not be empty".into(),
            ));
        }
        if req.size_breakdown.iter().any(|s| s.quantity == 0) {
            return Err(ServiceError::Validation(
                "Jumlah per ukuran harus lebih dari nol / per-size quantity must be positive"
                    .into(),
            ));
        }

        let quantity: u32 = req.size_breakdown.iter().map(|s| s.quantity).sum();
        let id = new_id();
        let now = now_rfc3339();
        let batch = Batch {
            id: id.clone(),
            name: req.name.clone(),
            product: req.product.clone(),
            color: req.color,
            size_breakdown: req.size_breakdown,
            quantity,
            status: BatchStatus::Pending,
            note: req.note,
            created_by: actor.id.clone(),
            create_at: now.clone(),
            update_at: now.clone(),
        };

        self.insert_record(
            "batches",
            &id,
            &batch,
            &[
                ("name", Value::Text(req.name)),
                ("product", Value::Text(req.product)),
                ("status", Value::Text(batch.status.as_str().into())),
                ("created_by", Value::Text(actor.id.clone())),
                ("create_at", Value::Text(now.clone())),
                ("update_at", Value::Text(now)),
            ],
        )?;

        self.append_batch_timeline(
            &id,
            TimelineEvent::BatchCreated,
            Some(&format!("{} potong / pieces", quantity)),
            &actor.id,
        )?;

        Ok(batch)
    }

    /// Get a batch by id.
    pub fn get_batch(&self, id: &str) -> Result<Batch, ServiceError> {
        match self.get_record("batches", id) {
            Err(ServiceError::NotFound(_)) => Err(ServiceError::NotFound(format!(
                "Batch {} tidak ditemukan / batch {} not found",
                id, id
            ))),
            other => other,
        }
    }

    /// List batches with optional filters.
    pub fn list_batches(
        &self,
        params: &ListParams,
        filters: &BatchFilters,
    ) -> Result<ListResult<Batch>, ServiceError> {
        let limit = params.limit.min(500);
        let mut f: Vec<(&str, Value)> = Vec::new();
        if let Some(ref s) = filters.status {
            f.push(("status", Value::Text(s.clone())));
        }
        if let Some(ref p) = filters.product {
            f.push(("product", Value::Text(p.clone())));
        }
        self.list_records("batches", &f, limit, params.offset)
    }

    // ── Batch completion ──

    /// Close a batch: IN_FINISHING → COMPLETED.
    ///
    /// Requires the batch-level finishing task to be COMPLETED and every
    /// sub-batch to have reached the warehouse. The supervisor cannot
    /// close a batch over a worker's open finishing task.
    pub fn complete_batch(&self, actor: &Actor, batch_id: &str) -> Result<Batch, ServiceError> {
        actor.require_supervisor()?;

        let mut batch = self.get_batch(batch_id)?;
        if batch.status != BatchStatus::InFinishing {
            return Err(ServiceError::InvalidState(format!(
                "Batch belum dalam tahap finishing / batch is not in finishing (status: {})",
                batch.status
            )));
        }

        let finishing = self.batch_stage_task(batch_id, Stage::Finishing)?;
        match finishing {
            Some(task) if task.status == TaskStatus::Completed => {}
            Some(_) => {
                return Err(ServiceError::InvalidState(
                    "Tugas finishing belum selesai / finishing task is not completed".into(),
                ));
            }
            None => {
                return Err(ServiceError::InvalidState(
                    "Belum ada tugas finishing untuk batch ini / no finishing task for this batch"
                        .into(),
                ));
            }
        }

        self.require_all_sub_batches_submitted(batch_id)?;

        let now = now_rfc3339();
        batch.status = BatchStatus::Completed;
        batch.update_at = now.clone();
        self.update_record(
            "batches",
            batch_id,
            &batch,
            &[
                ("status", Value::Text(batch.status.as_str().into())),
                ("update_at", Value::Text(now)),
            ],
        )?;

        self.append_batch_timeline(batch_id, TimelineEvent::BatchCompleted, None, &actor.id)?;

        Ok(batch)
    }

    // ── Shared guard helpers ──

    /// Fetch the batch-level task for a stage, if one exists.
    pub(crate) fn batch_stage_task(
        &self,
        batch_id: &str,
        stage: Stage,
    ) -> Result<Option<WorkTask>, ServiceError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM tasks \
                 WHERE batch_id = ?1 AND stage = ?2 AND sub_batch_id IS NULL",
                &[
                    Value::Text(batch_id.to_string()),
                    Value::Text(stage.as_str().to_string()),
                ],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        match rows.first() {
            None => Ok(None),
            Some(row) => {
                let data = row
                    .get_str("data")
                    .ok_or_else(|| ServiceError::Internal("missing data column".into()))?;
                let task = serde_json::from_str(data)
                    .map_err(|e| ServiceError::Internal(e.to_string()))?;
                Ok(Some(task))
            }
        }
    }

    /// Require at least one sub-batch, all submitted to (or verified by)
    /// the warehouse.
    pub(crate) fn require_all_sub_batches_submitted(
        &self,
        batch_id: &str,
    ) -> Result<(), ServiceError> {
        let sub_batches: Vec<SubBatch> = self.sub_batches_of(batch_id)?;
        if sub_batches.is_empty() {
            return Err(ServiceError::InvalidState(
                "Belum ada sub-batch untuk batch ini / no sub-batches exist for this batch".into(),
            ));
        }
        let open = sub_batches
            .iter()
            .filter(|sb| !sb.status.is_submitted())
            .count();
        if open > 0 {
            return Err(ServiceError::InvalidState(format!(
                "{} sub-batch belum dikirim ke gudang / {} sub-batches not yet submitted to \
                 the warehouse",
                open, open
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use konveksi_core::Role;

    use super::super::testutil::*;
    use super::*;
    use crate::model::BatchStatus;

    #[test]
    fn create_and_get() {
        let svc = test_service();
        let batch = svc.create_batch(&supervisor(), batch_request()).unwrap();
        assert_eq!(batch.status, BatchStatus::Pending);
        assert_eq!(batch.quantity, 100);

        let got = svc.get_batch(&batch.id).unwrap();
        assert_eq!(got.name, "KMJ-2026-08-A");

        // Creation is recorded on the timeline.
        let tl = svc.batch_timeline(&batch.id).unwrap();
        assert_eq!(tl.len(), 1);
        assert_eq!(tl[0].event, "BATCH_CREATED");
    }

    #[test]
    fn create_requires_supervisor() {
        let svc = test_service();
        let err = svc
            .create_batch(&actor("w1", Role::Pemotong), batch_request())
            .unwrap_err();
        assert_eq!(err.error_code(), "PERMISSION_DENIED");
    }

    #[test]
    fn create_rejects_empty_breakdown() {
        let svc = test_service();
        let mut req = batch_request();
        req.size_breakdown.clear();
        let err = svc.create_batch(&supervisor(), req).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_FAILED");
    }

    #[test]
    fn get_missing_is_bilingual_not_found() {
        let svc = test_service();
        let err = svc.get_batch("nope").unwrap_err();
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert!(err.to_string().contains("tidak ditemukan"));
    }

    #[test]
    fn list_with_status_filter() {
        let svc = test_service();
        svc.create_batch(&supervisor(), batch_request()).unwrap();
        let mut req = batch_request();
        req.name = "B2".into();
        svc.create_batch(&supervisor(), req).unwrap();

        let result = svc
            .list_batches(
                &ListParams::default(),
                &BatchFilters {
                    status: Some("PENDING".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(result.total, 2);

        let result = svc
            .list_batches(
                &ListParams::default(),
                &BatchFilters {
                    status: Some("COMPLETED".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(result.total, 0);
    }

    #[test]
    fn complete_requires_in_finishing() {
        let svc = test_service();
        let batch = svc.create_batch(&supervisor(), batch_request()).unwrap();
        let err = svc.complete_batch(&supervisor(), &batch.id).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_STATE");
    }
}
