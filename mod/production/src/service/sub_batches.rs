use konveksi_core::{Actor, Role, ServiceError, new_id, now_rfc3339};
use konveksi_sql::Value;

use crate::model::{
    BatchStatus, CompleteSubBatchRequest, CreateSubBatchRequest, SubBatch, SubBatchItem,
    SubBatchStatus, TimelineEvent,
};

use super::ProductionService;

/// Validate sub-batch item counts: non-empty, and no item may report
/// more good + rejected pieces than it received.
pub(crate) fn validate_items(items: &[SubBatchItem]) -> Result<(), ServiceError> {
    if items.is_empty() {
        return Err(ServiceError::Validation(
            "Rincian item tidak boleh kosong / items must not be empty".into(),
        ));
    }
    for item in items {
        if item.good + item.rejected.total() > item.received {
            return Err(ServiceError::Validation(format!(
                "Jumlah baik dan tolak melebihi yang diterima untuk ukuran {} / good plus \
                 rejected exceeds received for size {}",
                item.size, item.size
            )));
        }
    }
    Ok(())
}

impl ProductionService {
    // ── Sub-batch lifecycle ──

    /// Create a sub-batch slice of an IN_FINISHING batch.
    pub fn create_sub_batch(
        &self,
        actor: &Actor,
        batch_id: &str,
        req: CreateSubBatchRequest,
    ) -> Result<SubBatch, ServiceError> {
        self.check_finishing_role(actor)?;

        let batch = self.get_batch(batch_id)?;
        if batch.status != BatchStatus::InFinishing {
            return Err(ServiceError::InvalidState(format!(
                "Batch belum dalam tahap finishing / batch is not in finishing (status: {})",
                batch.status
            )));
        }

        validate_items(&req.items)?;

        let code = self.next_sub_batch_code(batch_id)?;
        let id = new_id();
        let now = now_rfc3339();
        let sub_batch = SubBatch {
            id: id.clone(),
            batch_id: batch_id.to_string(),
            code,
            status: SubBatchStatus::Created,
            items: req.items,
            note: req.note,
            created_by: actor.id.clone(),
            create_at: now.clone(),
            submitted_at: None,
            verified_at: None,
        };

        self.insert_record(
            "sub_batches",
            &id,
            &sub_batch,
            &[
                ("batch_id", Value::Text(batch_id.to_string())),
                ("code", Value::Integer(code as i64)),
                ("status", Value::Text(sub_batch.status.as_str().into())),
                ("create_at", Value::Text(now)),
            ],
        )?;

        self.append_sub_batch_timeline(
            &id,
            TimelineEvent::SubBatchCreated,
            Some(&format!("Sub-batch #{} dari batch {} / of batch {}", code, batch.name, batch.name)),
            &actor.id,
        )?;

        Ok(sub_batch)
    }

    /// Get a sub-batch by id.
    pub fn get_sub_batch(&self, id: &str) -> Result<SubBatch, ServiceError> {
        match self.get_record("sub_batches", id) {
            Err(ServiceError::NotFound(_)) => Err(ServiceError::NotFound(format!(
                "Sub-batch {} tidak ditemukan / sub-batch {} not found",
                id, id
            ))),
            other => other,
        }
    }

    /// All sub-batches of a batch, oldest first.
    pub fn sub_batches_of(&self, batch_id: &str) -> Result<Vec<SubBatch>, ServiceError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM sub_batches WHERE batch_id = ?1 ORDER BY code ASC",
                &[Value::Text(batch_id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let mut items = Vec::new();
        for row in &rows {
            let data = row
                .get_str("data")
                .ok_or_else(|| ServiceError::Internal("missing data column".into()))?;
            items.push(
                serde_json::from_str(data).map_err(|e| ServiceError::Internal(e.to_string()))?,
            );
        }
        Ok(items)
    }

    /// Submit a sub-batch to the warehouse: CREATED → SUBMITTED_TO_WAREHOUSE.
    ///
    /// Appends exactly one sub-batch timeline row with event
    /// FINISHING_COMPLETED summarizing good and rejected counts.
    pub fn complete_sub_batch(
        &self,
        actor: &Actor,
        sub_batch_id: &str,
        req: CompleteSubBatchRequest,
    ) -> Result<SubBatch, ServiceError> {
        self.check_finishing_role(actor)?;

        let mut sub_batch = self.get_sub_batch(sub_batch_id)?;
        if sub_batch.status != SubBatchStatus::Created {
            return Err(ServiceError::InvalidState(format!(
                "Sub-batch tidak dalam status CREATED / sub-batch is not CREATED (status: {})",
                sub_batch.status
            )));
        }

        if let Some(items) = req.items {
            validate_items(&items)?;
            sub_batch.items = items;
        }

        let now = now_rfc3339();
        sub_batch.status = SubBatchStatus::SubmittedToWarehouse;
        sub_batch.submitted_at = Some(now);

        self.update_record(
            "sub_batches",
            sub_batch_id,
            &sub_batch,
            &[("status", Value::Text(sub_batch.status.as_str().into()))],
        )?;

        let rejects = sub_batch.rejected_breakdown();
        let detail = format!(
            "Baik {}, tolak {} (noda {}, cacat jahit {}, cacat kain {}, lainnya {}) / \
             good {}, rejected {} (stain {}, sewing defect {}, fabric defect {}, other {})",
            sub_batch.good_total(),
            sub_batch.rejected_total(),
            rejects.stain,
            rejects.sewing_defect,
            rejects.fabric_defect,
            rejects.other,
            sub_batch.good_total(),
            sub_batch.rejected_total(),
            rejects.stain,
            rejects.sewing_defect,
            rejects.fabric_defect,
            rejects.other,
        );
        self.append_sub_batch_timeline(
            sub_batch_id,
            TimelineEvent::FinishingCompleted,
            Some(&detail),
            &actor.id,
        )?;

        Ok(sub_batch)
    }

    /// Warehouse verification: SUBMITTED_TO_WAREHOUSE → WAREHOUSE_VERIFIED.
    pub fn verify_sub_batch(
        &self,
        actor: &Actor,
        sub_batch_id: &str,
    ) -> Result<SubBatch, ServiceError> {
        actor.require_role(&[Role::KepalaGudang, Role::Owner])?;

        let mut sub_batch = self.get_sub_batch(sub_batch_id)?;
        if sub_batch.status != SubBatchStatus::SubmittedToWarehouse {
            return Err(ServiceError::InvalidState(format!(
                "Sub-batch belum dikirim ke gudang / sub-batch has not been submitted to the \
                 warehouse (status: {})",
                sub_batch.status
            )));
        }

        let now = now_rfc3339();
        sub_batch.status = SubBatchStatus::WarehouseVerified;
        sub_batch.verified_at = Some(now);

        self.update_record(
            "sub_batches",
            sub_batch_id,
            &sub_batch,
            &[("status", Value::Text(sub_batch.status.as_str().into()))],
        )?;

        self.append_sub_batch_timeline(
            sub_batch_id,
            TimelineEvent::WarehouseVerified,
            Some(&format!(
                "{} potong diterima gudang / pieces received by warehouse",
                sub_batch.good_total()
            )),
            &actor.id,
        )?;

        Ok(sub_batch)
    }

    // ── Guard helpers ──

    /// Sub-batches are handled by finishing workers or supervisors.
    fn check_finishing_role(&self, actor: &Actor) -> Result<(), ServiceError> {
        if actor.role == Role::Finishing || actor.role.is_supervisor() {
            Ok(())
        } else {
            Err(ServiceError::PermissionDenied(format!(
                "Peran {} tidak boleh mengelola sub-batch / role {} may not manage sub-batches",
                actor.role, actor.role
            )))
        }
    }

    fn next_sub_batch_code(&self, batch_id: &str) -> Result<u32, ServiceError> {
        let rows = self
            .sql
            .query(
                "SELECT COALESCE(MAX(code), 0) as max_code FROM sub_batches WHERE batch_id = ?1",
                &[Value::Text(batch_id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let max = rows.first().and_then(|r| r.get_i64("max_code")).unwrap_or(0);
        Ok(max as u32 + 1)
    }
}
