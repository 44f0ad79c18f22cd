use konveksi_core::{Actor, ListParams, ListResult, ServiceError, new_id, now_rfc3339};
use konveksi_sql::Value;

use crate::model::{
    AssignTaskRequest, Batch, BatchStatus, CompleteTaskRequest, CuttingResult, ProgressRequest,
    Stage, SubBatchStatus, TaskStatus, TimelineEvent, WorkTask,
};

use super::ProductionService;
use super::sub_batches::validate_items;

/// Filters for `GET /production/tasks`.
#[derive(Debug, Default)]
pub struct TaskFilters {
    pub batch_id: Option<String>,
    pub assigned_to: Option<String>,
    pub stage: Option<String>,
    pub status: Option<String>,
}

impl ProductionService {
    // ── Assignment ──

    /// Assign a work task for one stage of a batch (or, finishing only,
    /// one sub-batch of it).
    ///
    /// Predecessors: CUTTING needs a PENDING batch; SEWING needs
    /// IN_CUTTING with a confirmed cutting result; batch-level FINISHING
    /// needs IN_SEWING with the sewing task completed and moves the
    /// batch to ASSIGNED_TO_FINISHING; sub-batch FINISHING needs an
    /// IN_FINISHING batch and a CREATED sub-batch.
    pub fn assign_task(
        &self,
        actor: &Actor,
        batch_id: &str,
        req: AssignTaskRequest,
    ) -> Result<WorkTask, ServiceError> {
        actor.require_supervisor()?;

        let batch = self.get_batch(batch_id)?;

        if req.assigned_role != req.stage.required_role() {
            return Err(ServiceError::Validation(format!(
                "Peran pekerja {} tidak cocok dengan tahap {} / worker role {} does not match \
                 stage {}",
                req.assigned_role,
                req.stage,
                req.assigned_role,
                req.stage
            )));
        }

        if let Some(ref sub_batch_id) = req.sub_batch_id {
            self.check_sub_batch_assignment(&batch, req.stage, sub_batch_id)?;
        } else {
            self.check_batch_assignment(&batch, req.stage)?;
        }

        let id = new_id();
        let now = now_rfc3339();
        let task = WorkTask {
            id: id.clone(),
            batch_id: batch_id.to_string(),
            sub_batch_id: req.sub_batch_id.clone(),
            stage: req.stage,
            status: TaskStatus::Pending,
            assigned_to: req.assigned_to,
            assigned_to_name: req.assigned_to_name.clone(),
            assigned_by: actor.id.clone(),
            target: req.target.unwrap_or(batch.quantity),
            done: 0,
            note: req.note,
            create_at: now.clone(),
            started_at: None,
            completed_at: None,
        };

        self.insert_record(
            "tasks",
            &id,
            &task,
            &[
                ("batch_id", Value::Text(batch_id.to_string())),
                (
                    "sub_batch_id",
                    match &req.sub_batch_id {
                        Some(s) => Value::Text(s.clone()),
                        None => Value::Null,
                    },
                ),
                ("stage", Value::Text(task.stage.as_str().into())),
                ("status", Value::Text(task.status.as_str().into())),
                ("assigned_to", Value::Text(task.assigned_to.clone())),
                ("create_at", Value::Text(now.clone())),
            ],
        )?;

        let detail = format!(
            "Ditugaskan kepada {} / assigned to {}",
            req.assigned_to_name, req.assigned_to_name
        );

        match (req.stage, &req.sub_batch_id) {
            (Stage::Cutting, _) => {
                self.append_batch_timeline(
                    batch_id,
                    TimelineEvent::CuttingAssigned,
                    Some(&detail),
                    &actor.id,
                )?;
            }
            (Stage::Sewing, _) => {
                self.append_batch_timeline(
                    batch_id,
                    TimelineEvent::SewingAssigned,
                    Some(&detail),
                    &actor.id,
                )?;
            }
            (Stage::Finishing, None) => {
                // Assignment itself advances the batch stage.
                let mut batch = batch;
                batch.status = BatchStatus::AssignedToFinishing;
                batch.update_at = now;
                self.update_record(
                    "batches",
                    batch_id,
                    &batch,
                    &[
                        ("status", Value::Text(batch.status.as_str().into())),
                        ("update_at", Value::Text(batch.update_at.clone())),
                    ],
                )?;
                self.append_batch_timeline(
                    batch_id,
                    TimelineEvent::FinishingAssigned,
                    Some(&detail),
                    &actor.id,
                )?;
            }
            (Stage::Finishing, Some(sub_batch_id)) => {
                self.append_sub_batch_timeline(
                    sub_batch_id,
                    TimelineEvent::FinishingAssigned,
                    Some(&detail),
                    &actor.id,
                )?;
            }
        }

        Ok(task)
    }

    fn check_batch_assignment(&self, batch: &Batch, stage: Stage) -> Result<(), ServiceError> {
        let expected = match stage {
            Stage::Cutting => BatchStatus::Pending,
            Stage::Sewing => BatchStatus::InCutting,
            Stage::Finishing => BatchStatus::InSewing,
        };
        if batch.status != expected {
            return Err(ServiceError::InvalidState(format!(
                "Batch tidak siap untuk penugasan {} / batch is not ready for {} assignment \
                 (status: {})",
                stage, stage, batch.status
            )));
        }

        match stage {
            Stage::Cutting => {}
            Stage::Sewing => {
                let result = match self.cutting_result_for_batch(&batch.id) {
                    Ok(r) => r,
                    Err(ServiceError::NotFound(_)) => {
                        return Err(ServiceError::InvalidState(
                            "Pemotongan belum selesai / cutting is not completed yet".into(),
                        ));
                    }
                    Err(e) => return Err(e),
                };
                if !result.is_confirmed {
                    return Err(ServiceError::InvalidState(
                        "Hasil potong belum dikonfirmasi / cutting result is not yet confirmed"
                            .into(),
                    ));
                }
            }
            Stage::Finishing => {
                match self.batch_stage_task(&batch.id, Stage::Sewing)? {
                    Some(sewing) if sewing.status == TaskStatus::Completed => {}
                    _ => {
                        return Err(ServiceError::InvalidState(
                            "Tugas jahit belum selesai / sewing task is not completed".into(),
                        ));
                    }
                }
            }
        }

        if self.batch_stage_task(&batch.id, stage)?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Tugas {} untuk batch ini sudah ada / a {} task already exists for this batch",
                stage, stage
            )));
        }

        Ok(())
    }

    fn check_sub_batch_assignment(
        &self,
        batch: &Batch,
        stage: Stage,
        sub_batch_id: &str,
    ) -> Result<(), ServiceError> {
        if stage != Stage::Finishing {
            return Err(ServiceError::Validation(
                "Hanya tugas finishing yang terikat ke sub-batch / only finishing tasks can be \
                 tied to a sub-batch"
                    .into(),
            ));
        }

        let sub_batch = self.get_sub_batch(sub_batch_id)?;
        if sub_batch.batch_id != batch.id {
            return Err(ServiceError::Validation(format!(
                "Sub-batch {} bukan bagian dari batch {} / sub-batch {} does not belong to \
                 batch {}",
                sub_batch_id, batch.id, sub_batch_id, batch.id
            )));
        }
        if batch.status != BatchStatus::InFinishing {
            return Err(ServiceError::InvalidState(format!(
                "Batch belum dalam tahap finishing / batch is not in finishing (status: {})",
                batch.status
            )));
        }
        if sub_batch.status != SubBatchStatus::Created {
            return Err(ServiceError::InvalidState(format!(
                "Sub-batch tidak dalam status CREATED / sub-batch is not CREATED (status: {})",
                sub_batch.status
            )));
        }

        let rows = self
            .sql
            .query(
                "SELECT COUNT(*) as cnt FROM tasks WHERE sub_batch_id = ?1 AND status != ?2",
                &[
                    Value::Text(sub_batch_id.to_string()),
                    Value::Text(TaskStatus::Completed.as_str().into()),
                ],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        if rows.first().and_then(|r| r.get_i64("cnt")).unwrap_or(0) > 0 {
            return Err(ServiceError::Conflict(
                "Sub-batch ini sudah punya tugas aktif / this sub-batch already has an active \
                 task"
                    .into(),
            ));
        }

        Ok(())
    }

    // ── Query ──

    /// Get a task by id.
    pub fn get_task(&self, id: &str) -> Result<WorkTask, ServiceError> {
        match self.get_record("tasks", id) {
            Err(ServiceError::NotFound(_)) => Err(ServiceError::NotFound(format!(
                "Tugas {} tidak ditemukan / task {} not found",
                id, id
            ))),
            other => other,
        }
    }

    /// List tasks with optional filters.
    pub fn list_tasks(
        &self,
        params: &ListParams,
        filters: &TaskFilters,
    ) -> Result<ListResult<WorkTask>, ServiceError> {
        let limit = params.limit.min(500);
        let mut f: Vec<(&str, Value)> = Vec::new();
        if let Some(ref b) = filters.batch_id {
            f.push(("batch_id", Value::Text(b.clone())));
        }
        if let Some(ref a) = filters.assigned_to {
            f.push(("assigned_to", Value::Text(a.clone())));
        }
        if let Some(ref s) = filters.stage {
            f.push(("stage", Value::Text(s.clone())));
        }
        if let Some(ref s) = filters.status {
            f.push(("status", Value::Text(s.clone())));
        }
        self.list_records("tasks", &f, limit, params.offset)
    }

    // ── Transitions ──

    /// Start a task: PENDING → IN_PROGRESS, advancing the owning batch
    /// (or sub-batch) stage.
    ///
    /// Only the assigned worker may start. The finishing-start path on a
    /// batch writes task + batch + timeline in one transaction; every
    /// other path issues the writes separately.
    pub fn start_task(&self, actor: &Actor, task_id: &str) -> Result<WorkTask, ServiceError> {
        let mut task = self.get_task(task_id)?;
        self.check_assignee(actor, &task)?;

        if task.status != TaskStatus::Pending {
            return Err(ServiceError::InvalidState(format!(
                "Tugas tidak dapat dimulai (status: {}) / task cannot be started (status: {})",
                task.status, task.status
            )));
        }

        let now = now_rfc3339();
        task.status = TaskStatus::InProgress;
        task.started_at = Some(now.clone());

        let task_indexes = [("status", Value::Text(task.status.as_str().into()))];

        match (task.stage, task.sub_batch_id.clone()) {
            (Stage::Cutting, _) => {
                let batch = self.expect_batch_status(&task.batch_id, BatchStatus::Pending)?;
                self.update_record("tasks", task_id, &task, &task_indexes)?;
                self.advance_batch(batch, BatchStatus::InCutting, &now)?;
                self.append_batch_timeline(
                    &task.batch_id,
                    TimelineEvent::CuttingStarted,
                    None,
                    &actor.id,
                )?;
            }
            (Stage::Sewing, _) => {
                let batch = self.expect_batch_status(&task.batch_id, BatchStatus::InCutting)?;
                self.update_record("tasks", task_id, &task, &task_indexes)?;
                self.advance_batch(batch, BatchStatus::InSewing, &now)?;
                self.append_batch_timeline(
                    &task.batch_id,
                    TimelineEvent::SewingStarted,
                    None,
                    &actor.id,
                )?;
            }
            (Stage::Finishing, None) => {
                // The one transactional transition: the task update, the
                // batch advance and the timeline row commit together.
                let mut batch =
                    self.expect_batch_status(&task.batch_id, BatchStatus::AssignedToFinishing)?;
                batch.status = BatchStatus::InFinishing;
                batch.update_at = now.clone();

                let stmts = [
                    Self::update_record_stmt("tasks", task_id, &task, &task_indexes)?,
                    Self::update_record_stmt(
                        "batches",
                        &batch.id,
                        &batch,
                        &[
                            ("status", Value::Text(batch.status.as_str().into())),
                            ("update_at", Value::Text(now.clone())),
                        ],
                    )?,
                    Self::batch_timeline_stmt(
                        &task.batch_id,
                        TimelineEvent::FinishingStarted,
                        None,
                        &actor.id,
                    ),
                ];
                self.sql
                    .exec_tx(&stmts)
                    .map_err(|e| ServiceError::Storage(e.to_string()))?;
                tracing::info!(
                    batch_id = %task.batch_id,
                    task_id,
                    "finishing started (transactional)"
                );
            }
            (Stage::Finishing, Some(sub_batch_id)) => {
                let mut sub_batch = self.get_sub_batch(&sub_batch_id)?;
                if sub_batch.status != SubBatchStatus::Created {
                    return Err(ServiceError::InvalidState(format!(
                        "Sub-batch tidak dalam status CREATED / sub-batch is not CREATED \
                         (status: {})",
                        sub_batch.status
                    )));
                }
                sub_batch.status = SubBatchStatus::InProgress;
                self.update_record("tasks", task_id, &task, &task_indexes)?;
                self.update_record(
                    "sub_batches",
                    &sub_batch_id,
                    &sub_batch,
                    &[("status", Value::Text(sub_batch.status.as_str().into()))],
                )?;
                self.append_sub_batch_timeline(
                    &sub_batch_id,
                    TimelineEvent::FinishingStarted,
                    None,
                    &actor.id,
                )?;
            }
        }

        Ok(task)
    }

    /// Report progress counters. Assigned worker only; the task must be
    /// IN_PROGRESS. Not a status change, so no timeline row.
    pub fn progress_task(
        &self,
        actor: &Actor,
        task_id: &str,
        req: ProgressRequest,
    ) -> Result<WorkTask, ServiceError> {
        let mut task = self.get_task(task_id)?;
        self.check_assignee(actor, &task)?;

        if task.status != TaskStatus::InProgress {
            return Err(ServiceError::InvalidState(format!(
                "Tugas tidak sedang berjalan (status: {}) / task is not in progress (status: {})",
                task.status, task.status
            )));
        }

        task.done = req.done;
        if req.note.is_some() {
            task.note = req.note;
        }
        self.update_record("tasks", task_id, &task, &[])?;

        Ok(task)
    }

    /// Complete a task: IN_PROGRESS → COMPLETED.
    ///
    /// Cutting completion records an unconfirmed [`CuttingResult`];
    /// sub-batch finishing completion writes the item counts and returns
    /// the sub-batch to CREATED; batch-level finishing completion
    /// requires every sub-batch to have reached the warehouse.
    pub fn complete_task(
        &self,
        actor: &Actor,
        task_id: &str,
        req: CompleteTaskRequest,
    ) -> Result<WorkTask, ServiceError> {
        let mut task = self.get_task(task_id)?;
        self.check_assignee(actor, &task)?;

        if task.status != TaskStatus::InProgress {
            return Err(ServiceError::InvalidState(format!(
                "Tugas tidak sedang berjalan (status: {}) / task is not in progress (status: {})",
                task.status, task.status
            )));
        }

        let now = now_rfc3339();
        task.status = TaskStatus::Completed;
        task.completed_at = Some(now.clone());
        if req.note.is_some() {
            task.note = req.note.clone();
        }

        let task_indexes = [("status", Value::Text(task.status.as_str().into()))];

        match (task.stage, task.sub_batch_id.clone()) {
            (Stage::Cutting, _) => {
                let pieces = match req.pieces_by_size {
                    Some(p) if !p.is_empty() => p,
                    _ => {
                        return Err(ServiceError::Validation(
                            "Hasil potong per ukuran wajib diisi / piecesBySize is required for \
                             cutting completion"
                                .into(),
                        ));
                    }
                };
                let total: u32 = pieces.iter().map(|p| p.quantity).sum();

                let result = CuttingResult {
                    id: new_id(),
                    batch_id: task.batch_id.clone(),
                    task_id: task.id.clone(),
                    pieces_by_size: pieces,
                    total_pieces: total,
                    is_confirmed: false,
                    confirmed_by: None,
                    confirmed_at: None,
                    create_at: now.clone(),
                };
                let result_id = result.id.clone();
                self.insert_record(
                    "cutting_results",
                    &result_id,
                    &result,
                    &[
                        ("batch_id", Value::Text(task.batch_id.clone())),
                        ("is_confirmed", Value::Integer(0)),
                        ("create_at", Value::Text(now.clone())),
                    ],
                )?;

                task.done = total;
                self.update_record("tasks", task_id, &task, &task_indexes)?;
                self.append_batch_timeline(
                    &task.batch_id,
                    TimelineEvent::CuttingCompleted,
                    Some(&format!("{} potong / pieces cut", total)),
                    &actor.id,
                )?;
            }
            (Stage::Sewing, _) => {
                self.update_record("tasks", task_id, &task, &task_indexes)?;
                self.append_batch_timeline(
                    &task.batch_id,
                    TimelineEvent::SewingCompleted,
                    None,
                    &actor.id,
                )?;
            }
            (Stage::Finishing, None) => {
                self.require_all_sub_batches_submitted(&task.batch_id)?;
                self.update_record("tasks", task_id, &task, &task_indexes)?;
                self.append_batch_timeline(
                    &task.batch_id,
                    TimelineEvent::FinishingCompleted,
                    None,
                    &actor.id,
                )?;
            }
            (Stage::Finishing, Some(sub_batch_id)) => {
                let items = match req.items {
                    Some(i) if !i.is_empty() => i,
                    _ => {
                        return Err(ServiceError::Validation(
                            "Rincian item wajib diisi / items are required when completing a \
                             sub-batch task"
                                .into(),
                        ));
                    }
                };
                validate_items(&items)?;

                let mut sub_batch = self.get_sub_batch(&sub_batch_id)?;
                sub_batch.items = items;
                sub_batch.status = SubBatchStatus::Created;
                let detail = format!(
                    "Baik {}, tolak {} / good {}, rejected {}",
                    sub_batch.good_total(),
                    sub_batch.rejected_total(),
                    sub_batch.good_total(),
                    sub_batch.rejected_total()
                );

                self.update_record("tasks", task_id, &task, &task_indexes)?;
                self.update_record(
                    "sub_batches",
                    &sub_batch_id,
                    &sub_batch,
                    &[("status", Value::Text(sub_batch.status.as_str().into()))],
                )?;
                self.append_sub_batch_timeline(
                    &sub_batch_id,
                    TimelineEvent::ItemsRecorded,
                    Some(&detail),
                    &actor.id,
                )?;
            }
        }

        Ok(task)
    }

    // ── Cutting results ──

    /// Get a cutting result by id.
    pub fn get_cutting_result(&self, id: &str) -> Result<CuttingResult, ServiceError> {
        match self.get_record("cutting_results", id) {
            Err(ServiceError::NotFound(_)) => Err(ServiceError::NotFound(format!(
                "Hasil potong {} tidak ditemukan / cutting result {} not found",
                id, id
            ))),
            other => other,
        }
    }

    /// Get the cutting result of a batch.
    pub fn cutting_result_for_batch(&self, batch_id: &str) -> Result<CuttingResult, ServiceError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM cutting_results WHERE batch_id = ?1",
                &[Value::Text(batch_id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let row = rows.first().ok_or_else(|| {
            ServiceError::NotFound(format!(
                "Batch {} belum punya hasil potong / batch {} has no cutting result",
                batch_id, batch_id
            ))
        })?;
        let data = row
            .get_str("data")
            .ok_or_else(|| ServiceError::Internal("missing data column".into()))?;
        serde_json::from_str(data).map_err(|e| ServiceError::Internal(e.to_string()))
    }

    /// Confirm a cutting result. Requires `is_confirmed == false`; an
    /// already-confirmed result is rejected without any write.
    pub fn confirm_cutting_result(
        &self,
        actor: &Actor,
        result_id: &str,
    ) -> Result<CuttingResult, ServiceError> {
        actor.require_supervisor()?;

        let mut result = self.get_cutting_result(result_id)?;
        if result.is_confirmed {
            return Err(ServiceError::InvalidState(
                "Hasil potong sudah dikonfirmasi / cutting result is already confirmed".into(),
            ));
        }

        let now = now_rfc3339();
        result.is_confirmed = true;
        result.confirmed_by = Some(actor.id.clone());
        result.confirmed_at = Some(now);

        self.update_record(
            "cutting_results",
            result_id,
            &result,
            &[("is_confirmed", Value::Integer(1))],
        )?;
        self.append_batch_timeline(
            &result.batch_id,
            TimelineEvent::CuttingConfirmed,
            Some(&format!("{} potong / pieces", result.total_pieces)),
            &actor.id,
        )?;

        Ok(result)
    }

    // ── Guard helpers ──

    /// Strict assignment check: only the assigned worker may mutate a
    /// task, supervisors included.
    fn check_assignee(&self, actor: &Actor, task: &WorkTask) -> Result<(), ServiceError> {
        if actor.id != task.assigned_to {
            return Err(ServiceError::PermissionDenied(
                "Tugas ini tidak ditugaskan kepada Anda / this task is not assigned to you"
                    .into(),
            ));
        }
        Ok(())
    }

    fn expect_batch_status(
        &self,
        batch_id: &str,
        expected: BatchStatus,
    ) -> Result<Batch, ServiceError> {
        let batch = self.get_batch(batch_id)?;
        if batch.status != expected {
            return Err(ServiceError::InvalidState(format!(
                "Status batch {} bukan {} / batch status is {} instead of {}",
                batch.status, expected, batch.status, expected
            )));
        }
        Ok(batch)
    }

    fn advance_batch(
        &self,
        mut batch: Batch,
        to: BatchStatus,
        now: &str,
    ) -> Result<(), ServiceError> {
        batch.status = to;
        batch.update_at = now.to_string();
        let id = batch.id.clone();
        self.update_record(
            "batches",
            &id,
            &batch,
            &[
                ("status", Value::Text(to.as_str().into())),
                ("update_at", Value::Text(now.to_string())),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use konveksi_core::Role;

    use super::super::testutil::*;
    use super::*;
    use crate::model::SizeQuantity;

    #[test]
    fn full_pipeline_to_in_finishing() {
        let svc = test_service();
        let (batch_id, fin) = to_in_finishing(&svc);

        let batch = svc.get_batch(&batch_id).unwrap();
        assert_eq!(batch.status, BatchStatus::InFinishing);
        assert_eq!(fin.stage, Stage::Finishing);
        assert_eq!(svc.get_task(&fin.id).unwrap().status, TaskStatus::InProgress);

        let events: Vec<String> = svc
            .batch_timeline(&batch_id)
            .unwrap()
            .into_iter()
            .map(|e| e.event)
            .collect();
        assert_eq!(
            events,
            vec![
                "BATCH_CREATED",
                "CUTTING_ASSIGNED",
                "CUTTING_STARTED",
                "CUTTING_COMPLETED",
                "CUTTING_CONFIRMED",
                "SEWING_ASSIGNED",
                "SEWING_STARTED",
                "SEWING_COMPLETED",
                "FINISHING_ASSIGNED",
                "FINISHING_STARTED",
            ]
        );
    }

    #[test]
    fn start_requires_pending_status() {
        let svc = test_service();
        let batch = svc.create_batch(&supervisor(), batch_request()).unwrap();
        let task = assign(&svc, &batch.id, Stage::Cutting);
        let w = worker(Stage::Cutting);

        svc.start_task(&w, &task.id).unwrap();

        // Second start: task is IN_PROGRESS, must 400.
        let err = svc.start_task(&w, &task.id).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_STATE");
        assert_eq!(err.status_code().as_u16(), 400);
    }

    #[test]
    fn start_and_progress_require_assignee() {
        let svc = test_service();
        let batch = svc.create_batch(&supervisor(), batch_request()).unwrap();
        let task = assign(&svc, &batch.id, Stage::Cutting);

        // A different worker of the right role is still rejected.
        let stranger = actor("pemotong2", Role::Pemotong);
        let err = svc.start_task(&stranger, &task.id).unwrap_err();
        assert_eq!(err.status_code().as_u16(), 403);

        // Supervisors are rejected too: strict assignee check.
        let err = svc.start_task(&supervisor(), &task.id).unwrap_err();
        assert_eq!(err.status_code().as_u16(), 403);

        svc.start_task(&worker(Stage::Cutting), &task.id).unwrap();
        let err = svc
            .progress_task(&stranger, &task.id, ProgressRequest { done: 5, note: None })
            .unwrap_err();
        assert_eq!(err.status_code().as_u16(), 403);
    }

    #[test]
    fn progress_updates_counters_without_timeline() {
        let svc = test_service();
        let batch = svc.create_batch(&supervisor(), batch_request()).unwrap();
        let task = assign(&svc, &batch.id, Stage::Cutting);
        let w = worker(Stage::Cutting);
        svc.start_task(&w, &task.id).unwrap();

        let before = svc.batch_timeline(&batch.id).unwrap().len();
        let updated = svc
            .progress_task(&w, &task.id, ProgressRequest { done: 42, note: Some("separuh".into()) })
            .unwrap();
        assert_eq!(updated.done, 42);
        assert_eq!(updated.note.as_deref(), Some("separuh"));
        assert_eq!(svc.batch_timeline(&batch.id).unwrap().len(), before);
    }

    #[test]
    fn progress_requires_in_progress() {
        let svc = test_service();
        let batch = svc.create_batch(&supervisor(), batch_request()).unwrap();
        let task = assign(&svc, &batch.id, Stage::Cutting);
        let err = svc
            .progress_task(&worker(Stage::Cutting), &task.id, ProgressRequest { done: 1, note: None })
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_STATE");
    }

    #[test]
    fn assignment_rejects_wrong_role_pairing() {
        let svc = test_service();
        let batch = svc.create_batch(&supervisor(), batch_request()).unwrap();
        let err = svc
            .assign_task(
                &supervisor(),
                &batch.id,
                AssignTaskRequest {
                    stage: Stage::Cutting,
                    assigned_to: "penjahit1".into(),
                    assigned_to_name: "Siti".into(),
                    assigned_role: Role::Penjahit,
                    sub_batch_id: None,
                    target: None,
                    note: None,
                },
            )
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_FAILED");
    }

    #[test]
    fn duplicate_assignment_conflicts() {
        let svc = test_service();
        let batch = svc.create_batch(&supervisor(), batch_request()).unwrap();
        assign(&svc, &batch.id, Stage::Cutting);

        let w = worker(Stage::Cutting);
        let err = svc
            .assign_task(
                &supervisor(),
                &batch.id,
                AssignTaskRequest {
                    stage: Stage::Cutting,
                    assigned_to: w.id,
                    assigned_to_name: w.name,
                    assigned_role: Role::Pemotong,
                    sub_batch_id: None,
                    target: None,
                    note: None,
                },
            )
            .unwrap_err();
        assert_eq!(err.error_code(), "ALREADY_EXISTS");
    }

    #[test]
    fn sewing_assignment_requires_confirmed_cutting() {
        let svc = test_service();
        let batch = svc.create_batch(&supervisor(), batch_request()).unwrap();
        let cut = assign(&svc, &batch.id, Stage::Cutting);
        let w = worker(Stage::Cutting);
        svc.start_task(&w, &cut.id).unwrap();
        svc.complete_task(
            &w,
            &cut.id,
            CompleteTaskRequest {
                pieces_by_size: Some(vec![SizeQuantity { size: "M".into(), quantity: 100 }]),
                ..Default::default()
            },
        )
        .unwrap();

        // Result exists but is unconfirmed — sewing assignment must 400.
        let sew = worker(Stage::Sewing);
        let err = svc
            .assign_task(
                &supervisor(),
                &batch.id,
                AssignTaskRequest {
                    stage: Stage::Sewing,
                    assigned_to: sew.id.clone(),
                    assigned_to_name: sew.name.clone(),
                    assigned_role: Role::Penjahit,
                    sub_batch_id: None,
                    target: None,
                    note: None,
                },
            )
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_STATE");
    }

    #[test]
    fn cutting_completion_creates_unconfirmed_result() {
        let svc = test_service();
        let batch = svc.create_batch(&supervisor(), batch_request()).unwrap();
        let cut = assign(&svc, &batch.id, Stage::Cutting);
        let w = worker(Stage::Cutting);
        svc.start_task(&w, &cut.id).unwrap();

        // Completing without pieces is rejected.
        let err = svc
            .complete_task(&w, &cut.id, CompleteTaskRequest::default())
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_FAILED");

        let done = svc
            .complete_task(
                &w,
                &cut.id,
                CompleteTaskRequest {
                    pieces_by_size: Some(vec![
                        SizeQuantity { size: "M".into(), quantity: 58 },
                        SizeQuantity { size: "L".into(), quantity: 40 },
                    ]),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(done.status, TaskStatus::Completed);
        assert_eq!(done.done, 98);

        let result = svc.cutting_result_for_batch(&batch.id).unwrap();
        assert!(!result.is_confirmed);
        assert_eq!(result.total_pieces, 98);
        assert_eq!(result.task_id, cut.id);
    }

    #[test]
    fn confirm_sets_fields_and_returns_updated_record() {
        let svc = test_service();
        let batch = svc.create_batch(&supervisor(), batch_request()).unwrap();
        let cut = assign(&svc, &batch.id, Stage::Cutting);
        let w = worker(Stage::Cutting);
        svc.start_task(&w, &cut.id).unwrap();
        svc.complete_task(
            &w,
            &cut.id,
            CompleteTaskRequest {
                pieces_by_size: Some(vec![SizeQuantity { size: "M".into(), quantity: 100 }]),
                ..Default::default()
            },
        )
        .unwrap();

        let result = svc.cutting_result_for_batch(&batch.id).unwrap();
        let confirmed = svc
            .confirm_cutting_result(&supervisor(), &result.id)
            .unwrap();
        assert!(confirmed.is_confirmed);
        assert_eq!(confirmed.confirmed_by.as_deref(), Some("kp1"));
        assert!(confirmed.confirmed_at.is_some());
    }

    #[test]
    fn confirm_twice_is_rejected_without_write() {
        let svc = test_service();
        let batch = svc.create_batch(&supervisor(), batch_request()).unwrap();
        let cut = assign(&svc, &batch.id, Stage::Cutting);
        let w = worker(Stage::Cutting);
        svc.start_task(&w, &cut.id).unwrap();
        svc.complete_task(
            &w,
            &cut.id,
            CompleteTaskRequest {
                pieces_by_size: Some(vec![SizeQuantity { size: "M".into(), quantity: 100 }]),
                ..Default::default()
            },
        )
        .unwrap();

        let result = svc.cutting_result_for_batch(&batch.id).unwrap();
        let confirmed = svc
            .confirm_cutting_result(&supervisor(), &result.id)
            .unwrap();

        let timeline_before = svc.batch_timeline(&batch.id).unwrap().len();
        let err = svc
            .confirm_cutting_result(&supervisor(), &result.id)
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_STATE");
        assert_eq!(err.status_code().as_u16(), 400);

        // No write happened: record and timeline unchanged.
        let again = svc.get_cutting_result(&result.id).unwrap();
        assert_eq!(again.confirmed_at, confirmed.confirmed_at);
        assert_eq!(svc.batch_timeline(&batch.id).unwrap().len(), timeline_before);
    }

    #[test]
    fn confirm_requires_supervisor() {
        let svc = test_service();
        let batch = svc.create_batch(&supervisor(), batch_request()).unwrap();
        let cut = assign(&svc, &batch.id, Stage::Cutting);
        let w = worker(Stage::Cutting);
        svc.start_task(&w, &cut.id).unwrap();
        svc.complete_task(
            &w,
            &cut.id,
            CompleteTaskRequest {
                pieces_by_size: Some(vec![SizeQuantity { size: "M".into(), quantity: 100 }]),
                ..Default::default()
            },
        )
        .unwrap();

        let result = svc.cutting_result_for_batch(&batch.id).unwrap();
        let err = svc.confirm_cutting_result(&w, &result.id).unwrap_err();
        assert_eq!(err.status_code().as_u16(), 403);
    }

    #[test]
    fn list_tasks_by_assignee() {
        let svc = test_service();
        let batch = svc.create_batch(&supervisor(), batch_request()).unwrap();
        assign(&svc, &batch.id, Stage::Cutting);

        let result = svc
            .list_tasks(
                &konveksi_core::ListParams::default(),
                &TaskFilters {
                    assigned_to: Some("pemotong1".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(result.total, 1);

        let result = svc
            .list_tasks(
                &konveksi_core::ListParams::default(),
                &TaskFilters {
                    assigned_to: Some("nobody".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(result.total, 0);
    }
}
