pub mod batches;
pub mod schema;
pub mod sub_batches;
pub mod tasks;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use konveksi_core::{ListResult, ServiceError, new_id, now_rfc3339};
use konveksi_sql::{SQLStore, Statement, Value};

use crate::model::{BatchTimelineEntry, SubBatchTimelineEntry, TimelineEvent};

/// Production service — the status guard.
///
/// Every transition follows the same contract: load the entity (404 if
/// absent), check the actor's role or assignment (403 on mismatch),
/// check that the current status is the accepted predecessor (400
/// otherwise), then perform the write and append one timeline record.
/// The write and the timeline append are separate statements except on
/// the finishing-start path, which is transactional.
pub struct ProductionService {
    pub(crate) sql: Arc<dyn SQLStore>,
}

impl ProductionService {
    /// Create the service and initialise the schema.
    pub fn new(sql: Arc<dyn SQLStore>) -> Result<Self, ServiceError> {
        schema::init_schema(sql.as_ref())?;
        Ok(Self { sql })
    }

    // ── Generic record helpers ──

    /// Insert a record as JSON into a table with indexed columns.
    pub(crate) fn insert_record<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<(), ServiceError> {
        let json = serde_json::to_string(record)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        let mut cols = vec!["id", "data"];
        let mut placeholders = vec!["?1".to_string(), "?2".to_string()];
        let mut params = vec![Value::Text(id.to_string()), Value::Text(json)];

        for (i, (col, val)) in indexes.iter().enumerate() {
            let idx = i + 3;
            cols.push(col);
            placeholders.push(format!("?{}", idx));
            params.push(val.clone());
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            cols.join(", "),
            placeholders.join(", "),
        );

        self.sql.exec(&sql, &params).map_err(|e| {
            let msg = e.to_string();
            if msg.contains("UNIQUE constraint") {
                ServiceError::Conflict(msg)
            } else {
                ServiceError::Storage(msg)
            }
        })?;

        Ok(())
    }

    /// Get a record by id, deserializing the JSON `data` column.
    pub(crate) fn get_record<T: DeserializeOwned>(
        &self,
        table: &str,
        id: &str,
    ) -> Result<T, ServiceError> {
        let sql = format!("SELECT data FROM {} WHERE id = ?1", table);
        let rows = self
            .sql
            .query(&sql, &[Value::Text(id.to_string())])
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let row = rows
            .first()
            .ok_or_else(|| ServiceError::NotFound(format!("{}/{}", table, id)))?;
        let data = row
            .get_str("data")
            .ok_or_else(|| ServiceError::Internal("missing data column".into()))?;
        serde_json::from_str(data).map_err(|e| ServiceError::Internal(e.to_string()))
    }

    /// Build the UPDATE statement for a record's JSON data and indexed
    /// columns, without executing it. Used directly by [`update_record`]
    /// and collected into transactions on the finishing-start path.
    pub(crate) fn update_record_stmt<T: Serialize>(
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<Statement, ServiceError> {
        let json = serde_json::to_string(record)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        let mut sets = vec!["data = ?1".to_string()];
        let mut params: Vec<Value> = vec![Value::Text(json)];

        for (i, (col, val)) in indexes.iter().enumerate() {
            let idx = i + 2;
            sets.push(format!("{} = ?{}", col, idx));
            params.push(val.clone());
        }

        let id_idx = params.len() + 1;
        params.push(Value::Text(id.to_string()));

        let sql = format!("UPDATE {} SET {} WHERE id = ?{}", table, sets.join(", "), id_idx);

        Ok(Statement::new(sql, params))
    }

    /// Update a record's JSON data and indexed columns.
    pub(crate) fn update_record<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<(), ServiceError> {
        let stmt = Self::update_record_stmt(table, id, record, indexes)?;

        let affected = self
            .sql
            .exec(&stmt.sql, &stmt.params)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        if affected == 0 {
            return Err(ServiceError::NotFound(format!("{}/{}", table, id)));
        }

        Ok(())
    }

    /// List records with optional filters, pagination, and total count.
    pub(crate) fn list_records<T: DeserializeOwned + Serialize>(
        &self,
        table: &str,
        filters: &[(&str, Value)],
        limit: usize,
        offset: usize,
    ) -> Result<ListResult<T>, ServiceError> {
        let mut where_clauses = Vec::new();
        let mut params = Vec::new();

        for (i, (col, val)) in filters.iter().enumerate() {
            let idx = i + 1;
            where_clauses.push(format!("{} = ?{}", col, idx));
            params.push(val.clone());
        }

        let where_sql = if where_clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", where_clauses.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) as cnt FROM {}{}", table, where_sql);
        let rows = self
            .sql
            .query(&count_sql, &params)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let total = rows.first().and_then(|r| r.get_i64("cnt")).unwrap_or(0) as usize;

        let limit_idx = params.len() + 1;
        let offset_idx = params.len() + 2;
        params.push(Value::Integer(limit as i64));
        params.push(Value::Integer(offset as i64));

        let sql = format!(
            "SELECT data FROM {}{} ORDER BY create_at DESC LIMIT ?{} OFFSET ?{}",
            table, where_sql, limit_idx, offset_idx,
        );

        let rows = self
            .sql
            .query(&sql, &params)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let mut items = Vec::new();
        for row in &rows {
            let data = row
                .get_str("data")
                .ok_or_else(|| ServiceError::Internal("missing data column".into()))?;
            let item: T = serde_json::from_str(data)
                .map_err(|e| ServiceError::Internal(e.to_string()))?;
            items.push(item);
        }

        Ok(ListResult { items, total })
    }

    // ── Timelines ──
    //
    // Append-only. There is deliberately no update or delete path for
    // either timeline table.

    /// Build the INSERT statement for one batch timeline row.
    pub(crate) fn batch_timeline_stmt(
        batch_id: &str,
        event: TimelineEvent,
        detail: Option<&str>,
        actor_id: &str,
    ) -> Statement {
        Statement::new(
            "INSERT INTO batch_timeline (id, batch_id, event, detail, actor_id, create_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            vec![
                Value::Text(new_id()),
                Value::Text(batch_id.to_string()),
                Value::Text(event.as_str().to_string()),
                match detail {
                    Some(d) => Value::Text(d.to_string()),
                    None => Value::Null,
                },
                Value::Text(actor_id.to_string()),
                Value::Text(now_rfc3339()),
            ],
        )
    }

    /// Append one row to a batch's timeline.
    pub(crate) fn append_batch_timeline(
        &self,
        batch_id: &str,
        event: TimelineEvent,
        detail: Option<&str>,
        actor_id: &str,
    ) -> Result<(), ServiceError> {
        let stmt = Self::batch_timeline_stmt(batch_id, event, detail, actor_id);
        self.sql
            .exec(&stmt.sql, &stmt.params)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        tracing::info!(batch_id, event = event.as_str(), actor_id, "batch timeline");
        Ok(())
    }

    /// Append one row to a sub-batch's timeline.
    pub(crate) fn append_sub_batch_timeline(
        &self,
        sub_batch_id: &str,
        event: TimelineEvent,
        detail: Option<&str>,
        actor_id: &str,
    ) -> Result<(), ServiceError> {
        self.sql
            .exec(
                "INSERT INTO sub_batch_timeline (id, sub_batch_id, event, detail, actor_id, create_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                &[
                    Value::Text(new_id()),
                    Value::Text(sub_batch_id.to_string()),
                    Value::Text(event.as_str().to_string()),
                    match detail {
                        Some(d) => Value::Text(d.to_string()),
                        None => Value::Null,
                    },
                    Value::Text(actor_id.to_string()),
                    Value::Text(now_rfc3339()),
                ],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        tracing::info!(sub_batch_id, event = event.as_str(), actor_id, "sub-batch timeline");
        Ok(())
    }

    /// Read a batch's timeline in audit order (oldest first).
    pub fn batch_timeline(&self, batch_id: &str) -> Result<Vec<BatchTimelineEntry>, ServiceError> {
        let rows = self
            .sql
            .query(
                "SELECT id, batch_id, event, detail, actor_id, create_at \
                 FROM batch_timeline WHERE batch_id = ?1 ORDER BY create_at ASC, rowid ASC",
                &[Value::Text(batch_id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        Ok(rows
            .iter()
            .map(|row| BatchTimelineEntry {
                id: row.get_str("id").unwrap_or_default().to_string(),
                batch_id: row.get_str("batch_id").unwrap_or_default().to_string(),
                event: row.get_str("event").unwrap_or_default().to_string(),
                detail: row.get_str("detail").map(String::from),
                actor_id: row.get_str("actor_id").unwrap_or_default().to_string(),
                create_at: row.get_str("create_at").unwrap_or_default().to_string(),
            })
            .collect())
    }

    /// Read a sub-batch's timeline in audit order (oldest first).
    pub fn sub_batch_timeline(
        &self,
        sub_batch_id: &str,
    ) -> Result<Vec<SubBatchTimelineEntry>, ServiceError> {
        let rows = self
            .sql
            .query(
                "SELECT id, sub_batch_id, event, detail, actor_id, create_at \
                 FROM sub_batch_timeline WHERE sub_batch_id = ?1 ORDER BY create_at ASC, rowid ASC",
                &[Value::Text(sub_batch_id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        Ok(rows
            .iter()
            .map(|row| SubBatchTimelineEntry {
                id: row.get_str("id").unwrap_or_default().to_string(),
                sub_batch_id: row.get_str("sub_batch_id").unwrap_or_default().to_string(),
                event: row.get_str("event").unwrap_or_default().to_string(),
                detail: row.get_str("detail").map(String::from),
                actor_id: row.get_str("actor_id").unwrap_or_default().to_string(),
                create_at: row.get_str("create_at").unwrap_or_default().to_string(),
            })
            .collect())
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use std::sync::Arc;

    use konveksi_core::{Actor, Role};
    use konveksi_sql::SqliteStore;

    use super::ProductionService;
    use crate::model::{
        AssignTaskRequest, CompleteTaskRequest, CreateBatchRequest, RejectBreakdown, SizeQuantity,
        Stage, SubBatchItem, WorkTask,
    };

    pub fn test_service() -> ProductionService {
        let db = Arc::new(SqliteStore::open_in_memory().unwrap());
        ProductionService::new(db).unwrap()
    }

    pub fn actor(id: &str, role: Role) -> Actor {
        Actor {
            id: id.into(),
            name: format!("User {}", id),
            role,
        }
    }

    pub fn supervisor() -> Actor {
        actor("kp1", Role::KepalaProduksi)
    }

    pub fn worker(stage: Stage) -> Actor {
        match stage {
            Stage::Cutting => actor("pemotong1", Role::Pemotong),
            Stage::Sewing => actor("penjahit1", Role::Penjahit),
            Stage::Finishing => actor("finisher1", Role::Finishing),
        }
    }

    pub fn batch_request() -> CreateBatchRequest {
        CreateBatchRequest {
            name: "KMJ-2026-08-A".into(),
            product: "Kemeja flanel".into(),
            color: "Merah".into(),
            size_breakdown: vec![
                SizeQuantity { size: "M".into(), quantity: 60 },
                SizeQuantity { size: "L".into(), quantity: 40 },
            ],
            note: None,
        }
    }

    /// Assign the batch-level task for a stage to the stage's stock worker.
    pub fn assign(svc: &ProductionService, batch_id: &str, stage: Stage) -> WorkTask {
        let w = worker(stage);
        svc.assign_task(
            &supervisor(),
            batch_id,
            AssignTaskRequest {
                stage,
                assigned_to: w.id.clone(),
                assigned_to_name: w.name.clone(),
                assigned_role: w.role,
                sub_batch_id: None,
                target: None,
                note: None,
            },
        )
        .unwrap()
    }

    pub fn sub_batch_items() -> Vec<SubBatchItem> {
        vec![
            SubBatchItem {
                size: "M".into(),
                color: "Merah".into(),
                received: 30,
                good: 27,
                rejected: RejectBreakdown {
                    stain: 2,
                    sewing_defect: 1,
                    ..Default::default()
                },
            },
            SubBatchItem {
                size: "L".into(),
                color: "Merah".into(),
                received: 20,
                good: 20,
                rejected: RejectBreakdown::default(),
            },
        ]
    }

    /// Drive a fresh batch through cutting, confirmation and sewing to
    /// IN_FINISHING. Returns the batch id and the (running) finishing task.
    pub fn to_in_finishing(svc: &ProductionService) -> (String, WorkTask) {
        let batch = svc.create_batch(&supervisor(), batch_request()).unwrap();

        let cut = assign(svc, &batch.id, Stage::Cutting);
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
        svc.confirm_cutting_result(&supervisor(), &result.id).unwrap();

        let sew = assign(svc, &batch.id, Stage::Sewing);
        let w = worker(Stage::Sewing);
        svc.start_task(&w, &sew.id).unwrap();
        svc.complete_task(&w, &sew.id, CompleteTaskRequest::default())
            .unwrap();

        let fin = assign(svc, &batch.id, Stage::Finishing);
        let w = worker(Stage::Finishing);
        svc.start_task(&w, &fin.id).unwrap();

        (batch.id, fin)
    }
}
