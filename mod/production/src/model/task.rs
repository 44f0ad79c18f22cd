use serde::{Deserialize, Serialize};

use konveksi_core::Role;

use super::batch::SizeQuantity;
use super::sub_batch::SubBatchItem;

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// Which production stage a task belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    Cutting,
    Sewing,
    Finishing,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cutting => "CUTTING",
            Self::Sewing => "SEWING",
            Self::Finishing => "FINISHING",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "CUTTING" => Some(Self::Cutting),
            "SEWING" => Some(Self::Sewing),
            "FINISHING" => Some(Self::Finishing),
            _ => None,
        }
    }

    /// The worker role allowed to execute tasks of this stage.
    pub fn required_role(&self) -> Role {
        match self {
            Self::Cutting => Role::Pemotong,
            Self::Sewing => Role::Penjahit,
            Self::Finishing => Role::Finishing,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TaskStatus
// ---------------------------------------------------------------------------

/// Lifecycle state of a work task.
///
/// ```text
/// PENDING → IN_PROGRESS → COMPLETED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(Self::Pending),
            "IN_PROGRESS" => Some(Self::InProgress),
            "COMPLETED" => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// WorkTask — one assigned-worker job
// ---------------------------------------------------------------------------

/// A unit of assigned work tied to exactly one batch, or — finishing
/// only — one sub-batch of that batch.
///
/// Mutated only by the assigned worker; supervisors act through
/// assignment, confirmation and batch completion instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkTask {
    pub id: String,

    pub batch_id: String,

    /// Set only for finishing tasks that work one sub-batch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_batch_id: Option<String>,

    pub stage: Stage,
    pub status: TaskStatus,

    /// Worker this task is assigned to (user id).
    pub assigned_to: String,
    /// Worker display name, denormalized for dashboards.
    pub assigned_to_name: String,
    /// Supervisor who assigned the task.
    pub assigned_by: String,

    /// Target piece count.
    #[serde(default)]
    pub target: u32,
    /// Pieces done so far (reported via @progress).
    #[serde(default)]
    pub done: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    pub create_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

// ---------------------------------------------------------------------------
// API request types
// ---------------------------------------------------------------------------

/// Body for `POST /production/batches/{id}/tasks` — assign a task.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignTaskRequest {
    pub stage: Stage,

    /// Worker user id.
    pub assigned_to: String,
    /// Worker display name.
    pub assigned_to_name: String,
    /// The worker's role — must match the stage's required role.
    pub assigned_role: Role,

    /// For finishing tasks: work one sub-batch instead of the batch.
    #[serde(default)]
    pub sub_batch_id: Option<String>,

    /// Target piece count; defaults to the batch quantity.
    #[serde(default)]
    pub target: Option<u32>,

    #[serde(default)]
    pub note: Option<String>,
}

/// Body for `POST /production/tasks/{id}/@progress`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRequest {
    /// Pieces done so far.
    pub done: u32,
    #[serde(default)]
    pub note: Option<String>,
}

/// Body for `POST /production/tasks/{id}/@complete`.
///
/// Cutting tasks must report `piecesBySize`; finishing tasks on a
/// sub-batch must report `items`. Other stages take no payload.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteTaskRequest {
    #[serde(default)]
    pub pieces_by_size: Option<Vec<SizeQuantity>>,

    #[serde(default)]
    pub items: Option<Vec<SubBatchItem>>,

    #[serde(default)]
    pub note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_roundtrip() {
        for s in &[Stage::Cutting, Stage::Sewing, Stage::Finishing] {
            assert_eq!(Stage::from_str(s.as_str()), Some(*s));
        }
        assert_eq!(Stage::from_str("PACKING"), None);
    }

    #[test]
    fn stage_role_pairing() {
        assert_eq!(Stage::Cutting.required_role(), Role::Pemotong);
        assert_eq!(Stage::Sewing.required_role(), Role::Penjahit);
        assert_eq!(Stage::Finishing.required_role(), Role::Finishing);
    }

    #[test]
    fn status_roundtrip() {
        for s in &[TaskStatus::Pending, TaskStatus::InProgress, TaskStatus::Completed] {
            let json = serde_json::to_string(s).unwrap();
            let back: TaskStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(*s, back);
            assert_eq!(TaskStatus::from_str(s.as_str()), Some(*s));
        }
    }

    #[test]
    fn task_json_roundtrip() {
        let t = WorkTask {
            id: "t1".into(),
            batch_id: "b1".into(),
            sub_batch_id: None,
            stage: Stage::Cutting,
            status: TaskStatus::Pending,
            assigned_to: "w1".into(),
            assigned_to_name: "Budi".into(),
            assigned_by: "kp1".into(),
            target: 100,
            done: 0,
            note: None,
            create_at: "2026-08-01T00:00:00Z".into(),
            started_at: None,
            completed_at: None,
        };
        let json = serde_json::to_string(&t).unwrap();
        assert!(json.contains("\"CUTTING\""));
        assert!(!json.contains("\"subBatchId\""));
        let back: WorkTask = serde_json::from_str(&json).unwrap();
        assert_eq!(back.assigned_to, "w1");
        assert_eq!(back.status, TaskStatus::Pending);
    }

    #[test]
    fn assign_request_deserialize() {
        let json = r#"{"stage":"SEWING","assignedTo":"w2","assignedToName":"Siti",
            "assignedRole":"PENJAHIT"}"#;
        let req: AssignTaskRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.stage, Stage::Sewing);
        assert_eq!(req.assigned_role, Role::Penjahit);
        assert!(req.sub_batch_id.is_none());
        assert!(req.target.is_none());
    }
}
