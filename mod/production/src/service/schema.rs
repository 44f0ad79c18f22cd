use konveksi_core::ServiceError;
use konveksi_sql::SQLStore;

/// SQL DDL statements to initialize the production schema.
///
/// Entity tables store the full JSON document in a `data` TEXT column,
/// with indexed columns extracted for efficient filtering and
/// uniqueness. Timeline tables are plain column tables — append-only,
/// no JSON blob, no update path.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS batches (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        name TEXT,
        product TEXT,
        status TEXT,
        created_by TEXT,
        create_at TEXT,
        update_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS tasks (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        batch_id TEXT,
        sub_batch_id TEXT,
        stage TEXT,
        status TEXT,
        assigned_to TEXT,
        create_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS cutting_results (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        batch_id TEXT UNIQUE,
        is_confirmed INTEGER,
        create_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS sub_batches (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        batch_id TEXT,
        code INTEGER,
        status TEXT,
        create_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS batch_timeline (
        id TEXT PRIMARY KEY,
        batch_id TEXT NOT NULL,
        event TEXT NOT NULL,
        detail TEXT,
        actor_id TEXT NOT NULL,
        create_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS sub_batch_timeline (
        id TEXT PRIMARY KEY,
        sub_batch_id TEXT NOT NULL,
        event TEXT NOT NULL,
        detail TEXT,
        actor_id TEXT NOT NULL,
        create_at TEXT NOT NULL
    )",
    // Indexes
    "CREATE INDEX IF NOT EXISTS idx_batches_status ON batches(status)",
    "CREATE INDEX IF NOT EXISTS idx_batches_product ON batches(product)",
    "CREATE INDEX IF NOT EXISTS idx_tasks_batch ON tasks(batch_id)",
    "CREATE INDEX IF NOT EXISTS idx_tasks_sub_batch ON tasks(sub_batch_id)",
    "CREATE INDEX IF NOT EXISTS idx_tasks_assigned ON tasks(assigned_to)",
    "CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status)",
    "CREATE INDEX IF NOT EXISTS idx_tasks_stage ON tasks(stage)",
    "CREATE INDEX IF NOT EXISTS idx_sub_batches_batch ON sub_batches(batch_id)",
    "CREATE INDEX IF NOT EXISTS idx_sub_batches_status ON sub_batches(status)",
    "CREATE INDEX IF NOT EXISTS idx_batch_tl_batch ON batch_timeline(batch_id)",
    "CREATE INDEX IF NOT EXISTS idx_sub_batch_tl_sub ON sub_batch_timeline(sub_batch_id)",
];

pub fn init_schema(sql: &dyn SQLStore) -> Result<(), ServiceError> {
    for stmt in SCHEMA {
        sql.exec(stmt, &[])
            .map_err(|e| ServiceError::Storage(format!("schema init failed: {}", e)))?;
    }
    Ok(())
}
