mod batch;
mod cutting_result;
mod sub_batch;
mod task;
mod timeline;

pub use batch::{Batch, BatchStatus, CreateBatchRequest, SizeQuantity};
pub use cutting_result::CuttingResult;
pub use sub_batch::{
    CompleteSubBatchRequest, CreateSubBatchRequest, RejectBreakdown, SubBatch, SubBatchItem,
    SubBatchStatus,
};
pub use task::{
    AssignTaskRequest, CompleteTaskRequest, ProgressRequest, Stage, TaskStatus, WorkTask,
};
pub use timeline::{BatchTimelineEntry, SubBatchTimelineEntry, TimelineEvent};
