pub mod batch;
pub mod cutting_result;
pub mod sub_batch;
pub mod task;
