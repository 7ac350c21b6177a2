//! Background worker.
//!
//! - `TaskWorker` - Drains the durable task queue on an interval

mod task_worker;

pub use task_worker::TaskWorker;
