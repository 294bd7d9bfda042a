//! Small shared utilities.

mod task;

pub use task::{CancelToken, TaskSlot};
