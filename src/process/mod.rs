/*!
 * Process Module
 * Process table, FIFO queues, scheduling, and lifecycle
 */

pub mod lifecycle;
pub mod queue;
pub mod scheduler;
pub mod table;
pub mod types;

pub use queue::Queue;
pub use table::ProcessTable;
pub use types::{Pcb, ProcessInfo, ProcessState};
