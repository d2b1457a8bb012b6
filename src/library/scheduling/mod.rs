//! Job handling and scheduling structs

mod job;
mod job_scheduler;
mod task_manager;

pub use job::Job;
pub use job_scheduler::JobScheduler;
pub use task_manager::TaskManager;

use job_scheduler::JobStatus;
