mod job;
mod poller;

pub use job::{GenerationRecord, Job, JobStatus, PollConfig};
pub use poller::{PollError, PollOutcome, PollState, PollStep, evaluate, poll_until_done};
