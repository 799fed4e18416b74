//! Thin request/response wrappers over the Pulse REST resources

mod pulse_logs;
mod scales;
mod team_feedbacks;
mod teams;
mod users;

pub use pulse_logs::PulseLogs;
pub use scales::{Moods, Workloads};
pub use team_feedbacks::TeamFeedbacks;
pub use teams::Teams;
pub use users::Users;
