pub mod domain;
pub mod events;
pub mod filter;
pub mod form;
pub mod memory;
pub mod ports;
pub mod session;
pub mod stats;
pub mod store;

pub use domain::{
    AuthEvent, JobApplication, JobApplicationUpdate, JobStatus, NewJobApplication, Session,
    SignUpOutcome, User,
};
pub use filter::{FilterOption, SortOrder, StatusFilter};
pub use form::{JobForm, ValidationErrors};
pub use ports::{
    AuthEventStream, AuthService, JobRecordService, NotificationService, PortError, PortResult,
};
pub use session::SessionStore;
pub use stats::JobStats;
pub use store::{JobState, JobStore};
