pub mod application;
pub mod feedback;
pub mod fetch_log;
pub mod greenhouse;
pub mod job;
pub mod resume;
pub mod user;
