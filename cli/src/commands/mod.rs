pub mod input;
pub mod paths;
pub mod report;
pub mod watch;
