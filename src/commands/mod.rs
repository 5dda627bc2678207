pub mod auth;
pub mod expenses;
pub mod init;
pub mod stats;
