pub mod add;
pub mod manual;
pub mod list;
pub mod show;
pub mod notes;
pub mod auth;
pub mod init;
