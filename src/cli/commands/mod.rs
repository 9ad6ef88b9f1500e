pub mod add;
pub mod auth;
pub mod clock;
pub mod config;
pub mod del;
pub mod edit;
pub mod export;
pub mod init;
pub mod list;
pub mod settings;
pub mod status;
pub mod summary;
pub mod sync;
