pub mod session;
pub mod settings;
pub mod shift;
pub mod user;
