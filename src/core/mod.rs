pub mod add;
pub mod edit;
pub mod engine;
pub mod session;
pub mod summary;
