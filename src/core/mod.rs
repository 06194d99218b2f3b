// Core domain layer
pub mod interfaces;
pub mod models;
pub mod paths;
pub mod services;

pub use interfaces::*;
pub use models::*;
pub use paths::*;
pub use services::*;
