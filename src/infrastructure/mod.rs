// Infrastructure layer
pub mod compress;
pub mod environment;
pub mod file_system;
pub mod inputs;

pub use compress::*;
pub use environment::*;
pub use file_system::*;
pub use inputs::*;
