pub mod fleet;
pub mod orchestrator;
pub mod scheduler;

pub use fleet::*;
pub use orchestrator::*;
pub use scheduler::*;
