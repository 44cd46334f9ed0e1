pub mod ports;
pub mod route;
pub mod sampler;

pub use ports::*;
pub use route::*;
pub use sampler::*;
