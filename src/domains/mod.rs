pub mod logger;
pub mod map;
pub mod motion;
pub mod render;
pub mod routing;

pub use logger::*;
pub use map::*;
pub use motion::*;
pub use render::*;
pub use routing::*;
