pub mod model;
pub mod track;

pub use model::*;
pub use track::*;
