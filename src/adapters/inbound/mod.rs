pub mod simulated_map;

pub use simulated_map::*;
