pub mod console_logger;
pub mod file_logger;
pub mod geojson_sink;
pub mod multi_logger;
pub mod multi_sink;
pub mod noop_logger;
pub mod osrm;
pub mod overpass;
pub mod tracing_sink;

pub use console_logger::*;
pub use file_logger::*;
pub use geojson_sink::*;
pub use multi_logger::*;
pub use multi_sink::*;
pub use noop_logger::*;
pub use osrm::*;
pub use overpass::*;
pub use tracing_sink::*;
