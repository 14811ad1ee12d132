pub mod config;
pub mod constants;
pub mod grid;
pub mod math;
pub mod types;

pub use config::{ConfigError, LandscapeConfig};
pub use grid::HeightGrid;
pub use math::Ray;
pub use types::{RecordId, Rgb};
