pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::{graphql::GraphQlBranchSource, map::GeoJsonMap};
pub use app::session::LocatorSession;
pub use domain::model::{BranchRecord, Coordinates, FetchedPage, ReferenceLocation};
pub use utils::error::{FetchError, GeolocationError, LocatorError, Result};
