pub mod distance;
pub mod filter;
pub mod page_state;
pub mod pagination;

pub use crate::domain::model::{BranchRecord, Coordinates, FetchedPage, ReferenceLocation};
pub use crate::domain::ports::{BranchSource, ConfigProvider, LocationProvider, MapView};
pub use crate::utils::error::Result;
