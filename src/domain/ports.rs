use crate::domain::model::{Bounds, Coordinates, FetchedPage, Marker, ReferenceLocation};
use crate::utils::error::{FetchError, GeolocationError};
use async_trait::async_trait;

/// Remote collaborator that serves branches one page at a time.
#[async_trait]
pub trait BranchSource: Send + Sync {
    /// Issues exactly one request; no retry.
    async fn fetch_page(&self, skip: usize, limit: usize) -> Result<FetchedPage, FetchError>;
}

/// Collaborator that knows where the user is.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<ReferenceLocation, GeolocationError>;
}

#[async_trait]
impl<T: LocationProvider + ?Sized> LocationProvider for Box<T> {
    async fn current_position(&self) -> Result<ReferenceLocation, GeolocationError> {
        (**self).current_position().await
    }
}

/// Viewport options for fitting the map to a set of markers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOptions {
    pub padding: u32,
    pub max_zoom: u8,
}

/// Map rendering collaborator.
pub trait MapView: Send {
    fn place_markers(&mut self, markers: &[Marker]);
    fn fit_bounds(&mut self, bounds: Bounds, options: FitOptions);
    fn place_user_marker(&mut self, location: ReferenceLocation);
    fn focus(&mut self, center: Coordinates, zoom: u8);
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn auth_token(&self) -> Option<&str>;
    fn page_size(&self) -> usize;
}
