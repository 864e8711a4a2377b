use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Parses the content API's `"lat,lng"` form.
    ///
    /// Anything that does not yield two finite numbers is treated as absent,
    /// which leaves the branch unmappable and without a distance.
    pub fn parse(raw: &str) -> Option<Self> {
        let (lat, lng) = raw.split_once(',')?;
        let latitude: f64 = lat.trim().parse().ok()?;
        let longitude: f64 = lng.trim().parse().ok()?;

        if latitude.is_finite() && longitude.is_finite() {
            Some(Self::new(latitude, longitude))
        } else {
            None
        }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// The user's own position, the origin for distance ranking.
pub type ReferenceLocation = Coordinates;

/// One physical branch location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchRecord {
    pub name: String,
    pub city: Option<String>,
    pub street: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub coordinates: Option<Coordinates>,
    /// Set only once a reference location is known and `coordinates` is present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_miles: Option<f64>,
    #[serde(skip)]
    pub is_hidden_by_filter: bool,
}

impl BranchRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            city: None,
            street: None,
            phone: None,
            email: None,
            coordinates: None,
            distance_miles: None,
            is_hidden_by_filter: false,
        }
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_street(mut self, street: impl Into<String>) -> Self {
        self.street = Some(street.into());
        self
    }

    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.coordinates = Some(Coordinates::new(latitude, longitude));
        self
    }

    pub fn city_or_empty(&self) -> &str {
        self.city.as_deref().unwrap_or("")
    }

    pub fn street_or_empty(&self) -> &str {
        self.street.as_deref().unwrap_or("")
    }
}

/// Result of one page request: the page's records and the server-side total.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedPage {
    pub records: Vec<BranchRecord>,
    pub total: usize,
}

impl FetchedPage {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// A pin on the map view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub name: String,
    pub position: Coordinates,
}

/// Axis-aligned lat/lng box enclosing a set of points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub south_west: Coordinates,
    pub north_east: Coordinates,
}

impl Bounds {
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Coordinates>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Bounds {
            south_west: *first,
            north_east: *first,
        };

        for point in iter {
            bounds.south_west.latitude = bounds.south_west.latitude.min(point.latitude);
            bounds.south_west.longitude = bounds.south_west.longitude.min(point.longitude);
            bounds.north_east.latitude = bounds.north_east.latitude.max(point.latitude);
            bounds.north_east.longitude = bounds.north_east.longitude.max(point.longitude);
        }

        Some(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_coordinates() {
        let coords = Coordinates::parse("40.7128,-74.0060").unwrap();
        assert_eq!(coords.latitude, 40.7128);
        assert_eq!(coords.longitude, -74.006);

        let spaced = Coordinates::parse(" 34.05 , -118.24 ").unwrap();
        assert_eq!(spaced, Coordinates::new(34.05, -118.24));
    }

    #[test]
    fn test_parse_malformed_coordinates_is_absent() {
        assert!(Coordinates::parse("").is_none());
        assert!(Coordinates::parse("40.7128").is_none());
        assert!(Coordinates::parse("north,west").is_none());
        assert!(Coordinates::parse("40.7,").is_none());
        assert!(Coordinates::parse("NaN,1.0").is_none());
    }

    #[test]
    fn test_bounds_from_points() {
        let points = vec![
            Coordinates::new(40.0, -75.0),
            Coordinates::new(34.0, -118.0),
            Coordinates::new(47.6, -122.3),
        ];
        let bounds = Bounds::from_points(&points).unwrap();
        assert_eq!(bounds.south_west, Coordinates::new(34.0, -122.3));
        assert_eq!(bounds.north_east, Coordinates::new(47.6, -75.0));

        assert!(Bounds::from_points(&Vec::<Coordinates>::new()).is_none());
    }
}
