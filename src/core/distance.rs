use crate::domain::model::Coordinates;

pub const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Great-circle distance in miles between two points given in degrees.
///
/// Total over finite input: out-of-range latitudes or longitudes still
/// produce a finite number rather than an error.
pub fn haversine_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    // Rounding can push `a` just past 1.0, and sqrt(1 - a) would then be NaN.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_MILES * c
}

pub fn distance_between(from: &Coordinates, to: &Coordinates) -> f64 {
    haversine_miles(from.latitude, from.longitude, to.latitude, to.longitude)
}
