// Domain layer: branch models and the ports to external collaborators
// (content API, geolocation, map widget, configuration).

pub mod model;
pub mod ports;
