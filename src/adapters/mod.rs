// Adapters layer: concrete implementations of the domain ports
// (GraphQL content API, location providers, map output, text rendering).

pub mod graphql;
pub mod location;
pub mod map;
pub mod render;
