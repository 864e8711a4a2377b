use crate::domain::model::{Bounds, Coordinates, Marker, ReferenceLocation};
use crate::domain::ports::{FitOptions, MapView};
use crate::utils::error::Result;
use serde_json::{json, Value};
use std::path::Path;

/// Map view that keeps its layers in memory and exports them as GeoJSON,
/// ready for any web map or `geojson.io`.
#[derive(Debug, Clone, Default)]
pub struct GeoJsonMap {
    markers: Vec<Marker>,
    viewport: Option<(Bounds, FitOptions)>,
    user_marker: Option<ReferenceLocation>,
    focus: Option<(Coordinates, u8)>,
}

impl GeoJsonMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn viewport(&self) -> Option<&(Bounds, FitOptions)> {
        self.viewport.as_ref()
    }

    pub fn user_marker(&self) -> Option<&ReferenceLocation> {
        self.user_marker.as_ref()
    }

    pub fn focused(&self) -> Option<(Coordinates, u8)> {
        self.focus
    }

    pub fn to_geojson(&self) -> Value {
        let mut features: Vec<Value> = self
            .markers
            .iter()
            .map(|marker| point_feature(&marker.position, json!({ "kind": "branch", "name": marker.name })))
            .collect();

        if let Some(location) = &self.user_marker {
            features.push(point_feature(
                location,
                json!({ "kind": "user", "name": "You are here" }),
            ));
        }

        let mut collection = json!({
            "type": "FeatureCollection",
            "features": features,
        });

        if let Some((bounds, options)) = &self.viewport {
            collection["bbox"] = json!([
                bounds.south_west.longitude,
                bounds.south_west.latitude,
                bounds.north_east.longitude,
                bounds.north_east.latitude
            ]);
            collection["viewport"] = json!({
                "padding": options.padding,
                "max_zoom": options.max_zoom,
            });
        }

        if let Some((center, zoom)) = &self.focus {
            collection["focus"] = json!({
                "center": [center.longitude, center.latitude],
                "zoom": zoom,
            });
        }

        collection
    }

    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let data = serde_json::to_string_pretty(&self.to_geojson())?;
        std::fs::write(path, data)?;
        tracing::debug!("Map written to {}", path.display());
        Ok(())
    }
}

// GeoJSON positions are [longitude, latitude].
fn point_feature(position: &Coordinates, properties: Value) -> Value {
    json!({
        "type": "Feature",
        "geometry": {
            "type": "Point",
            "coordinates": [position.longitude, position.latitude],
        },
        "properties": properties,
    })
}

impl MapView for GeoJsonMap {
    fn place_markers(&mut self, markers: &[Marker]) {
        self.markers = markers.to_vec();
        if markers.is_empty() {
            self.viewport = None;
        }
    }

    fn fit_bounds(&mut self, bounds: Bounds, options: FitOptions) {
        self.viewport = Some((bounds, options));
    }

    fn place_user_marker(&mut self, location: ReferenceLocation) {
        self.user_marker = Some(location);
    }

    fn focus(&mut self, center: Coordinates, zoom: u8) {
        self.focus = Some((center, zoom));
    }
}
