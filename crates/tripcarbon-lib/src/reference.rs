//! Region reference layers loaded once at start-up.
//!
//! Two GeoJSON polygon layers are expected in the data directory: rail carbon
//! intensity per country and electricity mix intensity per country. Every
//! polygon of the rail file, with or without a factor, also makes up the
//! landmass avoided by the sea-lane graph. All of it is immutable after
//! loading and can be shared freely between threads.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use geo::{BoundingRect, ClosestPoint, Closest};
use geo_types::{Coord, LineString, MultiPolygon, Point, Rect};
use geojson::{Feature, FeatureCollection, GeoJson, JsonValue};
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, AABB};
use tracing::{debug, info};

use crate::error::{Error, Result};

const DATA_DIR_ENV: &str = "TRIPCARBON_DATA_DIR";

/// File holding rail intensity polygons (`ISO2`, `NAME`, `EF_tot` in gCO2/pkm).
pub const RAIL_LAYER_FILENAME: &str = "rail_intensity.geojson";
/// File holding electricity mix polygons (`Code`, `NAME`, `mix` in gCO2/kWh).
pub const ELECTRICITY_LAYER_FILENAME: &str = "electricity_intensity.geojson";

/// Property names read from a layer's features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerSchema {
    pub id: &'static str,
    pub name: &'static str,
    pub factor: &'static str,
}

pub const RAIL_SCHEMA: LayerSchema = LayerSchema {
    id: "ISO2",
    name: "NAME",
    factor: "EF_tot",
};

pub const ELECTRICITY_SCHEMA: LayerSchema = LayerSchema {
    id: "Code",
    name: "NAME",
    factor: "mix",
};

/// One polygon of a reference layer with its emission factor.
#[derive(Debug, Clone)]
pub struct Region {
    pub id: String,
    pub name: Option<String>,
    /// Raw factor as stored in the layer (gCO2/pkm or gCO2/kWh).
    pub factor: f64,
    pub shape: MultiPolygon<f64>,
    pub bbox: Rect<f64>,
}

impl Region {
    pub fn new(
        id: impl Into<String>,
        name: Option<String>,
        factor: f64,
        shape: MultiPolygon<f64>,
    ) -> Option<Self> {
        let bbox = shape.bounding_rect()?;
        Some(Self {
            id: id.into(),
            name,
            factor,
            shape,
            bbox,
        })
    }

    /// Name for display, falling back to the identifier.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    /// Planar distance in degrees from `point` to the region, zero inside it.
    fn distance_to(&self, point: Point<f64>) -> f64 {
        match self.shape.closest_point(&point) {
            Closest::Intersection(_) => 0.0,
            Closest::SinglePoint(closest) => {
                (closest.x() - point.x()).hypot(closest.y() - point.y())
            }
            Closest::Indeterminate => f64::INFINITY,
        }
    }
}

type RegionEnvelope = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// A polygon layer indexed by bounding box.
#[derive(Debug)]
pub struct RegionLayer {
    regions: Vec<Region>,
    index: RTree<RegionEnvelope>,
}

impl RegionLayer {
    pub fn new(regions: Vec<Region>) -> Self {
        let index = bbox_index(regions.iter().map(|region| region.bbox));
        Self { regions, index }
    }

    /// Parse a GeoJSON `FeatureCollection`. Features without polygonal geometry
    /// or without a numeric factor are skipped.
    pub fn from_geojson_str(text: &str, schema: LayerSchema, source: &Path) -> Result<Self> {
        Self::from_collection(&feature_collection(text, source)?, schema, source)
    }

    fn from_collection(
        collection: &FeatureCollection,
        schema: LayerSchema,
        source: &Path,
    ) -> Result<Self> {
        let mut regions = Vec::with_capacity(collection.features.len());
        for feature in &collection.features {
            match region_from_feature(feature, schema)? {
                Some(region) => regions.push(region),
                None => debug!(source = %source.display(), "skipping feature without usable factor"),
            }
        }

        if regions.is_empty() {
            return Err(Error::ReferenceData {
                path: source.to_path_buf(),
                message: format!("no feature carries '{}' and '{}'", schema.id, schema.factor),
            });
        }

        Ok(Self::new(regions))
    }

    pub fn load(path: &Path, schema: LayerSchema) -> Result<Self> {
        let layer = Self::from_collection(&read_collection(path)?, schema, path)?;
        info!(path = %path.display(), regions = layer.len(), "loaded reference layer");
        Ok(layer)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn region(&self, idx: usize) -> &Region {
        &self.regions[idx]
    }

    /// Indices of regions whose bounding box intersects `rect`.
    pub fn candidates(&self, rect: Rect<f64>) -> Vec<usize> {
        locate(&self.index, rect)
    }

    /// Region closest to any vertex of `line`.
    pub fn nearest(&self, line: &LineString<f64>) -> Option<usize> {
        let probes: Vec<Point<f64>> = line.points().collect();
        self.regions
            .iter()
            .enumerate()
            .map(|(idx, region)| {
                let distance = probes
                    .iter()
                    .map(|p| region.distance_to(*p))
                    .fold(f64::INFINITY, f64::min);
                (idx, distance)
            })
            .filter(|(_, distance)| distance.is_finite())
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(idx, _)| idx)
    }
}

/// Land polygons the sea-lane graph routes around.
///
/// Built from every polygonal feature of the rail layer, whether or not it
/// carries a rail factor.
#[derive(Debug)]
pub struct Landmass {
    shapes: Vec<MultiPolygon<f64>>,
    index: RTree<RegionEnvelope>,
}

impl Landmass {
    pub fn new(shapes: Vec<MultiPolygon<f64>>) -> Self {
        let shapes: Vec<MultiPolygon<f64>> = shapes
            .into_iter()
            .filter(|shape| shape.bounding_rect().is_some())
            .collect();
        let index = bbox_index(shapes.iter().filter_map(|shape| shape.bounding_rect()));
        Self { shapes, index }
    }

    pub fn from_geojson_str(text: &str, source: &Path) -> Result<Self> {
        Self::from_collection(&feature_collection(text, source)?)
    }

    fn from_collection(collection: &FeatureCollection) -> Result<Self> {
        let mut shapes = Vec::with_capacity(collection.features.len());
        for feature in &collection.features {
            if let Some(shape) = feature_shape(feature)? {
                shapes.push(shape);
            }
        }
        Ok(Self::new(shapes))
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Every land polygon whose bounding box intersects `rect`, merged into
    /// one multi-polygon.
    pub fn within(&self, rect: Rect<f64>) -> MultiPolygon<f64> {
        MultiPolygon::new(
            locate(&self.index, rect)
                .into_iter()
                .flat_map(|idx| self.shapes[idx].0.iter().cloned())
                .collect(),
        )
    }
}

fn bbox_index(boxes: impl Iterator<Item = Rect<f64>>) -> RTree<RegionEnvelope> {
    let envelopes = boxes
        .enumerate()
        .map(|(idx, bbox)| {
            let (min, max) = (bbox.min(), bbox.max());
            GeomWithData::new(Rectangle::from_corners([min.x, min.y], [max.x, max.y]), idx)
        })
        .collect();
    RTree::bulk_load(envelopes)
}

fn locate(index: &RTree<RegionEnvelope>, rect: Rect<f64>) -> Vec<usize> {
    let envelope = AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]);
    let mut found: Vec<usize> = index
        .locate_in_envelope_intersecting(&envelope)
        .map(|entry| entry.data)
        .collect();
    found.sort_unstable();
    found
}

fn feature_collection(text: &str, source: &Path) -> Result<FeatureCollection> {
    match text.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => Ok(collection),
        _ => Err(Error::ReferenceData {
            path: source.to_path_buf(),
            message: "expected a FeatureCollection".to_string(),
        }),
    }
}

fn read_collection(path: &Path) -> Result<FeatureCollection> {
    let text = fs::read_to_string(path).map_err(|err| Error::ReferenceData {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    feature_collection(&text, path)
}

fn feature_shape(feature: &Feature) -> Result<Option<MultiPolygon<f64>>> {
    let Some(geometry) = feature.geometry.as_ref() else {
        return Ok(None);
    };
    Ok(match geo_types::Geometry::<f64>::try_from(geometry.value.clone())? {
        geo_types::Geometry::Polygon(polygon) => Some(MultiPolygon::new(vec![polygon])),
        geo_types::Geometry::MultiPolygon(multi) => Some(multi),
        _ => None,
    })
}

fn region_from_feature(feature: &Feature, schema: LayerSchema) -> Result<Option<Region>> {
    let Some(shape) = feature_shape(feature)? else {
        return Ok(None);
    };

    let Some(id) = feature.property(schema.id).and_then(property_text) else {
        return Ok(None);
    };
    let Some(factor) = feature.property(schema.factor).and_then(property_number) else {
        return Ok(None);
    };
    let name = feature.property(schema.name).and_then(property_text);

    Ok(Region::new(id, name, factor, shape))
}

fn property_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(text) if !text.is_empty() => Some(text.clone()),
        JsonValue::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn property_number(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(number) => number.as_f64(),
        JsonValue::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Both reference layers and the landmass.
#[derive(Debug)]
pub struct ReferenceData {
    /// Rail intensity per country, only regions with a factor.
    pub rail: RegionLayer,
    /// Electricity mix per country.
    pub electricity: RegionLayer,
    /// Every polygon of the rail file.
    pub land: Landmass,
}

impl ReferenceData {
    pub fn load(data_dir: &Path) -> Result<Self> {
        let rail_path = data_dir.join(RAIL_LAYER_FILENAME);
        let rail_collection = read_collection(&rail_path)?;
        let rail = RegionLayer::from_collection(&rail_collection, RAIL_SCHEMA, &rail_path)?;
        let land = Landmass::from_collection(&rail_collection)?;
        info!(
            path = %rail_path.display(),
            regions = rail.len(),
            land_shapes = land.len(),
            "loaded reference layer"
        );

        Ok(Self {
            rail,
            electricity: RegionLayer::load(
                &data_dir.join(ELECTRICITY_LAYER_FILENAME),
                ELECTRICITY_SCHEMA,
            )?,
            land,
        })
    }

    pub fn land(&self) -> &Landmass {
        &self.land
    }
}

/// Platform-specific directory holding the reference layers.
pub fn default_data_dir() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("org", "tripcarbon", "tripcarbon").ok_or(Error::DataDirUnavailable)?;
    Ok(dirs.data_dir().to_path_buf())
}

/// Resolve the data directory.
///
/// 1. Explicit `target` argument when provided.
/// 2. `TRIPCARBON_DATA_DIR` environment variable.
/// 3. Platform-specific project directories.
pub fn resolve_data_dir(target: Option<&Path>) -> Result<PathBuf> {
    if let Some(explicit) = target {
        return Ok(explicit.to_path_buf());
    }
    if let Some(env_path) = env::var_os(DATA_DIR_ENV) {
        return Ok(PathBuf::from(env_path));
    }
    default_data_dir()
}

/// Coordinate helper for bounding boxes built from two corners.
pub(crate) fn rect_around(a: Coord<f64>, b: Coord<f64>, margin: f64) -> Rect<f64> {
    Rect::new(
        Coord {
            x: a.x.min(b.x) - margin,
            y: a.y.min(b.y) - margin,
        },
        Coord {
            x: a.x.max(b.x) + margin,
            y: a.y.max(b.y) + margin,
        },
    )
}
