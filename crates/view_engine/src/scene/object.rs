//! Scene object records and payload validation
//!
//! Everything that crosses the sync wire lands here first: the raw
//! [`ObjectRecord`] is validated into a typed [`ObjectKind`] plus
//! [`ObjectPayload`] before any renderable resource is built. Validation is
//! the gate for `MalformedPayload`; backends receive only well-formed data.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::render::backend::{RenderError, RenderableHandle};

/// Scene-level errors
#[derive(Error, Debug)]
pub enum SceneError {
    /// The record names a kind outside the closed set
    #[error("unknown object kind: {0}")]
    UnknownKind(String),

    /// The payload does not match the kind's schema
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// The render backend failed to build or update a resource
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Closed set of synchronized object kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Built-in wireframe ground plane
    GroundPlane,
    /// Built-in unit cube shown before any data arrives
    DefaultCube,
    /// Point cloud with uniform or per-point colors
    PointCloud,
    /// Oriented bounding box drawn as line segments
    BoundingBox,
}

impl ObjectKind {
    /// Parse the wire `kind` discriminant
    pub fn parse(kind: &str) -> Result<Self, SceneError> {
        match kind {
            "GroundPlane" => Ok(Self::GroundPlane),
            "DefaultCube" => Ok(Self::DefaultCube),
            "PointCloud" => Ok(Self::PointCloud),
            "BoundingBox" => Ok(Self::BoundingBox),
            other => Err(SceneError::UnknownKind(other.to_string())),
        }
    }

    /// Wire name of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GroundPlane => "GroundPlane",
            Self::DefaultCube => "DefaultCube",
            Self::PointCloud => "PointCloud",
            Self::BoundingBox => "BoundingBox",
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lenient color value: packed RGB integer or `[r, g, b]` float triple
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    /// Packed RGB integer, e.g. `0xff8800`
    Scalar(u32),
    /// Float components in `[0, 1]`
    Components(Vec<f32>),
}

impl Default for ColorSpec {
    fn default() -> Self {
        Self::Scalar(0x00ff_ffff)
    }
}

impl ColorSpec {
    /// Resolve to `[r, g, b]` floats; short component lists fall back to white
    pub fn to_rgb(&self) -> [f32; 3] {
        match self {
            Self::Scalar(packed) => [
                ((packed >> 16) & 0xff) as f32 / 255.0,
                ((packed >> 8) & 0xff) as f32 / 255.0,
                (packed & 0xff) as f32 / 255.0,
            ],
            Self::Components(components) => {
                if components.len() < 3 {
                    log::error!("invalid color components: {:?}", components);
                    [1.0, 1.0, 1.0]
                } else {
                    [components[0], components[1], components[2]]
                }
            }
        }
    }
}

/// Point-cloud color: a single uniform value or one entry per point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointColor {
    /// Uniform packed RGB color applied to every point
    Uniform(u32),
    /// Per-point colors; must correspond 1:1 with the point list
    PerPoint(Vec<ColorSpec>),
}

impl Default for PointColor {
    fn default() -> Self {
        Self::Uniform(0x00ff_ffff)
    }
}

fn default_point_size() -> f32 {
    0.1
}

/// Validated `PointCloud` payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointCloudData {
    /// Point positions as `[x, y, z]` triples
    pub points: Vec<[f32; 3]>,
    /// Uniform or per-point color
    #[serde(default)]
    pub color: PointColor,
    /// Rendered point size
    #[serde(default = "default_point_size")]
    pub size: f32,
}

impl PointCloudData {
    /// Resolve per-point `[r, g, b]` colors.
    ///
    /// A per-point array whose length differs from the point count is treated
    /// like a non-array color: every point gets the uniform default instead.
    pub fn resolved_colors(&self) -> Vec<[f32; 3]> {
        match &self.color {
            PointColor::Uniform(packed) => {
                let rgb = ColorSpec::Scalar(*packed).to_rgb();
                vec![rgb; self.points.len()]
            }
            PointColor::PerPoint(colors) => {
                if colors.len() != self.points.len() {
                    log::warn!(
                        "per-point color count {} does not match point count {}; using uniform fallback",
                        colors.len(),
                        self.points.len()
                    );
                    vec![ColorSpec::default().to_rgb(); self.points.len()]
                } else {
                    colors.iter().map(ColorSpec::to_rgb).collect()
                }
            }
        }
    }
}

fn default_line_width() -> f32 {
    1.0
}

fn default_dash_scale() -> f32 {
    1.0
}

fn default_dash_size() -> f32 {
    3.0
}

fn default_gap_size() -> f32 {
    1.0
}

/// Validated `BoundingBox` payload
///
/// The box is the 7-tuple `[cx, cy, cz, xs, ys, zs, rot_z]`: center, full
/// extents, and rotation about the up axis in radians.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBoxData {
    /// Center, extents, and Z rotation
    pub bbox: [f32; 7],
    /// Stroke color
    #[serde(default)]
    pub color: ColorSpec,
    /// Stroke width
    #[serde(default = "default_line_width")]
    pub linewidth: f32,
    /// Whether the stroke is dashed
    #[serde(default)]
    pub dashed: bool,
    /// Dash pattern scale
    #[serde(default = "default_dash_scale")]
    pub scale: f32,
    /// Dash segment length
    #[serde(default = "default_dash_size")]
    pub dashsize: f32,
    /// Dash gap length
    #[serde(default = "default_gap_size")]
    pub gapsize: f32,
}

impl BoundingBoxData {
    /// Box center
    pub fn center(&self) -> [f32; 3] {
        [self.bbox[0], self.bbox[1], self.bbox[2]]
    }

    /// Full extents along each axis
    pub fn extents(&self) -> [f32; 3] {
        [self.bbox[3], self.bbox[4], self.bbox[5]]
    }

    /// Rotation about the up axis in radians
    pub fn rotation(&self) -> f32 {
        self.bbox[6]
    }
}

/// Kind-specific payload, validated against the kind's schema
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectPayload {
    /// Built-ins carry no payload
    None,
    /// Point-cloud data
    PointCloud(PointCloudData),
    /// Bounding-box data
    BoundingBox(BoundingBoxData),
}

fn default_name() -> String {
    "unnamed".to_string()
}

/// Wire shape of a synchronized record: `{ id, kind, name, payload }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    /// Opaque unique identifier
    pub id: String,
    /// Kind discriminant (validated into [`ObjectKind`])
    pub kind: String,
    /// Display label, non-authoritative
    #[serde(default = "default_name")]
    pub name: String,
    /// Kind-dependent payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl ObjectRecord {
    /// Create a payload-free record
    pub fn new(id: impl Into<String>, kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            name: name.into(),
            payload: None,
        }
    }

    /// Validate the kind discriminant
    pub fn parse_kind(&self) -> Result<ObjectKind, SceneError> {
        ObjectKind::parse(&self.kind)
    }

    /// Validate the payload against the kind's schema
    pub fn parse_payload(&self, kind: ObjectKind) -> Result<ObjectPayload, SceneError> {
        match kind {
            ObjectKind::GroundPlane | ObjectKind::DefaultCube => Ok(ObjectPayload::None),
            ObjectKind::PointCloud => {
                let value = self.require_payload(kind)?;
                let data: PointCloudData = serde_json::from_value(value)
                    .map_err(|e| SceneError::MalformedPayload(format!("{kind}: {e}")))?;
                Ok(ObjectPayload::PointCloud(data))
            }
            ObjectKind::BoundingBox => {
                let value = self.require_payload(kind)?;
                let data: BoundingBoxData = serde_json::from_value(value)
                    .map_err(|e| SceneError::MalformedPayload(format!("{kind}: {e}")))?;
                Ok(ObjectPayload::BoundingBox(data))
            }
        }
    }

    fn require_payload(&self, kind: ObjectKind) -> Result<Value, SceneError> {
        self.payload
            .clone()
            .ok_or_else(|| SceneError::MalformedPayload(format!("{kind}: missing payload")))
    }
}

/// A synchronized scene entity held by the registry
#[derive(Debug)]
pub struct SceneObject {
    /// Opaque unique identifier
    pub id: String,
    /// Validated kind
    pub kind: ObjectKind,
    /// Display label
    pub name: String,
    /// Validated payload
    pub payload: ObjectPayload,
    /// Whether the renderable is in the active render set
    pub visible: bool,
    /// Renderable resource, exclusively owned by this record
    pub handle: RenderableHandle,
}
