//! Scene data model and synchronized object registry

pub mod object;
pub mod registry;

pub use object::{
    BoundingBoxData, ColorSpec, ObjectKind, ObjectPayload, ObjectRecord, PointCloudData,
    PointColor, SceneError, SceneObject,
};
pub use registry::ObjectRegistry;
