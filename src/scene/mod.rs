// scene/mod.rs

pub mod camera;
pub mod geometry;
pub mod scene;

pub use camera::{Camera, Projection};
pub use geometry::{
    Geometry, GeometryKind, LightData, ObjectId, PropertyFlags, ShaderProperty, SkinInstance,
};
pub use scene::{Drawable, Scene, Visible};
