//! Cuboid state

use crate::backend::RenderBackend;
use crate::scene::{DrawItem, Drawable, Handle, Scene};
use crate::transform::{fill_components, Pose};
use crate::types::{Component, ObjectId, Rgba};
use crate::Result;

const DEFAULT_RGBA: Rgba = [0.0, 0.0, 0.0, 1.0];

/// A unit cube centered at the origin, placed by a pose.
#[derive(Debug, Clone, PartialEq)]
pub struct Cuboid {
    transform: Pose,
    rgba: Rgba,
}

impl Cuboid {
    /// Create a cuboid. Color components that are not given default to opaque
    /// black.
    pub fn new<I>(transform: Pose, rgba: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<Component>,
    {
        let mut color = DEFAULT_RGBA;
        fill_components(&mut color, rgba)?;
        Ok(Self {
            transform,
            rgba: color,
        })
    }

    /// Set the transform applied to the unit cube.
    pub fn set_transform(&mut self, transform: Pose) {
        self.transform = transform;
    }

    /// Set up to 4 color components; the rest keep their current values.
    pub fn set_rgba<I>(&mut self, rgba: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<Component>,
    {
        fill_components(&mut self.rgba, rgba)
    }

    pub fn transform(&self) -> &Pose {
        &self.transform
    }

    pub fn rgba(&self) -> Rgba {
        self.rgba
    }
}

impl Default for Cuboid {
    fn default() -> Self {
        Self {
            transform: Pose::identity(),
            rgba: DEFAULT_RGBA,
        }
    }
}

impl Drawable for Cuboid {
    fn collection(scene: &Scene) -> &Vec<Handle<Self>> {
        &scene.cuboids
    }

    fn collection_mut(scene: &mut Scene) -> &mut Vec<Handle<Self>> {
        &mut scene.cuboids
    }

    // unit cube geometry is shared, nothing per object to upload
    fn upload(&mut self, _id: ObjectId, _backend: &mut dyn RenderBackend, _full: bool) -> Result<()> {
        Ok(())
    }

    fn draw_item(&self, id: ObjectId) -> DrawItem {
        DrawItem::Cuboid {
            id,
            transform: self.transform,
            rgba: self.rgba,
        }
    }
}
