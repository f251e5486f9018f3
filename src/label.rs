//! Text label state

use crate::backend::RenderBackend;
use crate::scene::{DrawItem, Drawable, Handle, Scene};
use crate::transform::fill_components;
use crate::types::{Component, ObjectId, Rgba};
use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const DEFAULT_RGBA: Rgba = [1.0, 1.0, 1.0, 1.0];

/// Where a label is anchored
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LabelPlacement {
    /// Top left (viewer's left) of the label at a world position
    World { x: f64, y: f64, z: f64 },
    /// Screen position in [0, 1]; by default the anchor is the top left corner
    Screen {
        x: f32,
        y: f32,
        align_right: bool,
        align_top: bool,
    },
}

impl LabelPlacement {
    pub fn is_world(&self) -> bool {
        matches!(self, LabelPlacement::World { .. })
    }
}

/// State of one text label.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    text: String,
    placement: LabelPlacement,
    scale: f32,
    rgba: Rgba,
}

impl Label {
    /// Label anchored in the 3D scene.
    pub fn new_3d(text: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
        Self::with_placement(text, LabelPlacement::World { x, y, z })
    }

    /// Label anchored on the screen, coordinates in [0, 1].
    pub fn new_2d(
        text: impl Into<String>,
        x: f32,
        y: f32,
        align_right: bool,
        align_top: bool,
    ) -> Self {
        Self::with_placement(
            text,
            LabelPlacement::Screen {
                x,
                y,
                align_right,
                align_top,
            },
        )
    }

    pub fn with_placement(text: impl Into<String>, placement: LabelPlacement) -> Self {
        Self {
            text: text.into(),
            placement,
            scale: 1.0,
            rgba: DEFAULT_RGBA,
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Move a 3D label. Fails on a 2D label; use [`Label::set_placement`] to
    /// change the kind of placement.
    pub fn set_position(&mut self, x: f64, y: f64, z: f64) -> Result<()> {
        if !self.placement.is_world() {
            return Err(Error::InvalidArgument(
                "Cannot set a 3D position on a 2D label".to_string(),
            ));
        }
        self.placement = LabelPlacement::World { x, y, z };
        Ok(())
    }

    /// Move a 2D label. Fails on a 3D label; use [`Label::set_placement`] to
    /// change the kind of placement.
    pub fn set_position_2d(
        &mut self,
        x: f32,
        y: f32,
        align_right: bool,
        align_top: bool,
    ) -> Result<()> {
        if self.placement.is_world() {
            return Err(Error::InvalidArgument(
                "Cannot set a 2D position on a 3D label".to_string(),
            ));
        }
        self.placement = LabelPlacement::Screen {
            x,
            y,
            align_right,
            align_top,
        };
        Ok(())
    }

    /// Replace the placement, switching between 2D and 3D if needed.
    pub fn set_placement(&mut self, placement: LabelPlacement) {
        self.placement = placement;
    }

    pub fn set_scale(&mut self, scale: f32) -> Result<()> {
        if scale.is_nan() || scale < 0.0 {
            return Err(Error::InvalidArgument(format!(
                "Label scale must be nonnegative, got {}",
                scale
            )));
        }
        self.scale = scale;
        Ok(())
    }

    /// Set up to 4 color components; the rest keep their current values.
    pub fn set_rgba<I>(&mut self, rgba: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<Component>,
    {
        fill_components(&mut self.rgba, rgba)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn placement(&self) -> LabelPlacement {
        self.placement
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn rgba(&self) -> Rgba {
        self.rgba
    }
}

impl Drawable for Label {
    fn collection(scene: &Scene) -> &Vec<Handle<Self>> {
        &scene.labels
    }

    fn collection_mut(scene: &mut Scene) -> &mut Vec<Handle<Self>> {
        &mut scene.labels
    }

    // glyphs come from the backend's font atlas
    fn upload(&mut self, _id: ObjectId, _backend: &mut dyn RenderBackend, _full: bool) -> Result<()> {
        Ok(())
    }

    fn draw_item(&self, id: ObjectId) -> DrawItem {
        DrawItem::Label {
            id,
            text: self.text.clone(),
            placement: self.placement,
            scale: self.scale,
            rgba: self.rgba,
        }
    }
}
