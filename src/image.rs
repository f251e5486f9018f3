//! Screen-space image overlay

use crate::array::{check_array, ArrayView, StorageOrder};
use crate::backend::{BufferData, BufferKind, Layout, RenderBackend};
use crate::scene::{DrawItem, Drawable, Handle, Scene};
use crate::types::ObjectId;
use crate::{Error, Result};

/// Display position `{x_min, x_max, y_min, y_max}`.
///
/// y is in [-1, 1] and x uses the same scale, so the window width is ignored
/// and the image keeps its aspect ratio when the window is resized.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ImagePosition {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
}

/// State of one image.
#[derive(Debug, Clone, Default)]
pub struct Image {
    width: usize,
    height: usize,
    data: Vec<f32>,
    mask_width: usize,
    mask_height: usize,
    mask: Vec<f32>,
    position: ImagePosition,
    hshift: f32,
    image_dirty: bool,
    mask_dirty: bool,
}

impl Image {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the image data from a row-major `height x width` array.
    pub fn set_image(&mut self, image: ArrayView<'_, f32>) -> Result<()> {
        check_array(&image, 0, 2, Some(StorageOrder::RowMajor))?;
        let (height, width) = (image.shape()[0], image.shape()[1]);

        // a mask of the old size no longer lines up with the image
        if !self.mask.is_empty() && (self.mask_width != width || self.mask_height != height) {
            self.mask.clear();
            self.mask_width = 0;
            self.mask_height = 0;
            self.mask_dirty = true;
        }

        self.width = width;
        self.height = height;
        self.data.clear();
        self.data.extend_from_slice(image.data());
        self.image_dirty = true;
        Ok(())
    }

    /// Set the RGBA mask from a row-major `height x width x 4` array. Once an
    /// image is set, the mask must have the same width and height.
    pub fn set_mask(&mut self, mask: ArrayView<'_, f32>) -> Result<()> {
        check_array(&mask, 0, 3, Some(StorageOrder::RowMajor))?;
        let shape = mask.shape();
        if shape[2] != 4 {
            return Err(Error::InvalidArgument(
                "Expected a M x N x 4 array".to_string(),
            ));
        }
        let (height, width) = (shape[0], shape[1]);
        if self.has_image() && (width != self.width || height != self.height) {
            return Err(Error::InvalidArgument(format!(
                "Expected a {} x {} x 4 array",
                self.height, self.width
            )));
        }

        self.mask_width = width;
        self.mask_height = height;
        self.mask.clear();
        self.mask.extend_from_slice(mask.data());
        self.mask_dirty = true;
        Ok(())
    }

    pub fn set_position(&mut self, x_min: f32, x_max: f32, y_min: f32, y_max: f32) {
        self.position = ImagePosition {
            x_min,
            x_max,
            y_min,
            y_max,
        };
    }

    /// Set the horizontal shift in normalized viewport width.
    ///
    /// `0` keeps the image centered, `-1` moves it left by half a viewport,
    /// `0.5` moves it right by a quarter viewport.
    pub fn set_hshift(&mut self, hshift: f32) {
        self.hshift = hshift;
    }

    pub fn has_image(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn mask(&self) -> &[f32] {
        &self.mask
    }

    pub fn position(&self) -> ImagePosition {
        self.position
    }

    pub fn hshift(&self) -> f32 {
        self.hshift
    }

    /// Placement in normalized device coordinates `[x_min, x_max, y_min, y_max]`
    /// for a viewport of the given width / height ratio.
    pub fn ndc_rect(&self, aspect: f32) -> [f32; 4] {
        let aspect = if aspect > 0.0 { aspect } else { 1.0 };
        let p = self.position;
        [
            p.x_min / aspect + self.hshift,
            p.x_max / aspect + self.hshift,
            p.y_min,
            p.y_max,
        ]
    }
}

impl Drawable for Image {
    fn collection(scene: &Scene) -> &Vec<Handle<Self>> {
        &scene.images
    }

    fn collection_mut(scene: &mut Scene) -> &mut Vec<Handle<Self>> {
        &mut scene.images
    }

    fn upload(&mut self, id: ObjectId, backend: &mut dyn RenderBackend, full: bool) -> Result<()> {
        if (full || self.image_dirty) && self.has_image() {
            backend.upload(
                id,
                BufferKind::Image,
                BufferData::F32(&self.data),
                Layout::Grid {
                    width: self.width,
                    height: self.height,
                    channels: 1,
                },
            )?;
        }
        if full || self.mask_dirty {
            backend.upload(
                id,
                BufferKind::ImageMask,
                BufferData::F32(&self.mask),
                Layout::Grid {
                    width: self.mask_width,
                    height: self.mask_height,
                    channels: 4,
                },
            )?;
        }
        self.image_dirty = false;
        self.mask_dirty = false;
        Ok(())
    }

    fn draw_item(&self, id: ObjectId) -> DrawItem {
        DrawItem::Image {
            id,
            position: self.position,
            hshift: self.hshift,
        }
    }
}
