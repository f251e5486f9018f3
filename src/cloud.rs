//! Point cloud state
//!
//! Each point cloud consists of `n` points with `w` column poses. The ith
//! point is transformed by the `(i % w)`th pose. For a 2048 x 64 lidar scan
//! we may have `w = 2048` poses and `n = 2048 * 64 = 131072` points.
//!
//! A per-cloud pose moves the whole cloud without having to touch all the
//! column poses.
//!
//! The world position of point `i` is
//!
//! ```text
//! pose · column_pose[i % w] · extrinsic · (xyz[i] · range[i] + offset[i])
//! ```
//!
//! where `xyz` and `offset` are stored planar: all x, then all y, then all z.

use crate::array::{check_array, ArrayView, StorageOrder};
use crate::backend::{BufferData, BufferKind, Layout, RenderBackend};
use crate::palette;
use crate::scene::{DrawItem, Drawable, Handle, Scene};
use crate::transform::Pose;
use crate::types::{ObjectId, Rgba};
use crate::{Error, Result};
use nalgebra::Vector3;

const DEFAULT_POINT_SIZE: f32 = 2.0;

/// Per-pixel unit directions and offsets of a structured sensor, as produced
/// by the calibration code.
#[derive(Debug, Clone, PartialEq)]
pub struct XyzLut {
    columns_per_frame: usize,
    pixels_per_column: usize,
    direction: Vec<f32>,
    offset: Vec<f32>,
}

impl XyzLut {
    /// Both tables hold `3 * columns_per_frame * pixels_per_column` floats,
    /// either flat and planar or as an `n x 3` column-major array.
    pub fn new(
        columns_per_frame: usize,
        pixels_per_column: usize,
        direction: ArrayView<'_, f32>,
        offset: ArrayView<'_, f32>,
    ) -> Result<Self> {
        if columns_per_frame == 0 || pixels_per_column == 0 {
            return Err(Error::InvalidArgument(
                "Sensor format must have at least one column and one pixel per column"
                    .to_string(),
            ));
        }
        let n = columns_per_frame
            .checked_mul(pixels_per_column)
            .filter(|n| n.checked_mul(3).is_some())
            .ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "Sensor format {} x {} is too large",
                    columns_per_frame, pixels_per_column
                ))
            })?;
        check_lut(&direction, n)?;
        check_lut(&offset, n)?;

        Ok(Self {
            columns_per_frame,
            pixels_per_column,
            direction: direction.data().to_vec(),
            offset: offset.data().to_vec(),
        })
    }

    pub fn columns_per_frame(&self) -> usize {
        self.columns_per_frame
    }

    pub fn pixels_per_column(&self) -> usize {
        self.pixels_per_column
    }

    pub fn direction(&self) -> &[f32] {
        &self.direction
    }

    pub fn offset(&self) -> &[f32] {
        &self.offset
    }
}

// `n * 3` must not overflow
fn check_lut(table: &ArrayView<'_, f32>, n: usize) -> Result<()> {
    check_array(table, n * 3, 0, None)?;
    if table.ndim() > 1 {
        check_array(table, n * 3, 2, Some(StorageOrder::ColumnMajor))?;
        if table.shape() != [n, 3] {
            return Err(Error::InvalidArgument(format!(
                "Expected a {} x 3 array",
                n
            )));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Default)]
struct Dirty {
    range: bool,
    key: bool,
    mask: bool,
    xyz: bool,
    offset: bool,
    column_poses: bool,
    palette: bool,
}

impl Dirty {
    fn all() -> Self {
        Self {
            range: true,
            key: true,
            mask: true,
            xyz: true,
            offset: true,
            column_poses: true,
            palette: true,
        }
    }
}

/// State of one point cloud.
#[derive(Debug, Clone)]
pub struct Cloud {
    n: usize,
    w: usize,
    extrinsic: Pose,
    range: Vec<u32>,
    key: Vec<f32>,
    mask: Vec<f32>,
    xyz: Vec<f32>,
    offset: Vec<f32>,
    column_poses: Vec<Pose>,
    pose: Pose,
    point_size: f32,
    palette: Vec<f32>,
    dirty: Dirty,
}

impl Cloud {
    /// Unstructured point cloud of `n` points. Call [`Cloud::set_xyz`] to update.
    pub fn new(n: usize) -> Result<Self> {
        Self::with_extrinsic(n, Pose::identity())
    }

    pub fn with_extrinsic(n: usize, extrinsic: Pose) -> Result<Self> {
        if n == 0 {
            return Err(Error::InvalidArgument(
                "A point cloud needs at least one point".to_string(),
            ));
        }
        Ok(Self::blank(n, 1, extrinsic, 1))
    }

    /// Structured point cloud from a sensor lookup table. Call
    /// [`Cloud::set_range`] to update.
    pub fn structured(lut: &XyzLut, extrinsic: Pose) -> Self {
        let w = lut.columns_per_frame;
        let n = w * lut.pixels_per_column;
        let mut cloud = Self::blank(n, w, extrinsic, 0);
        cloud.xyz.copy_from_slice(&lut.direction);
        cloud.offset.copy_from_slice(&lut.offset);
        cloud
    }

    fn blank(n: usize, w: usize, extrinsic: Pose, initial_range: u32) -> Self {
        Self {
            n,
            w,
            extrinsic,
            range: vec![initial_range; n],
            key: vec![0.0; n],
            mask: vec![0.0; 4 * n],
            xyz: vec![0.0; 3 * n],
            offset: vec![0.0; 3 * n],
            column_poses: vec![Pose::identity(); w],
            pose: Pose::identity(),
            point_size: DEFAULT_POINT_SIZE,
            palette: palette::spezia().colors().as_flattened().to_vec(),
            dirty: Dirty::all(),
        }
    }

    /// Number of points.
    pub fn size(&self) -> usize {
        self.n
    }

    /// Number of column poses.
    pub fn cols(&self) -> usize {
        self.w
    }

    /// Set the range values: an `h x w` row-major array of exactly `n` elements.
    pub fn set_range(&mut self, range: ArrayView<'_, u32>) -> Result<()> {
        check_array(&range, self.n, 2, Some(StorageOrder::RowMajor))?;
        self.range.copy_from_slice(range.data());
        self.dirty.range = true;
        Ok(())
    }

    /// Set the key values used for coloring, preferably normalized to [0, 1].
    pub fn set_key(&mut self, key: ArrayView<'_, f32>) -> Result<()> {
        check_array(&key, self.n, 0, Some(StorageOrder::RowMajor))?;
        self.key.copy_from_slice(key.data());
        self.dirty.key = true;
        Ok(())
    }

    /// Set the RGBA overlay drawn on top of the key colors.
    pub fn set_mask(&mut self, mask: ArrayView<'_, f32>) -> Result<()> {
        check_array(&mask, self.n * 4, 0, Some(StorageOrder::RowMajor))?;
        if mask.ndim() != 2 && mask.ndim() != 3 {
            return Err(Error::InvalidArgument(
                "Expected an array of dimensions: 2 or 3".to_string(),
            ));
        }
        self.mask.copy_from_slice(mask.data());
        self.dirty.mask = true;
        Ok(())
    }

    /// Set the xyz values: exactly `3n` floats, so that the position of the
    /// ith point is at `i`, `i + n`, `i + 2n`.
    pub fn set_xyz(&mut self, xyz: ArrayView<'_, f32>) -> Result<()> {
        check_array(&xyz, self.n * 3, 0, None)?;
        self.xyz.copy_from_slice(xyz.data());
        self.dirty.xyz = true;
        Ok(())
    }

    /// Set the per-point offsets, same layout as [`Cloud::set_xyz`].
    pub fn set_offset(&mut self, offset: ArrayView<'_, f32>) -> Result<()> {
        check_array(&offset, self.n * 3, 0, None)?;
        self.offset.copy_from_slice(offset.data());
        self.dirty.offset = true;
        Ok(())
    }

    /// Set the pose of the whole cloud.
    pub fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }

    /// Set one pose per column; exactly `w` poses are required.
    pub fn set_column_poses(&mut self, poses: &[Pose]) -> Result<()> {
        if poses.len() != self.w {
            return Err(Error::InvalidArgument(format!(
                "Expected {} column poses",
                self.w
            )));
        }
        self.column_poses.copy_from_slice(poses);
        self.dirty.column_poses = true;
        Ok(())
    }

    pub fn set_point_size(&mut self, size: f32) {
        self.point_size = size;
    }

    /// Replace the color ramp used to map keys to RGB: a row-major `k x 3`
    /// array with `k > 0`.
    pub fn set_palette(&mut self, palette: ArrayView<'_, f32>) -> Result<()> {
        check_array(&palette, 0, 2, Some(StorageOrder::RowMajor))?;
        if palette.shape()[1] != 3 || palette.shape()[0] == 0 {
            return Err(Error::InvalidArgument("Expected a N x 3 array".to_string()));
        }
        self.palette.clear();
        self.palette.extend_from_slice(palette.data());
        self.dirty.palette = true;
        Ok(())
    }

    pub fn range(&self) -> &[u32] {
        &self.range
    }

    pub fn key(&self) -> &[f32] {
        &self.key
    }

    pub fn mask(&self) -> &[f32] {
        &self.mask
    }

    pub fn xyz(&self) -> &[f32] {
        &self.xyz
    }

    pub fn offset(&self) -> &[f32] {
        &self.offset
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    pub fn extrinsic(&self) -> &Pose {
        &self.extrinsic
    }

    pub fn column_poses(&self) -> &[Pose] {
        &self.column_poses
    }

    pub fn point_size(&self) -> f32 {
        self.point_size
    }

    /// Palette entries, 3 floats each.
    pub fn palette(&self) -> &[f32] {
        &self.palette
    }

    /// World position of point `i`, or `None` if it is out of bounds or has
    /// zero range and is therefore not drawn.
    pub fn point_position(&self, i: usize) -> Option<Vector3<f64>> {
        if i >= self.n || self.range[i] == 0 {
            return None;
        }
        let n = self.n;
        let range = self.range[i] as f64;
        let local = Vector3::new(
            self.xyz[i] as f64 * range + self.offset[i] as f64,
            self.xyz[i + n] as f64 * range + self.offset[i + n] as f64,
            self.xyz[i + 2 * n] as f64 * range + self.offset[i + 2 * n] as f64,
        );
        let transform = self
            .pose
            .compose(&self.column_poses[i % self.w])
            .compose(&self.extrinsic);
        Some(transform.transform_point(&local))
    }

    /// Color of point `i`: the palette entry for its key, blended with the
    /// mask by the mask's alpha.
    pub fn point_color(&self, i: usize) -> Option<Rgba> {
        if i >= self.n {
            return None;
        }
        let base = palette::sample(&self.palette, self.key[i]);
        let mask = &self.mask[i * 4..i * 4 + 4];
        let alpha = mask[3].clamp(0.0, 1.0);
        Some([
            base[0] * (1.0 - alpha) + mask[0] * alpha,
            base[1] * (1.0 - alpha) + mask[1] * alpha,
            base[2] * (1.0 - alpha) + mask[2] * alpha,
            1.0,
        ])
    }
}

impl Drawable for Cloud {
    fn collection(scene: &Scene) -> &Vec<Handle<Self>> {
        &scene.clouds
    }

    fn collection_mut(scene: &mut Scene) -> &mut Vec<Handle<Self>> {
        &mut scene.clouds
    }

    fn upload(&mut self, id: ObjectId, backend: &mut dyn RenderBackend, full: bool) -> Result<()> {
        let n = self.n;
        let dirty = if full { Dirty::all() } else { self.dirty };

        if dirty.range {
            backend.upload(
                id,
                BufferKind::Range,
                BufferData::U32(&self.range),
                Layout::Linear { len: n },
            )?;
        }
        if dirty.key {
            backend.upload(
                id,
                BufferKind::Key,
                BufferData::F32(&self.key),
                Layout::Linear { len: n },
            )?;
        }
        if dirty.mask {
            backend.upload(
                id,
                BufferKind::Mask,
                BufferData::F32(&self.mask),
                Layout::Interleaved {
                    len: n,
                    channels: 4,
                },
            )?;
        }
        if dirty.xyz {
            backend.upload(
                id,
                BufferKind::Xyz,
                BufferData::F32(&self.xyz),
                Layout::Planar {
                    len: n,
                    components: 3,
                },
            )?;
        }
        if dirty.offset {
            backend.upload(
                id,
                BufferKind::Offset,
                BufferData::F32(&self.offset),
                Layout::Planar {
                    len: n,
                    components: 3,
                },
            )?;
        }
        if dirty.column_poses {
            let poses: Vec<f32> = self.column_poses.iter().flat_map(|p| p.to_f32()).collect();
            backend.upload(
                id,
                BufferKind::ColumnPoses,
                BufferData::F32(&poses),
                Layout::Interleaved {
                    len: self.w,
                    channels: 16,
                },
            )?;
        }
        if dirty.palette {
            backend.upload(
                id,
                BufferKind::Palette,
                BufferData::F32(&self.palette),
                Layout::Interleaved {
                    len: self.palette.len() / 3,
                    channels: 3,
                },
            )?;
        }

        self.dirty = Dirty::default();
        Ok(())
    }

    fn draw_item(&self, id: ObjectId) -> DrawItem {
        DrawItem::Cloud {
            id,
            pose: self.pose,
            extrinsic: self.extrinsic,
            point_size: self.point_size,
            points: self.n,
            columns: self.w,
        }
    }
}
