//! Homogeneous transforms and tuple conversion helpers

use crate::array::{check_array, ArrayView, StorageOrder};
use crate::types::Component;
use crate::{Error, Result};
use nalgebra::{Matrix4, Point3, Vector3};
use std::ops::Mul;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 4x4 homogeneous transformation, stored column-major.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pose(Matrix4<f64>);

impl Pose {
    pub fn identity() -> Self {
        Self(Matrix4::identity())
    }

    pub fn from_matrix(matrix: Matrix4<f64>) -> Self {
        Self(matrix)
    }

    pub fn from_translation(x: f64, y: f64, z: f64) -> Self {
        Self(Matrix4::new_translation(&Vector3::new(x, y, z)))
    }

    /// Uniform or per-axis scaling about the origin.
    pub fn from_scale(x: f64, y: f64, z: f64) -> Self {
        Self(Matrix4::new_nonuniform_scaling(&Vector3::new(x, y, z)))
    }

    /// Rotation of `degrees` about the z axis.
    pub fn from_yaw(degrees: f64) -> Self {
        Self(Matrix4::from_axis_angle(
            &Vector3::z_axis(),
            degrees.to_radians(),
        ))
    }

    /// Build from 16 values in column-major order.
    pub fn from_column_major(values: &[f64]) -> Result<Self> {
        if values.len() != 16 {
            return Err(Error::InvalidArgument(
                "Expected array of size: 16".to_string(),
            ));
        }
        Ok(Self(Matrix4::from_column_slice(values)))
    }

    /// Build from a 4x4 column-major array.
    pub fn from_array(array: ArrayView<'_, f64>) -> Result<Self> {
        check_array(&array, 16, 2, Some(StorageOrder::ColumnMajor))?;
        if array.shape() != [4, 4] {
            return Err(Error::InvalidArgument(
                "Expected a 4 x 4 array".to_string(),
            ));
        }
        Self::from_column_major(array.data())
    }

    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.0
    }

    /// The 16 values in column-major order.
    pub fn as_slice(&self) -> &[f64] {
        self.0.as_slice()
    }

    /// Column-major single precision copy, as uploaded to the GPU.
    pub fn to_f32(&self) -> [f32; 16] {
        let mut out = [0.0f32; 16];
        for (dst, src) in out.iter_mut().zip(self.0.as_slice()) {
            *dst = *src as f32;
        }
        out
    }

    pub fn translation(&self) -> Vector3<f64> {
        Vector3::new(self.0[(0, 3)], self.0[(1, 3)], self.0[(2, 3)])
    }

    /// `self · other`
    pub fn compose(&self, other: &Pose) -> Pose {
        Pose(self.0 * other.0)
    }

    pub fn transform_point(&self, point: &Vector3<f64>) -> Vector3<f64> {
        self.0.transform_point(&Point3::from(*point)).coords
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for Pose {
    type Output = Pose;

    fn mul(self, rhs: Pose) -> Pose {
        self.compose(&rhs)
    }
}

impl From<Matrix4<f64>> for Pose {
    fn from(value: Matrix4<f64>) -> Self {
        Self(value)
    }
}

impl From<Pose> for Matrix4<f64> {
    fn from(value: Pose) -> Self {
        value.0
    }
}

/// Overwrite the leading elements of `dst` with the numeric values of
/// `items`. Elements beyond `items.len()` keep their current value.
///
/// Fails without touching `dst` if more than `N` items are given or any item
/// is not a number.
pub fn fill_components<const N: usize, I>(dst: &mut [f32; N], items: I) -> Result<()>
where
    I: IntoIterator,
    I::Item: Into<Component>,
{
    let items: Vec<Component> = items.into_iter().map(Into::into).collect();
    if items.len() > N {
        return Err(Error::InvalidArgument(format!(
            "Expected a tuple of size <= {}",
            N
        )));
    }

    let values = items
        .iter()
        .map(Component::as_f32)
        .collect::<Option<Vec<f32>>>()
        .ok_or_else(|| Error::TypeError("Expected a tuple of floats".to_string()))?;

    dst[..values.len()].copy_from_slice(&values);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_major_layout() {
        let mut values = [0.0f64; 16];
        values[0] = 1.0;
        values[5] = 1.0;
        values[10] = 1.0;
        values[15] = 1.0;
        // translation lives in the last column
        values[12] = 3.0;
        values[13] = 4.0;
        values[14] = 5.0;

        let pose = Pose::from_column_major(&values).unwrap();
        assert_eq!(pose.translation(), Vector3::new(3.0, 4.0, 5.0));
        assert_eq!(pose.as_slice(), &values);
        assert_eq!(pose, Pose::from_translation(3.0, 4.0, 5.0));
    }

    #[test]
    fn test_from_array_checks_storage_order() {
        let values = Pose::from_translation(1.0, 0.0, 0.0).as_slice().to_vec();
        let fortran = ArrayView::new_fortran(&values, &[4, 4]).unwrap();
        assert!(Pose::from_array(fortran).is_ok());

        let c_order = ArrayView::new(&values, &[4, 4]).unwrap();
        assert!(matches!(
            Pose::from_array(c_order),
            Err(Error::InvalidArgument(_))
        ));

        let flat = ArrayView::from_slice(&values);
        assert!(Pose::from_array(flat).is_err());

        let wrong_shape = ArrayView::new_fortran(&values, &[2, 8]).unwrap();
        assert!(Pose::from_array(wrong_shape).is_err());
    }

    #[test]
    fn test_compose() {
        let a = Pose::from_translation(1.0, 0.0, 0.0);
        let b = Pose::from_yaw(90.0);
        let p = (a * b).transform_point(&Vector3::new(1.0, 0.0, 0.0));
        assert!((p - Vector3::new(1.0, 1.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn test_fill_components() {
        let mut rgba = [0.0, 0.0, 0.0, 1.0];
        fill_components(&mut rgba, [1.0, 0.5]).unwrap();
        assert_eq!(rgba, [1.0, 0.5, 0.0, 1.0]);

        let err = fill_components(&mut rgba, [0.0; 5]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));

        let err = fill_components(
            &mut rgba,
            vec![Component::from(0.0), Component::from("blue")],
        )
        .unwrap_err();
        assert!(matches!(err, Error::TypeError(_)));
        assert_eq!(rgba, [1.0, 0.5, 0.0, 1.0]);
    }
}
