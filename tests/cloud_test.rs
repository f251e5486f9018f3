//! Point cloud buffer contracts

use nalgebra::Vector3;
use pointviz::{ArrayView, Cloud, Error, Pose, XyzLut};

#[test]
fn test_xyz_size_must_be_exact() {
    let mut cloud = Cloud::new(4).expect("Failed to create cloud");

    let short = vec![0.0f32; 11];
    let long = vec![0.0f32; 13];
    let exact = vec![1.0f32; 12];

    assert!(matches!(
        cloud.set_xyz(ArrayView::from_slice(&short)),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        cloud.set_xyz(ArrayView::from_slice(&long)),
        Err(Error::InvalidArgument(_))
    ));
    // rejected buffers leave the cloud untouched
    assert!(cloud.xyz().iter().all(|&v| v == 0.0));

    cloud
        .set_xyz(ArrayView::from_slice(&exact))
        .expect("Exact size should be accepted");
    assert_eq!(cloud.xyz(), exact.as_slice());
}

#[test]
fn test_planar_xyz_position() {
    let mut cloud = Cloud::new(4).unwrap();
    let xyz = [0.0f32, 1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
    cloud.set_xyz(ArrayView::from_slice(&xyz)).unwrap();

    assert_eq!(cloud.point_position(2), Some(Vector3::new(2.0, 0.0, 0.0)));
    assert_eq!(cloud.point_position(4), None);
}

#[test]
fn test_cloud_pose_moves_points() {
    let mut cloud = Cloud::new(2).unwrap();
    let xyz = [1.0f32, 2.0, 0.0, 0.0, 0.0, 0.0];
    cloud.set_xyz(ArrayView::from_slice(&xyz)).unwrap();
    cloud.set_pose(Pose::from_translation(0.0, 0.0, 10.0));

    assert_eq!(cloud.point_position(1), Some(Vector3::new(2.0, 0.0, 10.0)));
}

fn lut_2x2() -> XyzLut {
    // all beams point along +x, offset of 1 along +z
    let direction = [1.0f32, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
    let offset = [0.0f32, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
    XyzLut::new(
        2,
        2,
        ArrayView::from_slice(&direction),
        ArrayView::from_slice(&offset),
    )
    .expect("Failed to create lookup table")
}

#[test]
fn test_structured_range() {
    let mut cloud = Cloud::structured(&lut_2x2(), Pose::identity());
    assert_eq!(cloud.size(), 4);
    assert_eq!(cloud.cols(), 2);
    // no range yet, nothing is drawn
    assert_eq!(cloud.point_position(0), None);

    let range = [5u32, 6, 7, 8];
    let flat = ArrayView::from_slice(&range);
    assert!(cloud.set_range(flat).is_err());

    let short = [1u32, 2, 3];
    let long = [1u32, 2, 3, 4, 5];
    for bad in [
        ArrayView::new(&short, &[1, 3]).unwrap(),
        ArrayView::new(&long, &[1, 5]).unwrap(),
    ] {
        assert!(matches!(
            cloud.set_range(bad),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(cloud.range(), &[0, 0, 0, 0]);
    }

    let image = ArrayView::new(&range, &[2, 2]).unwrap();
    cloud.set_range(image).expect("2-D range should be accepted");
    assert_eq!(cloud.range(), &range);
    assert_eq!(cloud.point_position(2), Some(Vector3::new(7.0, 0.0, 1.0)));
}

#[test]
fn test_column_poses() {
    let mut cloud = Cloud::structured(&lut_2x2(), Pose::identity());
    let range = [1u32; 4];
    cloud
        .set_range(ArrayView::new(&range, &[2, 2]).unwrap())
        .unwrap();

    assert!(cloud.set_column_poses(&[Pose::identity()]).is_err());

    let poses = [Pose::identity(), Pose::from_translation(0.0, 100.0, 0.0)];
    cloud.set_column_poses(&poses).unwrap();

    // odd points use the second column pose
    assert_eq!(cloud.point_position(0), Some(Vector3::new(1.0, 0.0, 1.0)));
    assert_eq!(cloud.point_position(3), Some(Vector3::new(1.0, 100.0, 1.0)));
}

#[test]
fn test_extrinsic_applies_before_column_pose() {
    let extrinsic = Pose::from_yaw(90.0);
    let mut cloud = Cloud::structured(&lut_2x2(), extrinsic);
    let range = [2u32; 4];
    cloud
        .set_range(ArrayView::new(&range, &[2, 2]).unwrap())
        .unwrap();
    cloud.set_pose(Pose::from_translation(10.0, 0.0, 0.0));

    let p = cloud.point_position(0).unwrap();
    assert!((p - Vector3::new(10.0, 2.0, 1.0)).norm() < 1e-9);
}

#[test]
fn test_palette_shape() {
    let mut cloud = Cloud::new(1).unwrap();

    let two_columns = [0.0f32; 8];
    let err = cloud
        .set_palette(ArrayView::new(&two_columns, &[4, 2]).unwrap())
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid argument: Expected a N x 3 array");

    let flat = [0.0f32; 9];
    assert!(cloud.set_palette(ArrayView::from_slice(&flat)).is_err());

    let palette = pointviz::palette::calref();
    cloud.set_palette(palette.as_view()).unwrap();
    assert_eq!(cloud.palette().len(), palette.len() * 3);
}

#[test]
fn test_mask_and_key_sizes() {
    let mut cloud = Cloud::new(3).unwrap();

    let key = [0.1f32, 0.5, 0.9];
    cloud.set_key(ArrayView::from_slice(&key)).unwrap();
    assert!(cloud.set_key(ArrayView::from_slice(&key[..2])).is_err());

    let mask = [0.0f32; 12];
    assert!(cloud.set_mask(ArrayView::from_slice(&mask)).is_err());
    cloud
        .set_mask(ArrayView::new(&mask, &[3, 4]).unwrap())
        .unwrap();
    cloud
        .set_mask(ArrayView::new(&mask, &[1, 3, 4]).unwrap())
        .unwrap();
    let fortran = ArrayView::new_fortran(&mask, &[3, 4]).unwrap();
    assert!(cloud.set_mask(fortran).is_err());
}
