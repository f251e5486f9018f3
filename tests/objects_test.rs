//! Cuboid, label and image setters

use pointviz::{ArrayView, Component, Cuboid, Error, Image, Label, LabelPlacement, Pose};

#[test]
fn test_cuboid_default_color() {
    let cuboid = Cuboid::new(Pose::identity(), Vec::<f32>::new()).unwrap();
    assert_eq!(cuboid.rgba(), [0.0, 0.0, 0.0, 1.0]);
}

#[test]
fn test_cuboid_partial_rgba_keeps_alpha() {
    let mut cuboid = Cuboid::new(Pose::identity(), [0.2, 0.4, 0.6, 0.5]).unwrap();
    cuboid.set_rgba([1.0, 0.0, 0.0]).unwrap();
    assert_eq!(cuboid.rgba(), [1.0, 0.0, 0.0, 0.5]);
}

#[test]
fn test_cuboid_rgba_errors() {
    let mut cuboid = Cuboid::default();

    let err = cuboid.set_rgba([0.0; 5]).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));

    let err = cuboid
        .set_rgba(vec![Component::from(1.0), Component::from("green")])
        .unwrap_err();
    assert!(matches!(err, Error::TypeError(_)));
    assert_eq!(cuboid.rgba(), [0.0, 0.0, 0.0, 1.0]);

    assert!(Cuboid::new(Pose::identity(), [Component::Null]).is_err());
}

#[test]
fn test_cuboid_transform() {
    let mut cuboid = Cuboid::default();
    let pose = Pose::from_scale(2.0, 3.0, 4.0);
    cuboid.set_transform(pose);
    assert_eq!(*cuboid.transform(), pose);
}

#[test]
fn test_label_modes() {
    let mut label = Label::new_3d("origin", 0.0, 0.0, 0.0);
    assert!(label.placement().is_world());
    assert!(label.set_position(1.0, 2.0, 3.0).is_ok());
    assert!(label.set_position_2d(0.5, 0.5, false, false).is_err());
    assert_eq!(
        label.placement(),
        LabelPlacement::World {
            x: 1.0,
            y: 2.0,
            z: 3.0
        }
    );

    label.set_placement(LabelPlacement::Screen {
        x: 0.1,
        y: 0.9,
        align_right: true,
        align_top: false,
    });
    assert!(!label.placement().is_world());
    assert!(label.set_position(0.0, 0.0, 0.0).is_err());
    assert!(label.set_position_2d(0.2, 0.8, false, true).is_ok());
}

#[test]
fn test_label_text_scale_color() {
    let mut label = Label::new_2d("frame 0", 0.0, 1.0, false, true);
    assert_eq!(label.scale(), 1.0);
    assert_eq!(label.rgba(), [1.0, 1.0, 1.0, 1.0]);

    label.set_text("frame 1");
    assert_eq!(label.text(), "frame 1");

    assert!(label.set_scale(-1.0).is_err());
    assert!(label.set_scale(f32::NAN).is_err());
    label.set_scale(2.0).unwrap();
    assert_eq!(label.scale(), 2.0);

    label.set_rgba([0.0, 0.0]).unwrap();
    assert_eq!(label.rgba(), [0.0, 0.0, 1.0, 1.0]);
}

#[test]
fn test_image_mask_must_match_image() {
    let mut image = Image::new();
    let data = vec![0.5f32; 4 * 6];
    image
        .set_image(ArrayView::new(&data, &[4, 6]).unwrap())
        .unwrap();
    assert_eq!((image.width(), image.height()), (6, 4));

    let wrong = vec![0.0f32; 6 * 4 * 4];
    let err = image
        .set_mask(ArrayView::new(&wrong, &[6, 4, 4]).unwrap())
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid argument: Expected a 4 x 6 x 4 array");

    let three_channels = vec![0.0f32; 4 * 6 * 3];
    assert!(image
        .set_mask(ArrayView::new(&three_channels, &[4, 6, 3]).unwrap())
        .is_err());

    image
        .set_mask(ArrayView::new(&wrong, &[4, 6, 4]).unwrap())
        .unwrap();
    assert_eq!(image.mask().len(), 96);
}

#[test]
fn test_image_rejects_column_major() {
    let mut image = Image::new();
    let data = vec![0.0f32; 6];
    let fortran = ArrayView::new_fortran(&data, &[2, 3]).unwrap();
    assert!(image.set_image(fortran).is_err());
    assert!(!image.has_image());
}

#[test]
fn test_image_position() {
    let mut image = Image::new();
    image.set_position(-1.0, 1.0, -1.0, 0.0);
    image.set_hshift(0.5);
    let p = image.position();
    assert_eq!((p.x_min, p.x_max, p.y_min, p.y_max), (-1.0, 1.0, -1.0, 0.0));
    assert_eq!(image.hshift(), 0.5);
}
