//! # pointviz
//!
//! Interactive visualizer for lidar point clouds.
//!
//! ## Features
//!
//! - **Scene graph**: point clouds, images, cuboids and text labels shared
//!   between the caller and the renderer through lockable handles
//! - **Structured clouds**: per-column poses applied to whole scans without
//!   touching every point
//! - **Render loop**: input dispatch, dirty-buffer upload and cooperative
//!   cancellation on a pluggable [`RenderBackend`]
//! - **Headless**: [`HeadlessBackend`] records frames in memory
//!
//! ## Example
//!
//! ```rust,no_run
//! use pointviz::{add_default_controls, ArrayView, Cloud, Handle, LogFile, PointViz, VizConfig};
//!
//! let mut viz: PointViz = PointViz::new(VizConfig::default(), LogFile::sink(true))?;
//! add_default_controls(viz.handle());
//!
//! let cloud = Handle::new(Cloud::new(4)?);
//! let xyz = [0.0f32, 1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
//! cloud.lock().set_xyz(ArrayView::from_slice(&xyz))?;
//! viz.add(&cloud);
//!
//! viz.run()?;
//! # Ok::<(), pointviz::Error>(())
//! ```

pub mod array;
pub mod backend;
pub mod camera;
pub mod cloud;
pub mod config;
pub mod controls;
pub mod cuboid;
pub mod error;
pub mod headless;
pub mod image;
pub mod input;
pub mod label;
pub mod log;
pub mod palette;
pub mod scene;
pub mod transform;
pub mod types;
pub mod viz;

// Re-exports
pub use array::{check_array, ArrayView, StorageOrder};
pub use backend::{BufferData, BufferKind, Event, Layout, RenderBackend};
pub use camera::{Camera, CameraMatrices, TargetDisplay};
pub use cloud::{Cloud, XyzLut};
pub use config::VizConfig;
pub use controls::add_default_controls;
pub use cuboid::Cuboid;
pub use error::{Error, Result};
pub use headless::{BufferCopy, EventSender, HeadlessBackend, Upload};
pub use image::{Image, ImagePosition};
pub use input::{
    Key, KeyAction, KeyEvent, KeyHandler, Modifiers, MouseButton, MouseButtonEvent,
    MouseButtonHandler, MousePosHandler, ScrollHandler, WindowCtx,
};
pub use label::{Label, LabelPlacement};
pub use log::LogFile;
pub use palette::Palette;
pub use scene::{DrawItem, Drawable, Frame, Handle, Scene};
pub use transform::Pose;
pub use types::{Component, ObjectId, Rgba};
pub use viz::{PointViz, PointVizHandle};
