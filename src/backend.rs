//! Boundary with the windowing / GPU backend
//!
//! The engine never talks to a graphics API directly. A [`RenderBackend`]
//! owns the native surface and receives typed buffer uploads and one
//! [`Frame`](crate::scene::Frame) per loop iteration.

use crate::config::VizConfig;
use crate::input::{Key, KeyAction, Modifiers, MouseButton};
use crate::scene::Frame;
use crate::types::ObjectId;
use crate::Result;

/// Which GPU buffer of an object an upload replaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    Range,
    Key,
    Mask,
    Xyz,
    Offset,
    ColumnPoses,
    Palette,
    Image,
    ImageMask,
}

/// Borrowed buffer contents; only valid for the duration of the upload call.
#[derive(Debug, Clone, Copy)]
pub enum BufferData<'a> {
    F32(&'a [f32]),
    U32(&'a [u32]),
}

impl BufferData<'_> {
    pub fn len(&self) -> usize {
        match self {
            BufferData::F32(data) => data.len(),
            BufferData::U32(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// How the elements of an upload are arranged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `len` scalars
    Linear { len: usize },
    /// `components` contiguous blocks of `len` scalars each (all x, then all y, ...)
    Planar { len: usize, components: usize },
    /// `len` records of `channels` scalars each
    Interleaved { len: usize, channels: usize },
    /// Row-major `height` x `width` texture with `channels` scalars per texel
    Grid {
        width: usize,
        height: usize,
        channels: usize,
    },
}

impl Layout {
    /// Number of scalars described by the layout.
    pub fn size(&self) -> usize {
        match *self {
            Layout::Linear { len } => len,
            Layout::Planar { len, components } => len * components,
            Layout::Interleaved { len, channels } => len * channels,
            Layout::Grid {
                width,
                height,
                channels,
            } => width * height * channels,
        }
    }
}

/// Input and window events reported by the backend
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Key {
        key: Key,
        action: KeyAction,
        mods: Modifiers,
    },
    MouseButton {
        button: MouseButton,
        action: KeyAction,
        mods: Modifiers,
    },
    MousePos {
        x: f64,
        y: f64,
    },
    Scroll {
        x: f64,
        y: f64,
    },
    Resize {
        width: u32,
        height: u32,
    },
    Close,
}

/// A renderable surface that accepts typed vertex/texture data and
/// composites it once per frame.
///
/// All methods are called from the thread that created the visualizer.
pub trait RenderBackend {
    /// Create the native surface.
    fn create(config: &VizConfig) -> Result<Self>
    where
        Self: Sized;

    /// Drain pending OS/input events.
    fn poll_events(&mut self) -> Result<Vec<Event>>;

    /// Replace one buffer of an object. `data` must be copied if it is needed
    /// after the call returns.
    fn upload(
        &mut self,
        id: ObjectId,
        kind: BufferKind,
        data: BufferData<'_>,
        layout: Layout,
    ) -> Result<()>;

    /// Drop every GPU resource of an object that left the scene.
    fn release(&mut self, id: ObjectId) -> Result<()>;

    /// Draw and present one frame.
    fn submit_frame(&mut self, frame: &Frame) -> Result<()>;

    fn is_closed(&self) -> bool;

    fn set_visible(&mut self, visible: bool);
}
