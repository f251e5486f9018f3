//! In-memory render backend
//!
//! Records every upload and frame instead of drawing, and replays input
//! events queued through an [`EventSender`]. Useful for offscreen runs and
//! for driving the render loop in tests.

use crate::backend::{BufferData, BufferKind, Event, Layout, RenderBackend};
use crate::config::VizConfig;
use crate::scene::Frame;
use crate::types::ObjectId;
use crate::{Error, Result};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Owned copy of uploaded buffer contents
#[derive(Debug, Clone, PartialEq)]
pub enum BufferCopy {
    F32(Vec<f32>),
    U32(Vec<u32>),
}

impl From<BufferData<'_>> for BufferCopy {
    fn from(data: BufferData<'_>) -> Self {
        match data {
            BufferData::F32(data) => BufferCopy::F32(data.to_vec()),
            BufferData::U32(data) => BufferCopy::U32(data.to_vec()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Upload {
    pub id: ObjectId,
    pub kind: BufferKind,
    pub data: BufferCopy,
    pub layout: Layout,
}

/// Queues events for a [`HeadlessBackend`] from any thread.
#[derive(Debug, Clone, Default)]
pub struct EventSender {
    queue: Arc<Mutex<VecDeque<Event>>>,
}

impl EventSender {
    pub fn send(&self, event: Event) {
        self.queue
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(event);
    }

    /// Queue a close request, as if the window was closed by the user.
    pub fn close(&self) {
        self.send(Event::Close);
    }
}

#[derive(Debug, Default)]
pub struct HeadlessBackend {
    width: u32,
    height: u32,
    events: EventSender,
    uploads: Vec<Upload>,
    buffers: HashMap<(ObjectId, BufferKind), BufferCopy>,
    released: Vec<ObjectId>,
    frames: usize,
    last_frame: Option<Frame>,
    closed: bool,
    visible: bool,
    frame_interval: Option<Duration>,
    fail_after: Option<usize>,
}

impl HeadlessBackend {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Sleep this long in every `submit_frame`, to pace threaded tests.
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = Some(interval);
        self
    }

    /// Fail `submit_frame` once `frames` frames have been drawn.
    pub fn fail_after(mut self, frames: usize) -> Self {
        self.fail_after = Some(frames);
        self
    }

    pub fn event_sender(&self) -> EventSender {
        self.events.clone()
    }

    /// Every upload since creation or the last [`HeadlessBackend::clear_uploads`].
    pub fn uploads(&self) -> &[Upload] {
        &self.uploads
    }

    pub fn clear_uploads(&mut self) {
        self.uploads.clear();
    }

    /// Latest contents of one buffer of an object.
    pub fn buffer(&self, id: ObjectId, kind: BufferKind) -> Option<&BufferCopy> {
        self.buffers.get(&(id, kind))
    }

    pub fn released(&self) -> &[ObjectId] {
        &self.released
    }

    pub fn frame_count(&self) -> usize {
        self.frames
    }

    pub fn last_frame(&self) -> Option<&Frame> {
        self.last_frame.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl RenderBackend for HeadlessBackend {
    fn create(config: &VizConfig) -> Result<Self> {
        if config.window_width == 0 || config.window_height == 0 {
            return Err(Error::Backend(format!(
                "Invalid surface size {}x{}",
                config.window_width, config.window_height
            )));
        }
        Ok(Self::new(config.window_width, config.window_height))
    }

    fn poll_events(&mut self) -> Result<Vec<Event>> {
        let events: Vec<Event> = self
            .events
            .queue
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .drain(..)
            .collect();

        for event in &events {
            match *event {
                Event::Resize { width, height } => {
                    self.width = width;
                    self.height = height;
                }
                Event::Close => self.closed = true,
                _ => {}
            }
        }
        Ok(events)
    }

    fn upload(
        &mut self,
        id: ObjectId,
        kind: BufferKind,
        data: BufferData<'_>,
        layout: Layout,
    ) -> Result<()> {
        if data.len() != layout.size() {
            return Err(Error::Backend(format!(
                "Upload of {:?} for object {}: {} values for a layout of {}",
                kind,
                id,
                data.len(),
                layout.size()
            )));
        }
        let copy = BufferCopy::from(data);
        self.buffers.insert((id, kind), copy.clone());
        self.uploads.push(Upload {
            id,
            kind,
            data: copy,
            layout,
        });
        Ok(())
    }

    fn release(&mut self, id: ObjectId) -> Result<()> {
        self.buffers.retain(|(owner, _), _| *owner != id);
        self.released.push(id);
        Ok(())
    }

    fn submit_frame(&mut self, frame: &Frame) -> Result<()> {
        if self.fail_after.is_some_and(|limit| self.frames >= limit) {
            return Err(Error::Backend("Surface lost".to_string()));
        }
        if let Some(interval) = self.frame_interval {
            std::thread::sleep(interval);
        }
        self.frames += 1;
        self.last_frame = Some(frame.clone());
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}
