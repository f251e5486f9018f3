//! Scene registry and per-frame snapshot
//!
//! Objects are shared between the caller and the scene through [`Handle`]s.
//! The scene keeps at most one registration of any object; identity is the
//! shared allocation, not the contents.

use crate::backend::RenderBackend;
use crate::camera::{Camera, CameraMatrices, TargetDisplay};
use crate::cloud::Cloud;
use crate::cuboid::Cuboid;
use crate::image::{Image, ImagePosition};
use crate::label::{Label, LabelPlacement};
use crate::transform::Pose;
use crate::types::{ObjectId, Rgba};
use crate::Result;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};

/// Shared, lockable reference to a drawable object.
///
/// Cloning a handle yields another reference to the same object. Adding a
/// clone to a scene that already holds the object is a no-op.
pub struct Handle<T> {
    id: ObjectId,
    inner: Arc<Mutex<T>>,
}

impl<T> Handle<T> {
    pub fn new(value: T) -> Self {
        Self {
            id: ObjectId::next(),
            inner: Arc::new(Mutex::new(value)),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Lock the object for reading or mutation.
    ///
    /// Setters mark the buffers they touch, so changes are uploaded with the
    /// next frame. The render loop never waits on this lock: an object that is
    /// locked when a frame is prepared is drawn as it was last seen and
    /// uploaded on a later frame. Calling back into the scene while holding
    /// the guard (e.g. [`crate::PointVizHandle::update`]) is allowed.
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// True if both handles refer to the same object.
    pub fn ptr_eq(&self, other: &Handle<T>) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle").field("id", &self.id).finish()
    }
}

impl<T> From<T> for Handle<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

/// An object kind the scene knows how to store, upload and draw.
pub trait Drawable: Sized + Send + 'static {
    fn collection(scene: &Scene) -> &Vec<Handle<Self>>;

    fn collection_mut(scene: &mut Scene) -> &mut Vec<Handle<Self>>;

    /// Push changed buffers to the backend; everything when `full` is set.
    fn upload(&mut self, id: ObjectId, backend: &mut dyn RenderBackend, full: bool) -> Result<()>;

    /// Per-frame draw parameters.
    fn draw_item(&self, id: ObjectId) -> DrawItem;
}

/// Draw parameters of one object, captured while the scene was locked
#[derive(Debug, Clone, PartialEq)]
pub enum DrawItem {
    Cloud {
        id: ObjectId,
        pose: Pose,
        extrinsic: Pose,
        point_size: f32,
        points: usize,
        columns: usize,
    },
    Image {
        id: ObjectId,
        position: ImagePosition,
        hshift: f32,
    },
    Cuboid {
        id: ObjectId,
        transform: Pose,
        rgba: Rgba,
    },
    Label {
        id: ObjectId,
        text: String,
        placement: LabelPlacement,
        scale: f32,
        rgba: Rgba,
    },
}

impl DrawItem {
    pub fn id(&self) -> ObjectId {
        match self {
            DrawItem::Cloud { id, .. }
            | DrawItem::Image { id, .. }
            | DrawItem::Cuboid { id, .. }
            | DrawItem::Label { id, .. } => *id,
        }
    }
}

/// Everything the backend needs to draw one frame
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub camera: CameraMatrices,
    /// Ring spacing in meters when distance rings are shown
    pub rings: Option<f64>,
    /// Clouds, then images, then cuboids, then labels, each in insertion order
    pub items: Vec<DrawItem>,
    pub viewport: (u32, u32),
}

/// Set of objects to draw plus camera state.
#[derive(Debug, Default)]
pub struct Scene {
    pub(crate) clouds: Vec<Handle<Cloud>>,
    pub(crate) images: Vec<Handle<Image>>,
    pub(crate) cuboids: Vec<Handle<Cuboid>>,
    pub(crate) labels: Vec<Handle<Label>>,
    camera: Camera,
    target_display: TargetDisplay,
    // added since the last upload, need every buffer sent
    pending: HashSet<ObjectId>,
    // removed since the last upload, backend resources to drop
    released: Vec<ObjectId>,
    force_upload: bool,
    // draw parameters from the last frame that could lock the object
    last_items: HashMap<ObjectId, DrawItem>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object. Returns `false` if it is already in the scene.
    pub fn add<T: Drawable>(&mut self, object: &Handle<T>) -> bool {
        if self.contains(object) {
            return false;
        }
        T::collection_mut(self).push(object.clone());
        self.pending.insert(object.id());
        self.released.retain(|id| *id != object.id());
        true
    }

    /// Remove an object. Returns `false` if it was not in the scene.
    pub fn remove<T: Drawable>(&mut self, object: &Handle<T>) -> bool {
        let collection = T::collection_mut(self);
        let Some(index) = collection.iter().position(|h| h.ptr_eq(object)) else {
            return false;
        };
        collection.remove(index);
        self.pending.remove(&object.id());
        self.last_items.remove(&object.id());
        self.released.push(object.id());
        true
    }

    pub fn contains<T: Drawable>(&self, object: &Handle<T>) -> bool {
        T::collection(self).iter().any(|h| h.ptr_eq(object))
    }

    pub fn clouds(&self) -> impl Iterator<Item = &Handle<Cloud>> {
        self.clouds.iter()
    }

    pub fn images(&self) -> impl Iterator<Item = &Handle<Image>> {
        self.images.iter()
    }

    pub fn cuboids(&self) -> impl Iterator<Item = &Handle<Cuboid>> {
        self.cuboids.iter()
    }

    pub fn labels(&self) -> impl Iterator<Item = &Handle<Label>> {
        self.labels.iter()
    }

    /// Total number of objects.
    pub fn len(&self) -> usize {
        self.clouds.len() + self.images.len() + self.cuboids.len() + self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn target_display(&self) -> &TargetDisplay {
        &self.target_display
    }

    pub fn target_display_mut(&mut self) -> &mut TargetDisplay {
        &mut self.target_display
    }

    /// Request a full upload of every object on the next frame.
    pub fn update(&mut self) {
        self.force_upload = true;
    }

    pub(crate) fn pending_releases(&self) -> usize {
        self.released.len()
    }

    /// Send pending changes to the backend and capture the frame to draw.
    ///
    /// Objects whose lock is held elsewhere are not waited for; they keep
    /// their previous draw parameters and are uploaded on a later frame.
    /// On error the pending state is kept so the next frame retries.
    pub(crate) fn upload(
        &mut self,
        backend: &mut dyn RenderBackend,
        viewport: (u32, u32),
    ) -> Result<Frame> {
        for id in &self.released {
            backend.release(*id)?;
        }
        self.released.clear();

        let capacity = self.len();
        let mut pass = UploadPass {
            pending: &self.pending,
            force: self.force_upload,
            backend,
            retry: HashSet::new(),
            last_items: &mut self.last_items,
            items: Vec::with_capacity(capacity),
        };
        pass.run(&self.clouds)?;
        pass.run(&self.images)?;
        pass.run(&self.cuboids)?;
        pass.run(&self.labels)?;
        let UploadPass { retry, items, .. } = pass;
        self.pending = retry;
        self.force_upload = false;

        let aspect = if viewport.1 == 0 {
            1.0
        } else {
            viewport.0 as f64 / viewport.1 as f64
        };
        Ok(Frame {
            camera: self.camera.matrices(aspect),
            rings: self
                .target_display
                .rings_enabled()
                .then(|| self.target_display.ring_spacing()),
            items,
            viewport,
        })
    }
}

struct UploadPass<'a, 'b> {
    pending: &'a HashSet<ObjectId>,
    force: bool,
    backend: &'a mut (dyn RenderBackend + 'b),
    retry: HashSet<ObjectId>,
    last_items: &'a mut HashMap<ObjectId, DrawItem>,
    items: Vec<DrawItem>,
}

impl UploadPass<'_, '_> {
    fn run<T: Drawable>(&mut self, handles: &[Handle<T>]) -> Result<()> {
        for handle in handles {
            let id = handle.id();
            let full = self.force || self.pending.contains(&id);
            let mut object = match handle.inner.try_lock() {
                Ok(guard) => guard,
                Err(TryLockError::Poisoned(e)) => e.into_inner(),
                Err(TryLockError::WouldBlock) => {
                    // held by a mutator, which may be waiting for the scene lock
                    if full {
                        self.retry.insert(id);
                    }
                    if let Some(item) = self.last_items.get(&id) {
                        self.items.push(item.clone());
                    }
                    continue;
                }
            };
            object.upload(id, &mut *self.backend, full)?;
            let item = object.draw_item(id);
            self.last_items.insert(id, item.clone());
            self.items.push(item);
        }
        Ok(())
    }
}
