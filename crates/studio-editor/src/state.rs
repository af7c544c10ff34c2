//! Explicit editor state with a single dispatch entry point.
//!
//! Every UI-driven change to layers, selection, drag, canvas and the
//! background/thumbnail resources goes through [`EditorState::dispatch`],
//! so each transition can be exercised without a UI harness.

use crate::drag::DragController;
use crate::input::{InputEvent, InputService};
use studio_core::{
    BuildRequest, CanvasSpec, Color, LayerDraft, LayerId, LayerPatch, LayerStore, LocalFile,
    ModelError, PreviewConfig, ResourceArena, ResourceHandle, ResourceLifecycle,
};

/// A user intent.
#[derive(Debug, Clone)]
pub enum EditorAction {
    AddLayer(LayerDraft),
    /// Acquire a handle for `file` and add an image layer backed by it.
    AddImage {
        file: LocalFile,
        width: f32,
        height: f32,
        x: f32,
        y: f32,
        name: Option<String>,
    },
    UpdateLayer {
        id: LayerId,
        patch: LayerPatch,
    },
    SetPosition {
        id: LayerId,
        x: f32,
        y: f32,
    },
    RemoveLayer(LayerId),
    Select(Option<LayerId>),
    /// Pointer input from the preview. `target` is the layer under a
    /// pointer-down, `None` for empty canvas; ignored for move/up.
    Pointer {
        event: InputEvent,
        target: Option<LayerId>,
    },
    ResizeCanvas {
        width: f32,
        height: f32,
    },
    SetBackgroundColor(Color),
    SetBackground(LocalFile),
    ClearBackground,
    SetThumbnail(LocalFile),
    ClearThumbnail,
}

/// What a dispatched action did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    Added(LayerId),
    Applied,
    Ignored,
}

impl Dispatched {
    fn from_applied(applied: bool) -> Self {
        if applied { Self::Applied } else { Self::Ignored }
    }
}

pub struct EditorState<R: ResourceLifecycle = ResourceArena> {
    canvas: CanvasSpec,
    pub preview: PreviewConfig,
    layers: LayerStore<R>,
    drag: DragController,
    input: InputService,
    background: Option<ResourceHandle>,
    thumbnail: Option<ResourceHandle>,
    torn_down: bool,
}

impl EditorState<ResourceArena> {
    pub fn new(canvas: CanvasSpec) -> Self {
        Self::with_resources(canvas, ResourceArena::new())
    }
}

impl<R: ResourceLifecycle> EditorState<R> {
    pub fn with_resources(canvas: CanvasSpec, resources: R) -> Self {
        Self {
            canvas,
            preview: PreviewConfig::default(),
            layers: LayerStore::with_resources(canvas.bounds(), resources),
            drag: DragController::new(),
            input: InputService::new(),
            background: None,
            thumbnail: None,
            torn_down: false,
        }
    }

    pub fn with_preview(mut self, preview: PreviewConfig) -> Self {
        self.preview = preview;
        self
    }

    pub fn canvas(&self) -> &CanvasSpec {
        &self.canvas
    }

    pub fn layers(&self) -> &LayerStore<R> {
        &self.layers
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn input(&self) -> &InputService {
        &self.input
    }

    pub fn background(&self) -> Option<ResourceHandle> {
        self.background
    }

    pub fn thumbnail(&self) -> Option<ResourceHandle> {
        self.thumbnail
    }

    /// Current preview scale for the canvas.
    pub fn scale(&self) -> f32 {
        self.preview.scale_for(&self.canvas)
    }

    pub fn dispatch(&mut self, action: EditorAction) -> Result<Dispatched, ModelError> {
        if self.torn_down {
            log::warn!("action after teardown ignored: {action:?}");
            return Ok(Dispatched::Ignored);
        }

        let outcome = match action {
            EditorAction::AddLayer(draft) => Dispatched::Added(self.layers.add_layer(draft)),
            EditorAction::AddImage {
                file,
                width,
                height,
                x,
                y,
                name,
            } => {
                let handle = self.layers.resources_mut().acquire(file);
                let mut draft = LayerDraft::local_image(handle, width, height).at(x, y);
                draft.name = name;
                Dispatched::Added(self.layers.add_layer(draft))
            }
            EditorAction::UpdateLayer { id, patch } => {
                Dispatched::from_applied(self.layers.update_layer(id, patch))
            }
            EditorAction::SetPosition { id, x, y } => {
                Dispatched::from_applied(self.layers.set_position(id, x, y))
            }
            EditorAction::RemoveLayer(id) => {
                Dispatched::from_applied(self.layers.remove_layer(id).is_some())
            }
            EditorAction::Select(id) => {
                self.layers.select(id);
                Dispatched::Applied
            }
            EditorAction::Pointer { event, target } => self.on_pointer(event, target),
            EditorAction::ResizeCanvas { width, height } => {
                self.canvas.resize(width, height)?;
                self.layers.reclamp(self.canvas.bounds());
                Dispatched::Applied
            }
            EditorAction::SetBackgroundColor(color) => {
                self.canvas.background_color = color;
                Dispatched::Applied
            }
            EditorAction::SetBackground(file) => {
                let handle = self.layers.resources_mut().acquire(file);
                self.replace_background(Some(handle));
                Dispatched::Applied
            }
            EditorAction::ClearBackground => {
                self.replace_background(None);
                Dispatched::Applied
            }
            EditorAction::SetThumbnail(file) => {
                let handle = self.layers.resources_mut().acquire(file);
                self.replace_thumbnail(Some(handle));
                Dispatched::Applied
            }
            EditorAction::ClearThumbnail => {
                self.replace_thumbnail(None);
                Dispatched::Applied
            }
        };
        Ok(outcome)
    }

    fn on_pointer(&mut self, event: InputEvent, target: Option<LayerId>) -> Dispatched {
        match event {
            InputEvent::PointerDown { x, y } => match target {
                Some(id) => Dispatched::from_applied(self.drag.pointer_down(
                    id,
                    x,
                    y,
                    &mut self.layers,
                    &mut self.input,
                )),
                None => Dispatched::from_applied(self.drag.canvas_click(&mut self.layers)),
            },
            InputEvent::PointerMove { x, y } => {
                let scale = self.scale();
                let moved = self
                    .drag
                    .pointer_move(x, y, scale, &mut self.layers, &self.input);
                Dispatched::from_applied(moved)
            }
            InputEvent::PointerUp { .. } => {
                Dispatched::from_applied(self.drag.pointer_up(&mut self.input).is_some())
            }
        }
    }

    fn replace_background(&mut self, handle: Option<ResourceHandle>) {
        if let Some(old) = std::mem::replace(&mut self.background, handle) {
            self.layers.release_handle(old);
        }
    }

    fn replace_thumbnail(&mut self, handle: Option<ResourceHandle>) {
        if let Some(old) = std::mem::replace(&mut self.thumbnail, handle) {
            self.layers.release_handle(old);
        }
    }

    /// Snapshot everything a build needs. Later edits do not affect it.
    pub fn build_request(
        &self,
        name: impl Into<String>,
        category: impl Into<String>,
    ) -> BuildRequest {
        let read = |handle: Option<ResourceHandle>| {
            handle.and_then(|h| match self.layers.resources().read(h) {
                Ok(file) => Some(file),
                Err(err) => {
                    log::warn!("cannot read {h}: {err}");
                    None
                }
            })
        };
        BuildRequest {
            id: None,
            name: name.into(),
            category: category.into(),
            canvas: self.canvas,
            background: read(self.background),
            thumbnail: read(self.thumbnail),
            layers: self.layers.snapshot(),
        }
    }

    /// End the session: cancel any drag, drop listeners, release every
    /// outstanding handle. Returns how many handles were freed; a second
    /// call frees nothing.
    pub fn teardown(&mut self) -> usize {
        if self.torn_down {
            return 0;
        }
        self.torn_down = true;
        self.drag.pointer_up(&mut self.input);
        self.input.clear();
        self.background = None;
        self.thumbnail = None;
        let freed = self.layers.teardown();
        log::debug!("editor teardown released {freed} handle(s)");
        freed
    }
}

impl<R: ResourceLifecycle> Drop for EditorState<R> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn file(name: &str) -> LocalFile {
        LocalFile::new(name, vec![7u8; 8])
    }

    #[test]
    fn replacing_background_releases_previous() {
        let mut state = EditorState::new(CanvasSpec::default());
        state.dispatch(EditorAction::SetBackground(file("a.png"))).unwrap();
        let first = state.background().unwrap();
        state.dispatch(EditorAction::SetBackground(file("b.png"))).unwrap();

        assert_ne!(state.background(), Some(first));
        assert_eq!(state.layers().resources().live_count(), 1);
        assert!(!state.layers().resources().is_live(first));
    }

    #[test]
    fn invalid_resize_is_rejected_and_keeps_canvas() {
        let mut state = EditorState::new(CanvasSpec::default());
        let err = state
            .dispatch(EditorAction::ResizeCanvas {
                width: 0.0,
                height: 10.0,
            })
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::InvalidCanvas {
                width: 0.0,
                height: 10.0
            }
        );
        assert_eq!(state.canvas().width(), 1080.0);
    }

    #[test]
    fn teardown_is_idempotent() {
        let mut state = EditorState::new(CanvasSpec::default());
        state.dispatch(EditorAction::SetThumbnail(file("t.png"))).unwrap();
        state
            .dispatch(EditorAction::AddImage {
                file: file("i.png"),
                width: 10.0,
                height: 10.0,
                x: 5.0,
                y: 5.0,
                name: None,
            })
            .unwrap();

        assert_eq!(state.teardown(), 2);
        assert_eq!(state.teardown(), 0);
        assert_eq!(
            state.dispatch(EditorAction::SetThumbnail(file("late.png"))).unwrap(),
            Dispatched::Ignored
        );
    }

    #[test]
    fn build_request_reads_background_and_thumbnail() {
        let mut state = EditorState::new(CanvasSpec::default());
        state.dispatch(EditorAction::SetBackground(file("bg.png"))).unwrap();
        let req = state.build_request("Promo", "Poster");
        assert_eq!(req.background.unwrap().name, "bg.png");
        assert!(req.thumbnail.is_none());
        assert_eq!(req.category, "Poster");
    }
}
