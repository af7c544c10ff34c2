//! Pointer-drag controller.
//!
//! `Idle --down on layer--> Dragging --move--> Dragging --up--> Idle`.
//! Only one drag exists at a time; a second pointer-down while dragging is
//! ignored. There is no revert: pointer-up keeps the last applied position.

use crate::input::{InputService, Subscription};
use studio_core::coords::{clamp, preview_delta_to_canvas_delta};
use studio_core::{LayerId, LayerStore, ResourceLifecycle};

/// Ephemeral state between pointer-down and pointer-up on a layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub layer_id: LayerId,
    /// Pointer position at pointer-down, preview space.
    pub pointer_start_x: f32,
    pub pointer_start_y: f32,
    /// Layer center at pointer-down, canvas space.
    pub layer_start_x: f32,
    pub layer_start_y: f32,
    subscription: Subscription,
}

impl DragSession {
    pub fn subscription(&self) -> Subscription {
        self.subscription
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

#[derive(Debug, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn session(&self) -> Option<&DragSession> {
        match &self.state {
            DragState::Dragging(s) => Some(s),
            DragState::Idle => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// Start dragging `layer` and select it. Returns `false` when a drag is
    /// already active or the layer does not exist.
    pub fn pointer_down<R: ResourceLifecycle>(
        &mut self,
        layer: LayerId,
        pointer_x: f32,
        pointer_y: f32,
        store: &mut LayerStore<R>,
        input: &mut InputService,
    ) -> bool {
        if self.is_dragging() {
            log::debug!("pointer-down on {layer} ignored: drag in progress");
            return false;
        }
        let Some((layer_x, layer_y)) = store.get(layer).map(|l| (l.x, l.y)) else {
            return false;
        };

        store.select(Some(layer));
        let subscription = input.subscribe();
        self.state = DragState::Dragging(DragSession {
            layer_id: layer,
            pointer_start_x: pointer_x,
            pointer_start_y: pointer_y,
            layer_start_x: layer_x,
            layer_start_y: layer_y,
            subscription,
        });
        log::debug!("drag start {layer} at ({layer_x}, {layer_y})");
        true
    }

    /// Move the dragged layer so it follows the pointer. `scale` is the
    /// current preview scale. Returns whether a position was written.
    pub fn pointer_move<R: ResourceLifecycle>(
        &mut self,
        pointer_x: f32,
        pointer_y: f32,
        scale: f32,
        store: &mut LayerStore<R>,
        input: &InputService,
    ) -> bool {
        let DragState::Dragging(session) = &self.state else {
            return false;
        };
        if !input.is_subscribed(session.subscription) {
            return false;
        }

        let (dx, dy) = preview_delta_to_canvas_delta(
            pointer_x - session.pointer_start_x,
            pointer_y - session.pointer_start_y,
            scale,
        );
        let bounds = store.bounds();
        let x = clamp(session.layer_start_x + dx, 0.0, bounds.width);
        let y = clamp(session.layer_start_y + dy, 0.0, bounds.height);
        store.set_position(session.layer_id, x, y)
    }

    /// End the drag and drop the global listener. Returns the layer that
    /// was being dragged.
    pub fn pointer_up(&mut self, input: &mut InputService) -> Option<LayerId> {
        match std::mem::take(&mut self.state) {
            DragState::Dragging(session) => {
                input.unsubscribe(session.subscription);
                log::debug!("drag end {}", session.layer_id);
                Some(session.layer_id)
            }
            DragState::Idle => None,
        }
    }

    /// Click on empty canvas: clears selection, but never during a drag.
    pub fn canvas_click<R: ResourceLifecycle>(&self, store: &mut LayerStore<R>) -> bool {
        if self.is_dragging() {
            return false;
        }
        store.select(None);
        true
    }
}
