//! The layer collection.
//!
//! `LayerStore` is the single owner of the layers and of the resource
//! arena behind image layers. Storage is kept in creation order; display
//! order is a derived view and never rewrites storage.

use crate::error::{ModelError, ResourceError};
use crate::id::LayerId;
use crate::model::{CanvasBounds, Layer, LayerDraft, LayerKind, LayerPatch};
use crate::resources::{LocalFile, ResourceArena, ResourceHandle, ResourceLifecycle};
use crate::snapshot::SnapshotLayer;
use std::collections::HashSet;

pub struct LayerStore<R: ResourceLifecycle = ResourceArena> {
    /// Always sorted by `created_order`.
    layers: Vec<Layer>,
    /// Every id minted or restored this session, including removed ones.
    issued: HashSet<LayerId>,
    selected: Option<LayerId>,
    next_order: u64,
    bounds: CanvasBounds,
    resources: R,
}

impl LayerStore<ResourceArena> {
    pub fn new(bounds: CanvasBounds) -> Self {
        Self::with_resources(bounds, ResourceArena::new())
    }
}

impl<R: ResourceLifecycle> LayerStore<R> {
    pub fn with_resources(bounds: CanvasBounds, resources: R) -> Self {
        Self {
            layers: Vec::new(),
            issued: HashSet::new(),
            selected: None,
            next_order: 1,
            bounds,
            resources,
        }
    }

    pub fn bounds(&self) -> CanvasBounds {
        self.bounds
    }

    pub fn resources(&self) -> &R {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut R {
        &mut self.resources
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    fn get_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    fn mint_id(&self, prefix: &str, order: u64) -> LayerId {
        let mut n = order;
        loop {
            let id = LayerId::numbered(prefix, n);
            if !self.issued.contains(&id) {
                return id;
            }
            n += 1;
        }
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    /// Append a new layer with a fresh id and the next creation order.
    /// The position is clamped into the canvas.
    pub fn add_layer(&mut self, draft: LayerDraft) -> LayerId {
        let order = self.next_order;
        self.next_order += 1;
        let id = self.mint_id(draft.kind.tag().id_prefix(), order);
        self.issued.insert(id);

        let mut layer = draft.into_layer(id, order);
        (layer.x, layer.y) = self.bounds.clamp_point(layer.x, layer.y);
        log::debug!("add layer {id} at ({}, {})", layer.x, layer.y);
        self.layers.push(layer);
        id
    }

    /// Re-insert a previously persisted layer, keeping its id and order.
    /// The id stays reserved even if the layer is removed again.
    pub fn restore_layer(&mut self, mut layer: Layer) -> Result<(), ModelError> {
        if self.get(layer.id).is_some() {
            return Err(ModelError::DuplicateId(layer.id));
        }
        self.issued.insert(layer.id);
        (layer.x, layer.y) = self.bounds.clamp_point(layer.x, layer.y);
        self.next_order = self.next_order.max(layer.created_order + 1);
        let at = self
            .layers
            .partition_point(|l| l.created_order <= layer.created_order);
        self.layers.insert(at, layer);
        Ok(())
    }

    /// Merge fields into a layer. A stale id is a silent no-op.
    /// Returns whether a layer was updated.
    pub fn update_layer(&mut self, id: LayerId, patch: LayerPatch) -> bool {
        let bounds = self.bounds;
        let Some(layer) = self.get_mut(id) else {
            log::warn!("update on unknown layer {id} ignored");
            return false;
        };
        let reclamp = patch.touches_position();
        layer.apply(patch);
        if reclamp {
            (layer.x, layer.y) = bounds.clamp_point(layer.x, layer.y);
        }
        true
    }

    /// Clamp and write a center position.
    pub fn set_position(&mut self, id: LayerId, x: f32, y: f32) -> bool {
        self.update_layer(id, LayerPatch::position(x, y))
    }

    /// Remove a layer, releasing its local image handle if it holds one.
    pub fn remove_layer(&mut self, id: LayerId) -> Option<Layer> {
        let idx = self.layers.iter().position(|l| l.id == id)?;
        let mut layer = self.layers.remove(idx);

        if let LayerKind::Image(img) = &mut layer.kind
            && let Some(handle) = img.local.take()
        {
            self.release_handle(handle);
        }
        if self.selected == Some(id) {
            self.selected = None;
        }
        log::debug!("remove layer {id}");
        Some(layer)
    }

    /// Adopt new canvas bounds and pull every layer back inside them.
    pub fn reclamp(&mut self, bounds: CanvasBounds) {
        self.bounds = bounds;
        for layer in &mut self.layers {
            (layer.x, layer.y) = bounds.clamp_point(layer.x, layer.y);
        }
    }

    /// Release a handle through the arena. Misuse is logged, never raised.
    pub fn release_handle(&mut self, handle: ResourceHandle) {
        if let Err(err) = self.resources.release(handle) {
            log::warn!("resource lifecycle violation: {err}");
        }
    }

    /// Session teardown: forget every local handle and sweep the arena.
    pub fn teardown(&mut self) -> usize {
        for layer in &mut self.layers {
            if let LayerKind::Image(img) = &mut layer.kind {
                img.local = None;
            }
        }
        self.selected = None;
        self.resources.release_all()
    }

    // ─── Views ───────────────────────────────────────────────────────────

    /// Layers sorted by `created_order` (serialization order).
    pub fn list_by_creation_order(&self) -> &[Layer] {
        &self.layers
    }

    /// Newest first, as shown in the layer panel.
    pub fn list_for_display(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter().rev()
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Select a layer, or clear with `None`. Unknown ids clear the selection.
    pub fn select(&mut self, id: Option<LayerId>) {
        self.selected = id.filter(|id| self.get(*id).is_some());
    }

    pub fn selected_id(&self) -> Option<LayerId> {
        self.selected
    }

    pub fn selected(&self) -> Option<&Layer> {
        self.selected.and_then(|id| self.get(id))
    }

    // ─── Build snapshot ──────────────────────────────────────────────────

    /// Copy every layer together with the bytes behind its local handle.
    pub fn snapshot(&self) -> Vec<SnapshotLayer> {
        self.layers
            .iter()
            .map(|layer| {
                let pending = layer.local_handle().map(|h| self.read_handle(h));
                SnapshotLayer {
                    layer: layer.clone(),
                    pending,
                }
            })
            .collect()
    }

    fn read_handle(&self, handle: ResourceHandle) -> Result<LocalFile, ResourceError> {
        self.resources.read(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ShapeKind;
    use pretty_assertions::assert_eq;

    const BOUNDS: CanvasBounds = CanvasBounds {
        width: 1080.0,
        height: 1080.0,
    };

    #[test]
    fn add_assigns_increasing_order() {
        let mut store = LayerStore::new(BOUNDS);
        let a = store.add_layer(LayerDraft::text("a"));
        let b = store.add_layer(LayerDraft::shape(ShapeKind::Circle, 10.0, 10.0));
        assert_ne!(a, b);
        let orders: Vec<u64> = store
            .list_by_creation_order()
            .iter()
            .map(|l| l.created_order)
            .collect();
        assert_eq!(orders, vec![1, 2]);
    }

    #[test]
    fn stale_update_is_noop() {
        let mut store = LayerStore::new(BOUNDS);
        let id = store.add_layer(LayerDraft::text("a"));
        store.remove_layer(id);
        assert!(!store.update_layer(id, LayerPatch::position(5.0, 5.0)));
        assert!(!store.set_position(LayerId::intern("ghost"), 1.0, 1.0));
    }

    #[test]
    fn display_order_is_reverse_without_mutation() {
        let mut store = LayerStore::new(BOUNDS);
        let a = store.add_layer(LayerDraft::text("a"));
        let b = store.add_layer(LayerDraft::text("b"));
        let shown: Vec<LayerId> = store.list_for_display().map(|l| l.id).collect();
        assert_eq!(shown, vec![b, a]);
        assert_eq!(store.list_by_creation_order()[0].id, a);
    }

    #[test]
    fn removing_selected_layer_clears_selection() {
        let mut store = LayerStore::new(BOUNDS);
        let a = store.add_layer(LayerDraft::text("a"));
        store.select(Some(a));
        assert_eq!(store.selected_id(), Some(a));
        store.remove_layer(a);
        assert!(store.selected().is_none());
    }

    #[test]
    fn restore_rejects_duplicates_and_advances_counter() {
        let mut store = LayerStore::new(BOUNDS);
        let a = store.add_layer(LayerDraft::text("a"));
        let mut copy = store.get(a).cloned().unwrap();
        assert_eq!(store.restore_layer(copy.clone()), Err(ModelError::DuplicateId(a)));

        copy.id = LayerId::intern("restored_layer");
        copy.created_order = 10;
        store.restore_layer(copy).unwrap();
        let next = store.add_layer(LayerDraft::text("next"));
        assert_eq!(store.get(next).unwrap().created_order, 11);
    }

    #[test]
    fn removed_restored_id_is_never_minted_again() {
        let mut store = LayerStore::new(BOUNDS);
        let old = LayerDraft::text("old").into_layer(LayerId::numbered("text", 2), 0);
        store.restore_layer(old).unwrap();
        store.remove_layer(LayerId::numbered("text", 2));

        let a = store.add_layer(LayerDraft::text("a"));
        let b = store.add_layer(LayerDraft::text("b"));
        assert_eq!(a, LayerId::numbered("text", 1));
        assert_eq!(b, LayerId::numbered("text", 3));
    }

    #[test]
    fn reclamp_pulls_layers_inside_shrunk_canvas() {
        let mut store = LayerStore::new(BOUNDS);
        let a = store.add_layer(LayerDraft::text("a").at(1000.0, 900.0));
        store.reclamp(CanvasBounds {
            width: 500.0,
            height: 500.0,
        });
        let layer = store.get(a).unwrap();
        assert_eq!((layer.x, layer.y), (500.0, 500.0));
    }

    #[test]
    fn teardown_sweeps_image_handles() {
        let mut store = LayerStore::new(BOUNDS);
        let h = store
            .resources_mut()
            .acquire(LocalFile::new("a.png", vec![1, 2, 3]));
        let id = store.add_layer(LayerDraft::local_image(h, 100.0, 100.0));
        assert_eq!(store.teardown(), 1);
        assert_eq!(store.get(id).unwrap().local_handle(), None);
        assert_eq!(store.resources().live_count(), 0);
    }
}
