//! Integration tests: LayerStore invariants across add/update/remove
//! sequences, with a counting resource arena standing in for the real one.

use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use studio_core::*;

const SQUARE: CanvasBounds = CanvasBounds {
    width: 1080.0,
    height: 1080.0,
};

/// Arena that records every release, including rejected ones.
#[derive(Default)]
struct CountingArena {
    inner: ResourceArena,
    releases: Rc<RefCell<HashMap<ResourceHandle, usize>>>,
}

impl ResourceLifecycle for CountingArena {
    fn acquire(&mut self, file: LocalFile) -> ResourceHandle {
        self.inner.acquire(file)
    }

    fn release(&mut self, handle: ResourceHandle) -> Result<(), ResourceError> {
        *self.releases.borrow_mut().entry(handle).or_default() += 1;
        self.inner.release(handle)
    }

    fn read(&self, handle: ResourceHandle) -> Result<LocalFile, ResourceError> {
        self.inner.read(handle)
    }

    fn release_all(&mut self) -> usize {
        self.inner.release_all()
    }

    fn live_count(&self) -> usize {
        self.inner.live_count()
    }
}

fn image_file(name: &str) -> LocalFile {
    LocalFile::new(name, vec![0u8; 16]).with_mime("image/png")
}

// ─── Uniqueness ─────────────────────────────────────────────────────────

#[test]
fn ids_are_pairwise_distinct() {
    let mut store = LayerStore::new(SQUARE);
    let mut seen = HashSet::new();
    for i in 0..200 {
        let draft = match i % 3 {
            0 => LayerDraft::text(format!("t{i}")),
            1 => LayerDraft::shape(ShapeKind::Rectangle, 10.0, 10.0),
            _ => LayerDraft::remote_image("https://cdn/x.png", 10.0, 10.0),
        };
        let id = store.add_layer(draft);
        assert!(seen.insert(id), "duplicate id {id}");
        if i % 5 == 0 {
            store.remove_layer(id);
        }
    }
}

// ─── Creation-order stability ───────────────────────────────────────────

#[test]
fn creation_order_survives_edits_and_removals() {
    let mut store = LayerStore::new(SQUARE);
    let ids: Vec<LayerId> = (0..6)
        .map(|i| store.add_layer(LayerDraft::text(format!("{i}"))))
        .collect();

    // Edit in reverse, remove two from the middle.
    for id in ids.iter().rev() {
        store.update_layer(
            *id,
            LayerPatch {
                content: Some("edited".into()),
                ..LayerPatch::default()
            },
        );
    }
    store.remove_layer(ids[2]);
    store.remove_layer(ids[4]);
    store.set_position(ids[0], 10.0, 10.0);

    let remaining: Vec<LayerId> = store.list_by_creation_order().iter().map(|l| l.id).collect();
    assert_eq!(remaining, vec![ids[0], ids[1], ids[3], ids[5]]);
    assert!(
        store
            .list_by_creation_order()
            .windows(2)
            .all(|w| w[0].created_order < w[1].created_order)
    );
}

// ─── Clamping ───────────────────────────────────────────────────────────

#[test]
fn set_position_clamps_into_canvas() {
    let mut store = LayerStore::new(CanvasBounds {
        width: 800.0,
        height: 600.0,
    });
    let id = store.add_layer(LayerDraft::shape(ShapeKind::Circle, 50.0, 50.0));

    let probes = [
        (-10.0, -10.0),
        (400.0, 300.0),
        (801.0, 2.0),
        (5.0, 1e9),
        (f32::INFINITY, f32::NEG_INFINITY),
    ];
    for (x, y) in probes {
        store.set_position(id, x, y);
        let layer = store.get(id).unwrap();
        assert!((0.0..=800.0).contains(&layer.x), "x={} for {x}", layer.x);
        assert!((0.0..=600.0).contains(&layer.y), "y={} for {y}", layer.y);
    }

    store.set_position(id, 900.0, -1.0);
    let layer = store.get(id).unwrap();
    assert_eq!((layer.x, layer.y), (800.0, 0.0));
}

#[test]
fn added_layers_start_inside_canvas() {
    let mut store = LayerStore::new(SQUARE);
    let id = store.add_layer(LayerDraft::text("far").at(5000.0, -20.0));
    let layer = store.get(id).unwrap();
    assert_eq!((layer.x, layer.y), (1080.0, 0.0));
}

#[test]
fn drafted_sizes_are_kept_positive() {
    let mut store = LayerStore::new(SQUARE);
    let shape = store.add_layer(LayerDraft::shape(ShapeKind::Rectangle, 0.0, -5.0));
    let mut text = LayerDraft::text("tiny");
    if let LayerKind::Text(props) = &mut text.kind {
        props.font_size = -1.0;
    }
    let text = store.add_layer(text);

    let LayerKind::Shape(props) = &store.get(shape).unwrap().kind else {
        panic!("expected shape layer");
    };
    assert_eq!((props.width, props.height), (DEFAULT_LAYER_SIDE, DEFAULT_LAYER_SIDE));
    let LayerKind::Text(props) = &store.get(text).unwrap().kind else {
        panic!("expected text layer");
    };
    assert_eq!(props.font_size, TextProps::default().font_size);
}

// ─── Resource lifecycle ─────────────────────────────────────────────────

#[test]
fn image_handle_released_exactly_once() {
    let arena = CountingArena::default();
    let releases = Rc::clone(&arena.releases);
    let mut store = LayerStore::with_resources(SQUARE, arena);

    let h = store.resources_mut().acquire(image_file("logo.png"));
    let id = store.add_layer(LayerDraft::local_image(h, 120.0, 80.0));

    store.remove_layer(id);
    // A stale remove and a teardown must not touch the handle again.
    assert!(store.remove_layer(id).is_none());
    store.teardown();

    assert_eq!(releases.borrow().get(&h).copied(), Some(1));
    assert_eq!(store.resources().live_count(), 0);
}

#[test]
fn remote_image_and_text_removals_release_nothing() {
    let arena = CountingArena::default();
    let releases = Rc::clone(&arena.releases);
    let mut store = LayerStore::with_resources(SQUARE, arena);

    let t = store.add_layer(LayerDraft::text("hi"));
    let i = store.add_layer(LayerDraft::remote_image("https://cdn/a.png", 10.0, 10.0));
    store.remove_layer(t);
    store.remove_layer(i);

    assert!(releases.borrow().is_empty());
}

#[test]
fn snapshot_captures_bytes_before_release() {
    let mut store = LayerStore::new(SQUARE);
    let h = store.resources_mut().acquire(image_file("photo.png"));
    let id = store.add_layer(LayerDraft::local_image(h, 300.0, 200.0));

    let snapshot = store.snapshot();
    store.remove_layer(id);

    assert_eq!(snapshot.len(), 1);
    let pending = snapshot[0].pending.clone().unwrap().unwrap();
    assert_eq!(pending.name, "photo.png");
    assert_eq!(pending.len(), 16);
}
