//! Input abstraction layer.
//!
//! Normalizes pointer events from the preview surface into `InputEvent`,
//! and tracks who is listening for *global* pointer move/up events. A drag
//! subscribes when it starts and unsubscribes when it ends, so repeated
//! drags never leave listeners behind.

use smallvec::SmallVec;

/// A normalized pointer event in preview (screen) space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown { x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    PointerUp { x: f32, y: f32 },
}

impl InputEvent {
    pub fn position(&self) -> (f32, f32) {
        match *self {
            Self::PointerDown { x, y }
            | Self::PointerMove { x, y }
            | Self::PointerUp { x, y } => (x, y),
        }
    }

    /// Move and up events are delivered globally, not to a hit layer.
    pub fn is_global(&self) -> bool {
        matches!(self, Self::PointerMove { .. } | Self::PointerUp { .. })
    }
}

/// Token returned by [`InputService::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u32);

/// Registry of global pointer-move/up listeners.
#[derive(Debug, Default)]
pub struct InputService {
    active: SmallVec<[Subscription; 2]>,
    next: u32,
}

impl InputService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Subscription {
        self.next += 1;
        let sub = Subscription(self.next);
        self.active.push(sub);
        sub
    }

    /// Returns `false` if the subscription was not active.
    pub fn unsubscribe(&mut self, sub: Subscription) -> bool {
        match self.active.iter().position(|s| *s == sub) {
            Some(i) => {
                self.active.swap_remove(i);
                true
            }
            None => false,
        }
    }

    pub fn is_subscribed(&self, sub: Subscription) -> bool {
        self.active.contains(&sub)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Drop every listener (session teardown).
    pub fn clear(&mut self) {
        self.active.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_unsubscribe_balances() {
        let mut input = InputService::new();
        let a = input.subscribe();
        let b = input.subscribe();
        assert_ne!(a, b);
        assert!(input.unsubscribe(a));
        assert!(!input.unsubscribe(a));
        assert!(input.is_subscribed(b));
        assert_eq!(input.active_count(), 1);
    }

    #[test]
    fn only_move_and_up_are_global() {
        assert!(!InputEvent::PointerDown { x: 0.0, y: 0.0 }.is_global());
        assert!(InputEvent::PointerUp { x: 1.0, y: 2.0 }.is_global());
        assert_eq!(InputEvent::PointerMove { x: 1.0, y: 2.0 }.position(), (1.0, 2.0));
    }
}
