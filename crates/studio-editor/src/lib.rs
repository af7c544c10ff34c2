pub mod drag;
pub mod input;
pub mod state;

pub use drag::{DragController, DragSession, DragState};
pub use input::{InputEvent, InputService, Subscription};
pub use state::{Dispatched, EditorAction, EditorState};
