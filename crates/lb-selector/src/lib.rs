//! Priority-gated admission control and weighted backend selection.

pub mod events;
pub mod selector;

pub use events::SelectionEvent;
pub use selector::Selector;
