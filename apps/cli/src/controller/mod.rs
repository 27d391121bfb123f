//! Controller layer: UI events, error modeling, and the handlers that drive the task store.

pub mod events;
pub mod interaction;

pub use interaction::InteractionController;
