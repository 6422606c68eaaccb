//! Presentation-layer input: the panel's fields and the actions they produce.
//!
//! # Invariants
//! - Widgets never touch the pack directly; they emit [`Action`]s.
//! - Dimension text reaches the pack unmodified so it is validated in one place.

pub mod action;
pub mod panel;

pub use action::Action;
pub use panel::DimensionInputs;
