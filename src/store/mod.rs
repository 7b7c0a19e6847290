//! Persistent user state: saved presets and value colors
//!
//! Both stores are plain values owned by the caller and passed to whatever
//! needs them.

pub mod colors;
pub mod presets;

pub use colors::{preset_color, PresetColor, ValueColor, ValueColorStore, PRESET_COLORS};
pub use presets::{PresetDraft, PresetStore, PresetUpdate, QueryPreset};
