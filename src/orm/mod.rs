pub mod contexts;
pub mod feature_toggle_contexts;
pub mod feature_toggles;
