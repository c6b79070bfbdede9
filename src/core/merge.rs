pub mod bases;
pub mod common_ancestors;
pub mod diff3;
pub mod inputs;
pub mod ort;
