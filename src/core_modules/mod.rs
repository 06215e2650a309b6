// THEORY:
// `core_modules` holds the per-frame stages of the horizon pipeline, in the order
// a frame flows through them. Each stage is a plain struct or free function with no
// knowledge of the stages around it; `pipeline::HorizonPipeline` wires them together.

pub mod attitude;
pub mod edge_extractor;
pub mod frame;
pub mod horizon_selector;
pub mod line_detector;
pub mod overlay;
pub mod pixel;
pub mod utils;
