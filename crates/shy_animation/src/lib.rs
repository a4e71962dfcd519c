//! Shy Header Animation
//!
//! Render-layer side of the header: nothing here is pushed per change.
//!
//! - **Frame Sampling**: read the published progress once per frame
//! - **Header Transforms**: panel offset, title offset and title scale as
//!   plain linear interpolations of progress

pub mod frame;
pub mod transform;

pub use frame::{Frame, FrameSampler};
pub use transform::{lerp, HeaderLayout, HeaderTransform};
