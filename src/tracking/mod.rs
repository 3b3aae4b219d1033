//! Sample and event types plus the bounded buffers the pipeline runs on.

pub mod types;
pub mod sample_buffer;

pub use sample_buffer::BoundedBuffer;
pub use types::{FilteredFrame, GazeSample, MovementEvent, MovementKind};
