//! Segment-chained arena allocator and its supporting types.

mod base;
mod segment;
mod usage;


pub use base::{
  ArenaAllocator,
  DEFAULT_SEGMENT_SIZE,
};
pub use segment::HEADER_SIZE;
pub use usage::ArenaUsage;
