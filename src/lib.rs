//! Interchangeable raw allocators for short-lived, high-churn object graphs.
//!
//! Three allocators share the size-symmetric [`RawAllocator`] contract:
//!
//! - [`HeapAllocator`] forwards to the process heap.
//! - [`SharedAllocator`] borrows another allocator so several owners draw
//!   from one pool.
//! - [`ArenaAllocator`] bump-allocates out of segments taken from a backing
//!   allocator and only gives memory back when it is dropped.
//!
//! [`ContainerAllocator`] adapts any of them to [`core::alloc::Allocator`]
//! for use with standard containers.

#![feature(allocator_api)]
#![allow(clippy::mut_from_ref)]

extern crate alloc;

pub mod adapter;
pub mod arena;
pub mod ffi;
pub mod heap;
pub mod raw;
pub mod shared;

#[cfg(test)]
mod testing;

pub use adapter::ContainerAllocator;
pub use arena::{
  ArenaAllocator,
  ArenaUsage,
};
pub use heap::HeapAllocator;
pub use raw::RawAllocator;
pub use shared::SharedAllocator;
