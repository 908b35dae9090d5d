//! Pass-through allocator over the process heap.

extern crate alloc;

use alloc::alloc::{
  AllocError,
  Allocator,
  Global,
};
use core::ptr::NonNull;

use crate::raw::{
  RawAllocator,
  word_layout,
};

/// Stateless allocator that forwards every request to [`Global`].
///
/// Every other allocator in the crate eventually bottoms out here.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HeapAllocator;

impl HeapAllocator {
  pub const fn new() -> Self {
    Self
  }
}

unsafe impl RawAllocator for HeapAllocator {
  fn allocate(&self, size: usize, _tag: Option<&str>) -> Result<NonNull<u8>, AllocError> {
    let layout = word_layout(size)?;
    Ok(Global.allocate(layout)?.cast())
  }

  unsafe fn deallocate(&self, ptr: NonNull<u8>, size: usize, _tag: Option<&str>) {
    // SAFETY: the caller passes the size the block was allocated with
    unsafe { Global.deallocate(ptr, word_layout(size).unwrap_unchecked()) }
  }

  unsafe fn reallocate(
    &self,
    new_size: usize,
    ptr: NonNull<u8>,
    old_size: usize,
    _tag: Option<&str>,
  ) -> Result<NonNull<u8>, AllocError> {
    let new_layout = word_layout(new_size)?;
    // SAFETY: old_size produced a valid layout when the block was allocated
    let old_layout = unsafe { word_layout(old_size).unwrap_unchecked() };

    // SAFETY: ptr is currently allocated by Global with old_layout
    let block = unsafe {
      if new_size > old_size {
        Global.grow(ptr, old_layout, new_layout)?
      } else if new_size < old_size {
        Global.shrink(ptr, old_layout, new_layout)?
      } else {
        return Ok(ptr);
      }
    };
    Ok(block.cast())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::raw::WORD;

  #[test]
  fn allocate_is_word_aligned() {
    let heap = HeapAllocator::new();
    let ptr = heap.allocate(3, None).unwrap();
    assert_eq!(ptr.as_ptr() as usize % WORD, 0);
    unsafe { heap.deallocate(ptr, 3, None) };
  }

  #[test]
  fn reallocate_grow_preserves_contents() {
    let heap = HeapAllocator;
    let ptr = heap.allocate(4, Some("grow")).unwrap();
    unsafe {
      ptr.as_ptr().copy_from_nonoverlapping(b"abcd".as_ptr(), 4);
      let grown = heap.reallocate(4096, ptr, 4, None).unwrap();
      assert_eq!(core::slice::from_raw_parts(grown.as_ptr(), 4), b"abcd");
      heap.deallocate(grown, 4096, None);
    }
  }

  #[test]
  fn reallocate_shrink_preserves_prefix() {
    let heap = HeapAllocator;
    let ptr = heap.allocate(64, None).unwrap();
    unsafe {
      for i in 0..64 {
        ptr.as_ptr().add(i).write(i as u8);
      }
      let shrunk = heap.reallocate(8, ptr, 64, None).unwrap();
      assert_eq!(
        core::slice::from_raw_parts(shrunk.as_ptr(), 8),
        &[0, 1, 2, 3, 4, 5, 6, 7]
      );
      heap.deallocate(shrunk, 8, None);
    }
  }

  #[test]
  fn reallocate_same_size_keeps_pointer() {
    let heap = HeapAllocator;
    let ptr = heap.allocate(32, None).unwrap();
    unsafe {
      let same = heap.reallocate(32, ptr, 32, None).unwrap();
      assert_eq!(same, ptr);
      heap.deallocate(same, 32, None);
    }
  }

  #[test]
  fn impossible_request_fails() {
    assert!(HeapAllocator.allocate(usize::MAX, None).is_err());
  }

  #[test]
  fn stats_writes_nothing() {
    let mut out = alloc::string::String::new();
    HeapAllocator.stats(&mut out).unwrap();
    assert!(out.is_empty());
  }
}
