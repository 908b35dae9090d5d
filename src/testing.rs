//! Instrumented backing allocators used by the unit tests.

extern crate alloc;

use alloc::{
  alloc::AllocError,
  vec::Vec,
};
use core::{
  cell::{
    Cell,
    RefCell,
  },
  ptr::NonNull,
};

use crate::{
  heap::HeapAllocator,
  raw::RawAllocator,
};

/// Heap allocator that records the size of every acquire and release.
#[derive(Debug, Default)]
pub(crate) struct RecordingAllocator {
  heap: HeapAllocator,
  pub(crate) acquired: RefCell<Vec<usize>>,
  pub(crate) released: RefCell<Vec<usize>>,
  pub(crate) tags: RefCell<Vec<Option<alloc::string::String>>>,
}

impl RecordingAllocator {
  pub(crate) fn acquired(&self) -> Vec<usize> {
    self.acquired.borrow().clone()
  }

  pub(crate) fn released(&self) -> Vec<usize> {
    self.released.borrow().clone()
  }
}

unsafe impl RawAllocator for RecordingAllocator {
  fn allocate(&self, size: usize, tag: Option<&str>) -> Result<NonNull<u8>, AllocError> {
    let ptr = self.heap.allocate(size, tag)?;
    self.acquired.borrow_mut().push(size);
    self.tags.borrow_mut().push(tag.map(Into::into));
    Ok(ptr)
  }

  unsafe fn deallocate(&self, ptr: NonNull<u8>, size: usize, tag: Option<&str>) {
    self.released.borrow_mut().push(size);
    unsafe { self.heap.deallocate(ptr, size, tag) }
  }

  unsafe fn reallocate(
    &self,
    new_size: usize,
    ptr: NonNull<u8>,
    old_size: usize,
    tag: Option<&str>,
  ) -> Result<NonNull<u8>, AllocError> {
    let new = unsafe { self.heap.reallocate(new_size, ptr, old_size, tag)? };
    self.released.borrow_mut().push(old_size);
    self.acquired.borrow_mut().push(new_size);
    Ok(new)
  }
}

/// Heap allocator that fails once `budget` successful requests were served.
#[derive(Debug)]
pub(crate) struct LimitedAllocator {
  heap: HeapAllocator,
  budget: Cell<usize>,
}

impl LimitedAllocator {
  pub(crate) fn new(budget: usize) -> Self {
    Self {
      heap: HeapAllocator,
      budget: Cell::new(budget),
    }
  }
}

unsafe impl RawAllocator for LimitedAllocator {
  fn allocate(&self, size: usize, tag: Option<&str>) -> Result<NonNull<u8>, AllocError> {
    match self.budget.get() {
      0 => Err(AllocError),
      left => {
        self.budget.set(left - 1);
        self.heap.allocate(size, tag)
      }
    }
  }

  unsafe fn deallocate(&self, ptr: NonNull<u8>, size: usize, tag: Option<&str>) {
    unsafe { self.heap.deallocate(ptr, size, tag) }
  }

  unsafe fn reallocate(
    &self,
    new_size: usize,
    ptr: NonNull<u8>,
    old_size: usize,
    tag: Option<&str>,
  ) -> Result<NonNull<u8>, AllocError> {
    match self.budget.get() {
      0 => Err(AllocError),
      left => {
        self.budget.set(left - 1);
        unsafe { self.heap.reallocate(new_size, ptr, old_size, tag) }
      }
    }
  }
}
