//! Borrowing wrapper that lets several owners draw from one pool.

extern crate alloc;

use alloc::alloc::AllocError;
use core::{
  fmt,
  ptr::{
    self,
    NonNull,
  },
};

use crate::raw::RawAllocator;

/// Non-owning handle to a base allocator.
///
/// Two handles are equal exactly when they refer to the same base instance,
/// so containers holding them may treat them as interchangeable. The base
/// must outlive every handle, which the borrow enforces.
pub struct SharedAllocator<'a, A: RawAllocator> {
  base: &'a A,
}

impl<'a, A: RawAllocator> SharedAllocator<'a, A> {
  pub const fn new(base: &'a A) -> Self {
    Self { base }
  }

  pub const fn base(&self) -> &'a A {
    self.base
  }
}

impl<A: RawAllocator> Clone for SharedAllocator<'_, A> {
  fn clone(&self) -> Self {
    *self
  }
}

impl<A: RawAllocator> Copy for SharedAllocator<'_, A> {}

impl<A: RawAllocator> PartialEq for SharedAllocator<'_, A> {
  fn eq(&self, other: &Self) -> bool {
    ptr::eq(self.base, other.base)
  }
}

impl<A: RawAllocator> Eq for SharedAllocator<'_, A> {}

impl<A: RawAllocator> fmt::Debug for SharedAllocator<'_, A> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SharedAllocator")
      .field("base", &ptr::from_ref(self.base))
      .finish()
  }
}

unsafe impl<A: RawAllocator> RawAllocator for SharedAllocator<'_, A> {
  #[inline]
  fn allocate(&self, size: usize, tag: Option<&str>) -> Result<NonNull<u8>, AllocError> {
    self.base.allocate(size, tag)
  }

  #[inline]
  unsafe fn deallocate(&self, ptr: NonNull<u8>, size: usize, tag: Option<&str>) {
    unsafe { self.base.deallocate(ptr, size, tag) }
  }

  #[inline]
  unsafe fn reallocate(
    &self,
    new_size: usize,
    ptr: NonNull<u8>,
    old_size: usize,
    tag: Option<&str>,
  ) -> Result<NonNull<u8>, AllocError> {
    unsafe { self.base.reallocate(new_size, ptr, old_size, tag) }
  }

  fn stats<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
    self.base.stats(out)
  }
}
