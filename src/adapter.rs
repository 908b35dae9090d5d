//! Bridge from the raw allocator contract to [`core::alloc::Allocator`], so
//! standard containers can draw from any allocator in this crate.

extern crate alloc;

use alloc::alloc::{
  AllocError,
  Allocator,
  Layout,
};
use core::{
  fmt,
  ptr::{
    self,
    NonNull,
  },
};

use crate::raw::{
  RawAllocator,
  WORD,
};

/// Borrows a [`RawAllocator`] for use with `Vec::new_in`, `Box::new_in` and
/// friends. Layouts aligned beyond [`WORD`] are refused.
pub struct ContainerAllocator<'a, A: RawAllocator> {
  base: &'a A,
}

impl<'a, A: RawAllocator> ContainerAllocator<'a, A> {
  pub const fn new(base: &'a A) -> Self {
    Self { base }
  }

  pub const fn base(&self) -> &'a A {
    self.base
  }
}

impl<A: RawAllocator> Clone for ContainerAllocator<'_, A> {
  fn clone(&self) -> Self {
    *self
  }
}

impl<A: RawAllocator> Copy for ContainerAllocator<'_, A> {}

impl<A: RawAllocator> PartialEq for ContainerAllocator<'_, A> {
  fn eq(&self, other: &Self) -> bool {
    ptr::eq(self.base, other.base)
  }
}

impl<A: RawAllocator> Eq for ContainerAllocator<'_, A> {}

impl<A: RawAllocator> fmt::Debug for ContainerAllocator<'_, A> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ContainerAllocator")
      .field("base", &ptr::from_ref(self.base))
      .finish()
  }
}

#[inline]
fn check_align(layout: Layout) -> Result<(), AllocError> {
  if layout.align() > WORD {
    return Err(AllocError);
  }
  Ok(())
}

unsafe impl<A: RawAllocator> Allocator for ContainerAllocator<'_, A> {
  fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
    check_align(layout)?;
    let ptr = self.base.allocate(layout.size(), None)?;
    Ok(NonNull::slice_from_raw_parts(ptr, layout.size()))
  }

  unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
    unsafe { self.base.deallocate(ptr, layout.size(), None) }
  }

  unsafe fn grow(
    &self,
    ptr: NonNull<u8>,
    old_layout: Layout,
    new_layout: Layout,
  ) -> Result<NonNull<[u8]>, AllocError> {
    check_align(new_layout)?;
    let new = unsafe {
      self
        .base
        .reallocate(new_layout.size(), ptr, old_layout.size(), None)?
    };
    Ok(NonNull::slice_from_raw_parts(new, new_layout.size()))
  }

  unsafe fn shrink(
    &self,
    ptr: NonNull<u8>,
    old_layout: Layout,
    new_layout: Layout,
  ) -> Result<NonNull<[u8]>, AllocError> {
    check_align(new_layout)?;
    let new = unsafe {
      self
        .base
        .reallocate(new_layout.size(), ptr, old_layout.size(), None)?
    };
    Ok(NonNull::slice_from_raw_parts(new, new_layout.size()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    arena::ArenaAllocator,
    heap::HeapAllocator,
    testing::{
      LimitedAllocator,
      RecordingAllocator,
    },
  };
  use alloc::{
    boxed::Box,
    vec::Vec,
  };

  #[test]
  fn vec_in_arena() {
    let arena = ArenaAllocator::<HeapAllocator, 1024>::new();
    let mut values = Vec::new_in(ContainerAllocator::new(&arena));
    for i in 0..500u32 {
      values.push(i);
    }
    assert_eq!(values.len(), 500);
    assert!(values.iter().copied().eq(0..500));
    assert!(arena.usage().segments() > 1);
  }

  #[test]
  fn box_in_arena_is_released_with_the_arena() {
    let backing = RecordingAllocator::default();
    {
      let arena = ArenaAllocator::<_, 256>::new_in(crate::SharedAllocator::new(&backing));
      let node = Box::new_in((1u64, 2u64), ContainerAllocator::new(&arena));
      assert_eq!(*node, (1, 2));
      drop(node);
      assert!(backing.released().is_empty());
    }
    assert_eq!(backing.released(), [256]);
  }

  #[test]
  fn vec_on_heap_round_trips_through_deallocate() {
    let backing = RecordingAllocator::default();
    {
      let mut bytes = Vec::new_in(ContainerAllocator::new(&backing));
      bytes.extend_from_slice(b"heap backed");
      bytes.shrink_to_fit();
      assert_eq!(bytes.as_slice(), b"heap backed");
    }
    let mut acquired = backing.acquired();
    let mut released = backing.released();
    acquired.sort_unstable();
    released.sort_unstable();
    assert_eq!(acquired, released);
  }

  #[test]
  fn grow_failure_surfaces_through_try_reserve() {
    let backing = LimitedAllocator::new(2);
    let mut bytes = Vec::new_in(ContainerAllocator::new(&backing));
    assert!(bytes.try_reserve_exact(8).is_ok());
    bytes.extend_from_slice(b"abc");
    assert!(bytes.try_reserve_exact(16).is_ok());
    assert!(bytes.try_reserve_exact(64).is_err());
    assert_eq!(bytes.as_slice(), b"abc");
  }

  #[test]
  fn overaligned_layout_is_refused() {
    let heap = HeapAllocator;
    let adapter = ContainerAllocator::new(&heap);
    let layout = Layout::from_size_align(64, 4 * WORD).unwrap();
    assert!(adapter.allocate(layout).is_err());

    let word = Layout::from_size_align(WORD, WORD).unwrap();
    let block = adapter.allocate(word).unwrap();
    assert_eq!(block.len(), WORD);
    unsafe { adapter.deallocate(block.cast(), word) };
  }

  #[test]
  fn adapters_over_one_base_are_equal() {
    let arena: ArenaAllocator = ArenaAllocator::new();
    let other: ArenaAllocator = ArenaAllocator::new();
    assert_eq!(ContainerAllocator::new(&arena), ContainerAllocator::new(&arena));
    assert_ne!(ContainerAllocator::new(&arena), ContainerAllocator::new(&other));
  }
}
