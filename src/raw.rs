//! The allocator capability contract shared by every allocator in the crate.

extern crate alloc;

use alloc::alloc::{
  AllocError,
  Layout,
};
use core::{
  fmt,
  mem,
  ptr::NonNull,
};

/// Natural word size. Every allocation is rounded up to, and aligned on, this.
pub const WORD: usize = mem::size_of::<usize>();

/// Round `size` up to the next multiple of [`WORD`].
#[inline]
pub const fn align_word(size: usize) -> Option<usize> {
  match size.checked_add(WORD - 1) {
    Some(padded) => Some(padded & !(WORD - 1)),
    None => None,
  }
}

/// Word aligned layout for a raw request of `size` bytes.
#[inline]
pub(crate) fn word_layout(size: usize) -> Result<Layout, AllocError> {
  Layout::from_size_align(size, WORD).map_err(|_| AllocError)
}

/// Raw, size-symmetric memory source.
///
/// Implementors hand out blocks of at least the requested size, aligned to
/// [`WORD`]. Running out of memory is reported as [`AllocError`] and is never
/// retried. The optional `tag` names the request for diagnostics only.
///
/// # Safety
///
/// Implementors must return memory valid for reads and writes of the
/// requested size that does not overlap any other live block handed out by
/// the same allocator.
pub unsafe trait RawAllocator {
  /// Obtain at least `size` bytes.
  fn allocate(&self, size: usize, tag: Option<&str>) -> Result<NonNull<u8>, AllocError>;

  /// Return a block to the allocator.
  ///
  /// # Safety
  ///
  /// `ptr` must come from this allocator and `size` must be the size passed
  /// to the `allocate` or `reallocate` call that produced it.
  unsafe fn deallocate(&self, ptr: NonNull<u8>, size: usize, tag: Option<&str>);

  /// Resize a block, preserving its first `min(old_size, new_size)` bytes.
  ///
  /// The returned pointer may or may not equal `ptr`.
  ///
  /// # Safety
  ///
  /// Same requirements as [`RawAllocator::deallocate`] for `ptr` and
  /// `old_size`. On success `ptr` must no longer be used unless it was
  /// returned.
  unsafe fn reallocate(
    &self,
    new_size: usize,
    ptr: NonNull<u8>,
    old_size: usize,
    tag: Option<&str>,
  ) -> Result<NonNull<u8>, AllocError>;

  /// Diagnostic hook. Writes nothing unless an allocator has something to say.
  fn stats<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
    let _ = out;
    Ok(())
  }
}
