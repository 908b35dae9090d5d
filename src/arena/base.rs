//! Segment-chained bump allocator.

extern crate alloc;

use alloc::alloc::AllocError;
use core::{
  cell::Cell,
  fmt,
  ptr::{
    self,
    NonNull,
  },
};

#[cfg(feature = "tracing")]
use tracing::{
  debug,
  trace,
};

use crate::{
  arena::{
    segment::{
      HEADER_SIZE,
      Segment,
      Segments,
    },
    usage::ArenaUsage,
  },
  heap::HeapAllocator,
  raw::{
    RawAllocator,
    align_word,
  },
};

/// Segment size used when none is given.
pub const DEFAULT_SEGMENT_SIZE: usize = 65536;

/// Bump allocator that carves `S`-byte segments out of a backing allocator.
///
/// Individual blocks are never reclaimed: `deallocate` does nothing and the
/// whole chain is handed back to the backing allocator when the arena is
/// dropped. Requests of at least [`ArenaAllocator::CAPACITY`] bytes get a
/// dedicated segment linked behind the head, so the head keeps serving small
/// requests.
///
/// The arena is not `Sync`. Give every thread its own arena, optionally over
/// a shared thread-safe backing pool.
#[derive(Debug)]
pub struct ArenaAllocator<A: RawAllocator = HeapAllocator, const S: usize = DEFAULT_SEGMENT_SIZE> {
  allocator: A,
  head: Cell<Option<NonNull<Segment>>>,
  /// Bytes consumed in the head segment.
  allocated: Cell<usize>,
}

// SAFETY: the arena exclusively owns its chain; moving it moves the chain
unsafe impl<A: RawAllocator + Send, const S: usize> Send for ArenaAllocator<A, S> {}

impl<const S: usize> ArenaAllocator<HeapAllocator, S> {
  pub fn new() -> Self {
    Self::new_in(HeapAllocator)
  }
}

impl<const S: usize> Default for ArenaAllocator<HeapAllocator, S> {
  fn default() -> Self {
    Self::new()
  }
}

impl<A: RawAllocator, const S: usize> ArenaAllocator<A, S> {
  /// Usable bytes of a full segment.
  pub const CAPACITY: usize = S - HEADER_SIZE;

  const SEGMENT_FITS_HEADER: () = assert!(S > HEADER_SIZE, "segment size must exceed the header");

  pub fn new_in(allocator: A) -> Self {
    let () = Self::SEGMENT_FITS_HEADER;
    Self {
      allocator,
      head: Cell::new(None),
      allocated: Cell::new(0),
    }
  }

  /// Usable bytes of a full segment.
  pub const fn arena_size() -> usize {
    Self::CAPACITY
  }

  /// The allocator segments are obtained from.
  pub fn backing(&self) -> &A {
    &self.allocator
  }

  pub fn usage(&self) -> ArenaUsage {
    let head = self.head.get();
    let (segments, reserved) = Segments::new(head).fold((0, 0), |(count, bytes), seg| {
      // SAFETY: every link in the chain is a live header
      (count + 1, bytes + unsafe { seg.as_ref().size() })
    });
    // SAFETY: head is a live header
    let head_capacity = head.map_or(0, |head| unsafe { head.as_ref().capacity() });
    ArenaUsage::new(segments, reserved, self.allocated.get(), head_capacity)
  }

  /// Whether `ptr` lies inside a segment of this arena.
  pub fn contains(&self, ptr: *const u8) -> bool {
    Segments::new(self.head.get()).any(|seg| Segment::contains(seg, ptr))
  }

  fn acquire(
    &self,
    size: usize,
    next: Option<NonNull<Segment>>,
    tag: Option<&str>,
  ) -> Result<NonNull<Segment>, AllocError> {
    let raw = self.allocator.allocate(size, tag)?;
    #[cfg(feature = "tracing")]
    trace!(size, tag, "acquired arena segment");
    // SAFETY: raw is word aligned and valid for size >= HEADER_SIZE bytes
    Ok(unsafe { Segment::init(raw, size, next) })
  }

  fn alloc_impl(&self, size: usize, tag: Option<&str>) -> Result<NonNull<u8>, AllocError> {
    let size = align_word(size).ok_or(AllocError)?;
    let allocated = self.allocated.get();

    match self.head.get() {
      Some(mut head) if size >= Self::CAPACITY => {
        let total = HEADER_SIZE.checked_add(size).ok_or(AllocError)?;
        // SAFETY: head is a live header owned by this arena
        let after = unsafe { head.as_ref().next() };
        let segment = self.acquire(total, after, tag)?;
        // SAFETY: head is live and no other reference to its header exists
        unsafe { head.as_mut().set_next(Some(segment)) };
        Ok(Segment::data(segment))
      }
      // SAFETY: head is a live header owned by this arena
      Some(head) if allocated + size <= unsafe { head.as_ref().capacity() } => {
        // SAFETY: the cursor plus size stays within the head's data region
        let ptr = unsafe { Segment::data(head).add(allocated) };
        self.allocated.set(allocated + size);
        Ok(ptr)
      }
      previous => {
        let total = HEADER_SIZE.checked_add(size).ok_or(AllocError)?.max(S);
        let segment = self.acquire(total, previous, tag)?;
        self.head.set(Some(segment));
        self.allocated.set(size);
        Ok(Segment::data(segment))
      }
    }
  }

  /// Copy `bytes` into the arena.
  pub fn try_alloc_bytes(&self, bytes: &[u8]) -> Result<&mut [u8], AllocError> {
    let ptr = self.alloc_impl(bytes.len(), None)?;
    // SAFETY: ptr is valid for bytes.len() writes and unaliased until the arena drops
    unsafe {
      ptr::copy_nonoverlapping(bytes.as_ptr(), ptr.as_ptr(), bytes.len());
      Ok(core::slice::from_raw_parts_mut(ptr.as_ptr(), bytes.len()))
    }
  }

  pub fn alloc_bytes(&self, bytes: &[u8]) -> &mut [u8] {
    self
      .try_alloc_bytes(bytes)
      .expect("Failed to allocate bytes")
  }

  pub fn try_alloc_str(&self, value: &str) -> Result<&mut str, AllocError> {
    let bytes = self.try_alloc_bytes(value.as_bytes())?;
    // SAFETY: bytes were copied from a valid str
    Ok(unsafe { core::str::from_utf8_unchecked_mut(bytes) })
  }

  pub fn alloc_str(&self, value: &str) -> &mut str {
    self
      .try_alloc_str(value)
      .expect("Failed to allocate string")
  }
}

unsafe impl<A: RawAllocator, const S: usize> RawAllocator for ArenaAllocator<A, S> {
  #[inline]
  fn allocate(&self, size: usize, tag: Option<&str>) -> Result<NonNull<u8>, AllocError> {
    self.alloc_impl(size, tag)
  }

  #[inline]
  unsafe fn deallocate(&self, ptr: NonNull<u8>, _size: usize, _tag: Option<&str>) {
    debug_assert!(self.contains(ptr.as_ptr()), "pointer not owned by this arena");
  }

  unsafe fn reallocate(
    &self,
    new_size: usize,
    ptr: NonNull<u8>,
    old_size: usize,
    tag: Option<&str>,
  ) -> Result<NonNull<u8>, AllocError> {
    if new_size <= old_size {
      return Ok(ptr);
    }
    debug_assert!(self.contains(ptr.as_ptr()), "pointer not owned by this arena");

    let new = self.alloc_impl(new_size, tag)?;
    // SAFETY: ptr is valid for old_size bytes, new for new_size > old_size
    unsafe { ptr::copy_nonoverlapping(ptr.as_ptr(), new.as_ptr(), old_size) };
    Ok(new)
  }

  fn stats<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
    writeln!(out, "arena({}): {}", S, self.usage())
  }
}

impl<A: RawAllocator, const S: usize> Drop for ArenaAllocator<A, S> {
  fn drop(&mut self) {
    #[cfg(feature = "tracing")]
    let mut released = 0usize;
    for segment in Segments::new(self.head.take()) {
      // SAFETY: segment is live and was obtained with exactly its recorded size
      unsafe {
        let size = segment.as_ref().size();
        self.allocator.deallocate(segment.cast(), size, None);
      }
      #[cfg(feature = "tracing")]
      {
        released += 1;
      }
    }
    self.allocated.set(0);
    #[cfg(feature = "tracing")]
    debug!(segments = released, segment_size = S, "released arena");
  }
}
