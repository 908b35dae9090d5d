use core::{
  mem,
  ptr::NonNull,
};

use crate::raw::align_word;

/// Header at the start of every block an arena obtains from its backing
/// allocator. The data region follows it directly.
#[repr(C)]
#[derive(Debug)]
pub(crate) struct Segment {
  next: Option<NonNull<Segment>>,
  /// Bytes obtained from the backing allocator, header included.
  size: usize,
}

/// Bytes reserved for the header, kept a multiple of the word size so the
/// data region stays word aligned.
pub const HEADER_SIZE: usize = match align_word(mem::size_of::<Segment>()) {
  Some(size) => size,
  None => unreachable!(),
};

impl Segment {
  /// Write a header into the start of `raw`.
  ///
  /// # Safety
  ///
  /// `raw` must be word aligned and valid for writes of `size` bytes, with
  /// `size >= HEADER_SIZE`.
  pub(crate) unsafe fn init(
    raw: NonNull<u8>,
    size: usize,
    next: Option<NonNull<Segment>>,
  ) -> NonNull<Segment> {
    debug_assert!(size >= HEADER_SIZE);
    let segment = raw.cast::<Segment>();
    // SAFETY: raw is aligned and large enough for the header
    unsafe { segment.write(Segment { next, size }) };
    segment
  }

  pub(crate) fn next(&self) -> Option<NonNull<Segment>> {
    self.next
  }

  pub(crate) fn set_next(&mut self, next: Option<NonNull<Segment>>) {
    self.next = next;
  }

  pub(crate) fn size(&self) -> usize {
    self.size
  }

  /// Usable bytes after the header.
  pub(crate) fn capacity(&self) -> usize {
    self.size - HEADER_SIZE
  }

  /// Start of the data region.
  pub(crate) fn data(this: NonNull<Segment>) -> NonNull<u8> {
    // SAFETY: every segment is at least HEADER_SIZE bytes long
    unsafe { this.cast::<u8>().add(HEADER_SIZE) }
  }

  /// Whether `ptr` points into this segment's data region. The one-past-end
  /// address counts, since zero-sized blocks may be handed out there.
  pub(crate) fn contains(this: NonNull<Segment>, ptr: *const u8) -> bool {
    // SAFETY: this points to an initialized header
    let size = unsafe { this.as_ref().size };
    let start = Self::data(this).as_ptr() as usize;
    let end = this.as_ptr() as usize + size;
    let ptr = ptr as usize;
    ptr >= start && ptr <= end
  }
}

/// Walks a segment chain from `head` following `next` links.
pub(crate) struct Segments {
  current: Option<NonNull<Segment>>,
}

impl Segments {
  pub(crate) fn new(head: Option<NonNull<Segment>>) -> Self {
    Self { current: head }
  }
}

impl Iterator for Segments {
  type Item = NonNull<Segment>;

  fn next(&mut self) -> Option<Self::Item> {
    let current = self.current?;
    // SAFETY: chain links only ever point to live headers
    self.current = unsafe { current.as_ref().next() };
    Some(current)
  }
}
