use core::fmt;

use getset::CopyGetters;

/// Point-in-time view of an arena's segment chain.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, CopyGetters)]
pub struct ArenaUsage {
  /// Segments currently held, dedicated large-request segments included.
  #[getset(get_copy = "pub")]
  segments: usize,
  /// Bytes obtained from the backing allocator, headers included.
  #[getset(get_copy = "pub")]
  reserved: usize,
  /// Bump cursor of the head segment.
  #[getset(get_copy = "pub")]
  head_used: usize,
  /// Usable bytes of the head segment.
  #[getset(get_copy = "pub")]
  head_capacity: usize,
}

impl ArenaUsage {
  pub(crate) fn new(segments: usize, reserved: usize, head_used: usize, head_capacity: usize) -> Self {
    Self {
      segments,
      reserved,
      head_used,
      head_capacity,
    }
  }

  /// Bytes still available for bump allocation in the head segment.
  pub fn head_available(&self) -> usize {
    self.head_capacity - self.head_used
  }
}

impl fmt::Display for ArenaUsage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{} segments, {} bytes reserved, head {}/{} bytes used",
      self.segments, self.reserved, self.head_used, self.head_capacity
    )
  }
}
