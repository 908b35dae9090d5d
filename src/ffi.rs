//! C ABI over the heap-backed arena and the heap allocator.
//!
//! Every entry point reports failure as a null pointer.

use core::{
  ffi::c_void,
  ptr::{
    self,
    NonNull,
  },
};

use crate::{
  arena::{
    ArenaAllocator,
    ArenaUsage,
  },
  heap::HeapAllocator,
  raw::RawAllocator,
};

/// Opaque arena handle.
pub struct Arena(ArenaAllocator);

static HEAP: HeapAllocator = HeapAllocator;

fn into_raw(result: Result<NonNull<u8>, alloc::alloc::AllocError>) -> *mut c_void {
  result.map_or(ptr::null_mut(), |ptr| ptr.as_ptr().cast())
}

#[unsafe(no_mangle)]
pub extern "C" fn arena_create() -> *mut Arena {
  Box::into_raw(Box::new(Arena(ArenaAllocator::new())))
}

/// # Safety
///
/// `arena` must be null or come from [`arena_create`] and not be destroyed yet.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn arena_destroy(arena: *mut Arena) {
  if !arena.is_null() {
    // SAFETY: arena was produced by Box::into_raw in arena_create
    drop(unsafe { Box::from_raw(arena) });
  }
}

/// # Safety
///
/// `arena` must be null or a live handle from [`arena_create`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn arena_allocate(arena: *mut Arena, size: usize) -> *mut c_void {
  // SAFETY: the caller passes a live handle or null
  match unsafe { arena.as_ref() } {
    Some(arena) => into_raw(arena.0.allocate(size, None)),
    None => ptr::null_mut(),
  }
}

/// A null `ptr` behaves like [`arena_allocate`].
///
/// # Safety
///
/// `arena` must be null or a live handle, and `ptr` null or a block of
/// `old_size` bytes obtained from it.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn arena_reallocate(
  arena: *mut Arena,
  ptr: *mut c_void,
  old_size: usize,
  new_size: usize,
) -> *mut c_void {
  // SAFETY: the caller passes a live handle or null
  let Some(arena) = (unsafe { arena.as_ref() }) else {
    return ptr::null_mut();
  };
  match NonNull::new(ptr.cast::<u8>()) {
    // SAFETY: ptr holds old_size bytes from this arena
    Some(ptr) => into_raw(unsafe { arena.0.reallocate(new_size, ptr, old_size, None) }),
    None => into_raw(arena.0.allocate(new_size, None)),
  }
}

/// Does nothing; arena memory is released by [`arena_destroy`].
///
/// # Safety
///
/// `arena` must be null or a live handle, and `ptr` a block obtained from it.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn arena_deallocate(arena: *mut Arena, ptr: *mut c_void, size: usize) {
  // SAFETY: the caller passes a live handle or null
  if let (Some(arena), Some(ptr)) = (unsafe { arena.as_ref() }, NonNull::new(ptr.cast::<u8>())) {
    unsafe { arena.0.deallocate(ptr, size, None) }
  }
}

/// # Safety
///
/// `arena` must be null or a live handle from [`arena_create`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn arena_usage(arena: *const Arena) -> ArenaUsage {
  // SAFETY: the caller passes a live handle or null
  unsafe { arena.as_ref() }.map_or_else(ArenaUsage::default, |arena| arena.0.usage())
}

#[unsafe(no_mangle)]
pub extern "C" fn heap_allocate(size: usize) -> *mut c_void {
  into_raw(HEAP.allocate(size, None))
}

/// A null `ptr` behaves like [`heap_allocate`].
///
/// # Safety
///
/// `ptr` must be null or a block of `old_size` bytes from [`heap_allocate`]
/// or [`heap_reallocate`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn heap_reallocate(
  ptr: *mut c_void,
  old_size: usize,
  new_size: usize,
) -> *mut c_void {
  match NonNull::new(ptr.cast::<u8>()) {
    // SAFETY: ptr holds old_size bytes from the heap allocator
    Some(ptr) => into_raw(unsafe { HEAP.reallocate(new_size, ptr, old_size, None) }),
    None => heap_allocate(new_size),
  }
}

/// # Safety
///
/// `ptr` must be null or a block of `size` bytes from [`heap_allocate`] or
/// [`heap_reallocate`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn heap_deallocate(ptr: *mut c_void, size: usize) {
  if let Some(ptr) = NonNull::new(ptr.cast::<u8>()) {
    // SAFETY: ptr holds size bytes from the heap allocator
    unsafe { HEAP.deallocate(ptr, size, None) }
  }
}
