//! C string plumbing for the raw `gl_*` import table.

use shaderlink_core::host::truncate_info_log;
use std::ffi::{c_char, CString};

/// Let the host write a NUL-terminated log into a zeroed buffer of
/// `max_len` bytes and return it as an owned string.
///
/// Invalid UTF-8 is replaced, and the result never exceeds `max_len - 1`
/// bytes even if the host forgot the terminator.
pub fn read_bounded_log<F>(max_len: usize, fill: F) -> String
where
    F: FnOnce(*mut c_char, u32),
{
    let capacity = max_len.min(u32::MAX as usize);
    if capacity == 0 {
        return String::new();
    }
    let mut buffer = vec![0u8; capacity];
    fill(buffer.as_mut_ptr().cast::<c_char>(), capacity as u32);
    let end = buffer.iter().position(|&b| b == 0).unwrap_or(capacity);
    truncate_info_log(&String::from_utf8_lossy(&buffer[..end]), capacity)
}

/// Convert shader source for the host. A C string ends at its first NUL,
/// so anything after an interior NUL is dropped.
pub fn to_c_string(text: &str) -> CString {
    let end = text.find('\0').unwrap_or(text.len());
    // No interior NUL remains in `text[..end]`
    CString::new(&text[..end]).unwrap_or_default()
}
