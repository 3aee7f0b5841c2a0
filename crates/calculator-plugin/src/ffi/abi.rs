//! FFI ABI definitions shared by the plugin and its hosts.
//!
//! These records and symbol names form the stable C interface. Changing a
//! layout or a name requires bumping [`ABI_VERSION`].

use std::ffi::c_void;
use std::ptr;

/// C ABI version reported by `calculator_abi_version`.
pub const ABI_VERSION: u32 = 1;

/// Maximum number of inline argument bytes a host may forward to `Load`.
pub const MAX_FUNCTION_ARGUMENTS_SIZE: usize = 12;

/// Exported symbol names.
pub const ADD_SYMBOL: &str = "Add";
/// See [`ADD_SYMBOL`].
pub const SUBTRACT_SYMBOL: &str = "Subtract";
/// See [`ADD_SYMBOL`].
pub const MULTIPLY_SYMBOL: &str = "Multiply";
/// See [`ADD_SYMBOL`].
pub const DIVIDE_SYMBOL: &str = "Divide";
/// See [`ADD_SYMBOL`].
pub const LOAD_SYMBOL: &str = "Load";
/// See [`ADD_SYMBOL`].
pub const DIVIDE_CHECKED_SYMBOL: &str = "calculator_divide_checked";
/// See [`ADD_SYMBOL`].
pub const ABI_VERSION_SYMBOL: &str = "calculator_abi_version";

/// User bytes forwarded from the host to the plugin.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct LoadArguments {
    /// Start of the user bytes, null when `user_data_size` is zero.
    pub user_data: *const u8,
    /// Number of bytes at `user_data`.
    pub user_data_size: u32,
}

/// Record whose address a host passes into `Load`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RemoteEntryInfo {
    /// Process id of the host.
    pub host_process_id: u32,
    /// Forwarded user bytes.
    pub arguments: LoadArguments,
}

impl RemoteEntryInfo {
    /// Builds an entry record borrowing `user_data`.
    ///
    /// The record holds a raw pointer into `user_data`; it must not outlive
    /// the slice.
    pub fn new(host_process_id: u32, user_data: &[u8]) -> Self {
        let user_data_size = u32::try_from(user_data.len()).unwrap_or(u32::MAX);
        Self {
            host_process_id,
            arguments: LoadArguments {
                user_data: if user_data.is_empty() {
                    ptr::null()
                } else {
                    user_data.as_ptr()
                },
                user_data_size: if user_data.is_empty() { 0 } else { user_data_size },
            },
        }
    }

    /// Returns the address of this record as the opaque pointer `Load` takes.
    pub fn as_remote_parameters(&self) -> *const c_void {
        (self as *const Self).cast()
    }
}

/// Status returned by the non-panicking exports.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// The call succeeded.
    Success = 0,
    /// A required pointer was null.
    InvalidArgFailure = 1,
    /// The divisor was zero.
    DivideByZero = 2,
    /// The result does not fit in an `i32`.
    Overflow = 3,
}

/// `fn(a, b) -> i32` signature shared by the four operations.
///
/// `Divide` unwinds on a zero divisor, hence `C-unwind`.
pub type BinaryOpFn = unsafe extern "C-unwind" fn(a: i32, b: i32) -> i32;

/// Signature of the `Load` hook.
pub type LoadFn = unsafe extern "C" fn(remote_parameters: *const c_void);

/// Signature of `calculator_divide_checked`.
pub type DivideCheckedFn = unsafe extern "C" fn(a: i32, b: i32, out: *mut i32) -> StatusCode;

/// Signature of `calculator_abi_version`.
pub type AbiVersionFn = unsafe extern "C" fn() -> u32;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_info_points_at_user_data() {
        let bytes = *b"hello";
        let info = RemoteEntryInfo::new(42, &bytes);
        assert_eq!(info.host_process_id, 42);
        assert_eq!(info.arguments.user_data, bytes.as_ptr());
        assert_eq!(info.arguments.user_data_size, 5);
        assert_eq!(
            info.as_remote_parameters(),
            (&info as *const RemoteEntryInfo).cast::<c_void>()
        );
    }

    #[test]
    fn test_empty_user_data_is_null() {
        let info = RemoteEntryInfo::new(7, &[]);
        assert!(info.arguments.user_data.is_null());
        assert_eq!(info.arguments.user_data_size, 0);
    }
}
