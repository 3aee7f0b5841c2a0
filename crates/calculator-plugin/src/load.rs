//! The initialization hook a hooking host calls once after loading us.

use std::ffi::c_void;
use std::sync::Once;

use calculator_core::logging::{PLUGIN_LOG_ENV, try_init_from_env};

static LOGGING: Once = Once::new();

/// Formats the diagnostic line written for a `Load` call.
pub fn describe_remote_parameters(address: usize) -> String {
    format!("The pointer parameter was {:016X}.", address as u64)
}

/// Writes the address of `remote_parameters` to the log.
///
/// The pointer is treated as an opaque value and never dereferenced. No
/// state survives the call apart from the process-wide subscriber installed
/// on first use when the host has none.
pub fn load(remote_parameters: *const c_void) {
    LOGGING.call_once(|| {
        try_init_from_env(PLUGIN_LOG_ENV, "info");
    });

    let address = remote_parameters as usize;
    tracing::info!(address, "{}", describe_remote_parameters(address));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    #[test]
    fn test_describe_pads_to_sixteen_digits() {
        assert_eq!(
            describe_remote_parameters(0xDEAD_BEEF),
            "The pointer parameter was 00000000DEADBEEF."
        );
    }

    #[test]
    fn test_describe_null() {
        assert_eq!(
            describe_remote_parameters(0),
            "The pointer parameter was 0000000000000000."
        );
    }

    #[test]
    fn test_describe_uses_uppercase() {
        assert_eq!(
            describe_remote_parameters(0xabc),
            "The pointer parameter was 0000000000000ABC."
        );
    }

    #[test]
    fn test_load_accepts_any_pointer() {
        load(ptr::null());
        load(0x1000 as *const c_void);
        let value = 5_u32;
        load((&value as *const u32).cast());
    }
}
