//! Symbol resolution for the plugin exports.
//!
//! [`LibraryBindings`] opens the plugin shared library at runtime using
//! `libloading`. [`InProcessBindings`] resolves the same names against the
//! statically linked plugin crate, for development and testing without a
//! built `cdylib`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use calculator_plugin::arithmetic::Operation;
use calculator_plugin::exports;
use calculator_plugin::ffi::abi::{
    ABI_VERSION_SYMBOL, AbiVersionFn, BinaryOpFn, DIVIDE_CHECKED_SYMBOL, DivideCheckedFn,
    LOAD_SYMBOL, LoadFn,
};
use tracing::{debug, info};

use crate::error::HostError;

/// Resolves plugin exports by symbol name.
///
/// Returned function pointers stay valid for as long as the bindings value
/// is alive.
pub trait CalculatorBindings: Send + Sync + fmt::Debug {
    /// Resolves one of the `fn(i32, i32) -> i32` operations.
    fn binary_op(&self, symbol: &str) -> Result<BinaryOpFn, HostError>;

    /// Resolves an initialization hook taking one opaque pointer.
    fn load_hook(&self, symbol: &str) -> Result<LoadFn, HostError>;

    /// Resolves the non-panicking `calculator_divide_checked`.
    fn divide_checked(&self) -> Result<DivideCheckedFn, HostError>;

    /// Resolves and calls `calculator_abi_version`.
    fn abi_version(&self) -> Result<u32, HostError>;
}

/// Bindings backed by a dynamically loaded shared library.
pub struct LibraryBindings {
    /// Library path, for diagnostics.
    path: PathBuf,
    /// Keep the loaded library alive.
    lib: Arc<libloading::Library>,
}

impl LibraryBindings {
    /// Loads the plugin shared library (.so / .dll / .dylib) at `path`.
    ///
    /// Loading runs the library's initializers; only load trusted plugins.
    pub fn load(path: &Path) -> Result<Self, HostError> {
        let lib = unsafe { libloading::Library::new(path) }.map_err(|source| {
            HostError::LibraryLoad {
                path: path.to_path_buf(),
                source,
            }
        })?;

        info!(path = %path.display(), "Plugin library loaded");

        Ok(Self {
            path: path.to_path_buf(),
            lib: Arc::new(lib),
        })
    }

    /// Resolves `symbol` as a `T` function pointer.
    ///
    /// # Safety
    ///
    /// The library must export `symbol` with the signature `T`.
    unsafe fn resolve<T: Copy>(&self, symbol: &str) -> Result<T, HostError> {
        let sym = unsafe { self.lib.get::<T>(symbol.as_bytes()) }.map_err(|e| {
            debug!(path = %self.path.display(), symbol, error = %e, "Symbol lookup failed");
            HostError::SymbolNotFound {
                symbol: symbol.to_string(),
            }
        })?;
        Ok(*sym)
    }
}

impl fmt::Debug for LibraryBindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibraryBindings")
            .field("path", &self.path)
            .finish()
    }
}

impl CalculatorBindings for LibraryBindings {
    fn binary_op(&self, symbol: &str) -> Result<BinaryOpFn, HostError> {
        unsafe { self.resolve::<BinaryOpFn>(symbol) }
    }

    fn load_hook(&self, symbol: &str) -> Result<LoadFn, HostError> {
        unsafe { self.resolve::<LoadFn>(symbol) }
    }

    fn divide_checked(&self) -> Result<DivideCheckedFn, HostError> {
        unsafe { self.resolve::<DivideCheckedFn>(DIVIDE_CHECKED_SYMBOL) }
    }

    fn abi_version(&self) -> Result<u32, HostError> {
        let version = unsafe { self.resolve::<AbiVersionFn>(ABI_VERSION_SYMBOL) }?;
        Ok(unsafe { version() })
    }
}

/// Bindings resolved against the statically linked plugin crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct InProcessBindings;

impl InProcessBindings {
    /// Creates in-process bindings.
    pub fn new() -> Self {
        Self
    }
}

impl CalculatorBindings for InProcessBindings {
    fn binary_op(&self, symbol: &str) -> Result<BinaryOpFn, HostError> {
        let func: BinaryOpFn = match Operation::from_symbol(symbol) {
            Some(Operation::Add) => exports::Add,
            Some(Operation::Subtract) => exports::Subtract,
            Some(Operation::Multiply) => exports::Multiply,
            Some(Operation::Divide) => exports::Divide,
            None => {
                return Err(HostError::SymbolNotFound {
                    symbol: symbol.to_string(),
                });
            }
        };
        Ok(func)
    }

    fn load_hook(&self, symbol: &str) -> Result<LoadFn, HostError> {
        if symbol != LOAD_SYMBOL {
            return Err(HostError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        let hook: LoadFn = exports::Load;
        Ok(hook)
    }

    fn divide_checked(&self) -> Result<DivideCheckedFn, HostError> {
        let divide: DivideCheckedFn = exports::calculator_divide_checked;
        Ok(divide)
    }

    fn abi_version(&self) -> Result<u32, HostError> {
        Ok(exports::calculator_abi_version())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calculator_core::ErrorKind;

    #[test]
    fn test_in_process_resolves_every_operation() {
        let bindings = InProcessBindings::new();
        for op in Operation::ALL {
            assert!(bindings.binary_op(op.symbol()).is_ok(), "{op}");
        }
        assert!(bindings.load_hook(LOAD_SYMBOL).is_ok());
        assert!(bindings.divide_checked().is_ok());
        assert_eq!(bindings.abi_version().expect("version"), 1);
    }

    #[test]
    fn test_in_process_unknown_symbol() {
        let err = InProcessBindings::new().binary_op("Modulo").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "Plugin does not export 'Modulo'");

        let err = InProcessBindings::new().load_hook("Unload").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_in_process_pointers_call_through() {
        let add = InProcessBindings::new().binary_op("Add").expect("add");
        assert_eq!(unsafe { add(2, 3) }, 5);
        let subtract = InProcessBindings::new().binary_op("Subtract").expect("subtract");
        assert_eq!(unsafe { subtract(2, 3) }, 1);
    }

    #[test]
    fn test_library_load_missing_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("libmissing_calculator.so");
        let err = LibraryBindings::load(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Plugin);
        assert!(err.to_string().contains("libmissing_calculator.so"));
    }
}
