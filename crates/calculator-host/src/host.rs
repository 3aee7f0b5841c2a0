//! Plugin host: resolves delegates, runs the `Load` hook and invokes the
//! arithmetic exports.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::ptr;
use std::sync::Arc;

use calculator_core::config::PluginConfig;
use calculator_plugin::arithmetic::{ArithmeticError, Operation};
use calculator_plugin::ffi::abi::{
    ABI_VERSION, BinaryOpFn, DIVIDE_CHECKED_SYMBOL, DivideCheckedFn, LOAD_SYMBOL,
    MAX_FUNCTION_ARGUMENTS_SIZE, RemoteEntryInfo, StatusCode,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::bindings::{CalculatorBindings, InProcessBindings, LibraryBindings};
use crate::error::HostError;

/// A request to run an initialization hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall {
    /// Exported hook name, usually `Load`.
    pub function_name: String,
    /// Bytes forwarded to the hook. `None` passes a null pointer.
    pub arguments: Option<Vec<u8>>,
}

impl FunctionCall {
    /// A call to the standard `Load` hook without arguments.
    pub fn load() -> Self {
        Self {
            function_name: LOAD_SYMBOL.to_string(),
            arguments: None,
        }
    }

    /// Attaches user bytes to the call.
    pub fn with_arguments(mut self, arguments: impl Into<Vec<u8>>) -> Self {
        self.arguments = Some(arguments.into());
        self
    }

    fn validate(&self) -> Result<(), HostError> {
        if self.function_name.is_empty() {
            return Err(HostError::EmptyFunctionName);
        }
        match &self.arguments {
            Some(args) if args.len() > MAX_FUNCTION_ARGUMENTS_SIZE => {
                Err(HostError::ArgumentsTooLarge {
                    size: args.len(),
                    limit: MAX_FUNCTION_ARGUMENTS_SIZE,
                })
            }
            _ => Ok(()),
        }
    }
}

/// Export a [`Delegate`] calls.
#[derive(Debug, Clone, Copy)]
enum Target {
    /// A plain `fn(a, b) -> i32` export.
    Binary(BinaryOpFn),
    /// `calculator_divide_checked`, standing in for `Divide`.
    CheckedDivide(DivideCheckedFn),
}

/// A resolved binary operation.
#[derive(Debug, Clone)]
pub struct Delegate {
    /// Symbol the delegate was resolved from.
    symbol: String,
    /// The export.
    target: Target,
    /// Keeps the library behind `target` loaded.
    _bindings: Arc<dyn CalculatorBindings>,
}

impl Delegate {
    /// Returns the symbol name.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Calls the export.
    ///
    /// Division reports a failing status as an error. Other exports are
    /// guarded with `catch_unwind`, which only sees panics raised by the
    /// same Rust runtime as the host.
    pub fn call(&self, a: i32, b: i32) -> Result<i32, HostError> {
        match self.target {
            Target::CheckedDivide(divide) => checked_quotient(divide, a, b),
            Target::Binary(func) => {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| unsafe { func(a, b) }));
                outcome.map_err(|payload| HostError::OperationFailed {
                    symbol: self.symbol.clone(),
                    message: panic_message(payload.as_ref()),
                })
            }
        }
    }
}

/// Expected outcome of a self-test check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Expectation {
    /// The call returns this value.
    Value(i32),
    /// The call fails.
    Failure,
}

/// Result of one self-test check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    /// Operation exercised.
    pub operation: Operation,
    /// First operand.
    pub a: i32,
    /// Second operand.
    pub b: i32,
    /// What the check expected.
    pub expected: Expectation,
    /// What happened, rendered for display.
    pub actual: String,
    /// Whether the outcome matched.
    pub passed: bool,
}

/// Reference checks run by [`PluginHost::self_test`].
const CHECKS: [(Operation, i32, i32, Expectation); 10] = [
    (Operation::Add, 1, 2, Expectation::Value(3)),
    (Operation::Subtract, 1, 2, Expectation::Value(1)),
    (Operation::Multiply, 1, 2, Expectation::Value(2)),
    (Operation::Divide, 1, 2, Expectation::Value(0)),
    (Operation::Add, 2, 3, Expectation::Value(5)),
    (Operation::Subtract, 2, 3, Expectation::Value(1)),
    (Operation::Multiply, 3, 4, Expectation::Value(12)),
    (Operation::Divide, 10, 2, Expectation::Value(5)),
    (Operation::Divide, 7, 2, Expectation::Value(3)),
    (Operation::Divide, 7, 0, Expectation::Failure),
];

/// Hosts one calculator plugin.
#[derive(Debug, Clone)]
pub struct PluginHost {
    /// Symbol resolver.
    bindings: Arc<dyn CalculatorBindings>,
}

impl PluginHost {
    /// Creates a host over arbitrary bindings.
    pub fn new(bindings: Arc<dyn CalculatorBindings>) -> Self {
        Self { bindings }
    }

    /// Creates a host over the statically linked plugin.
    pub fn in_process() -> Self {
        Self::new(Arc::new(InProcessBindings::new()))
    }

    /// Loads the plugin library at `path` and checks its ABI version.
    pub fn from_library(path: &Path) -> Result<Self, HostError> {
        let host = Self::new(Arc::new(LibraryBindings::load(path)?));
        host.verify_abi()?;
        Ok(host)
    }

    /// Opens the library named in `config`, or the in-process plugin when
    /// none is configured.
    pub fn open(config: &PluginConfig) -> Result<Self, HostError> {
        match config.library_path.as_deref() {
            Some(path) if !path.is_empty() => Self::from_library(Path::new(path)),
            _ => {
                info!("No plugin library configured, using in-process plugin");
                Ok(Self::in_process())
            }
        }
    }

    /// Fails unless the plugin speaks this host's ABI version.
    pub fn verify_abi(&self) -> Result<(), HostError> {
        let found = self.bindings.abi_version()?;
        if found != ABI_VERSION {
            return Err(HostError::AbiMismatch {
                expected: ABI_VERSION,
                found,
            });
        }
        Ok(())
    }

    /// Resolves the binary operation exported as `function_name`.
    ///
    /// `Divide` resolves to `calculator_divide_checked`: the unwinding export
    /// of a separately loaded library panics in another Rust runtime, which
    /// this process cannot catch.
    pub fn create_delegate(&self, function_name: &str) -> Result<Delegate, HostError> {
        if function_name.is_empty() {
            return Err(HostError::EmptyFunctionName);
        }
        let target = match Operation::from_symbol(function_name) {
            Some(Operation::Divide) => Target::CheckedDivide(self.bindings.divide_checked()?),
            _ => Target::Binary(self.bindings.binary_op(function_name)?),
        };
        Ok(Delegate {
            symbol: function_name.to_string(),
            target,
            _bindings: Arc::clone(&self.bindings),
        })
    }

    /// Resolves and calls `operation`.
    pub fn invoke(&self, operation: Operation, a: i32, b: i32) -> Result<i32, HostError> {
        self.create_delegate(operation.symbol())?.call(a, b)
    }

    /// Runs an initialization hook.
    ///
    /// With arguments, the hook receives the address of a `RemoteEntryInfo`
    /// carrying this process id and the bytes; without, a null pointer.
    pub fn execute_function(&self, call: &FunctionCall) -> Result<(), HostError> {
        call.validate()?;
        let hook = self.bindings.load_hook(&call.function_name)?;

        match &call.arguments {
            Some(bytes) => {
                let entry = RemoteEntryInfo::new(std::process::id(), bytes);
                info!(
                    function = %call.function_name,
                    host_process_id = entry.host_process_id,
                    user_data_size = entry.arguments.user_data_size,
                    "Executing plugin function"
                );
                unsafe { hook(entry.as_remote_parameters()) };
            }
            None => {
                info!(
                    function = %call.function_name,
                    "Executing plugin function without arguments"
                );
                unsafe { hook(ptr::null()) };
            }
        }
        Ok(())
    }

    /// Runs the reference checks against the plugin.
    pub fn self_test(&self) -> Vec<CheckOutcome> {
        CHECKS
            .iter()
            .map(|&(operation, a, b, expected)| {
                let result = self.invoke(operation, a, b);
                let passed = match (&result, expected) {
                    (Ok(value), Expectation::Value(want)) => *value == want,
                    (Err(HostError::OperationFailed { .. }), Expectation::Failure) => true,
                    _ => false,
                };
                let actual = match &result {
                    Ok(value) => value.to_string(),
                    Err(e) => e.to_string(),
                };
                if !passed {
                    warn!(%operation, a, b, actual = %actual, "Self-test check failed");
                }
                CheckOutcome {
                    operation,
                    a,
                    b,
                    expected,
                    actual,
                    passed,
                }
            })
            .collect()
    }
}

/// Divides `a` by `b` through the status-returning export.
fn checked_quotient(divide: DivideCheckedFn, a: i32, b: i32) -> Result<i32, HostError> {
    let mut quotient = 0;
    let status = unsafe { divide(a, b, &mut quotient) };

    let message = match status {
        StatusCode::Success => return Ok(quotient),
        StatusCode::DivideByZero => ArithmeticError::DivideByZero { dividend: a }.to_string(),
        StatusCode::Overflow => ArithmeticError::Overflow {
            operation: Operation::Divide,
            a,
            b,
        }
        .to_string(),
        StatusCode::InvalidArgFailure => {
            format!("{DIVIDE_CHECKED_SYMBOL} rejected its arguments")
        }
    };
    Err(HostError::OperationFailed {
        symbol: Operation::Divide.symbol().to_string(),
        message,
    })
}

/// Extracts the message from a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else {
        "plugin panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::c_void;
    use std::slice;
    use std::sync::Mutex;

    use calculator_core::ErrorKind;
    use calculator_plugin::ffi::abi::LoadFn;

    /// What the recording hook saw on its last call.
    static SEEN: Mutex<Option<(bool, u32, Vec<u8>)>> = Mutex::new(None);

    unsafe extern "C" fn recording_hook(remote_parameters: *const c_void) {
        let entry = unsafe { remote_parameters.cast::<RemoteEntryInfo>().as_ref() };
        let record = match entry {
            Some(info) => {
                let args = &info.arguments;
                let bytes = if args.user_data.is_null() {
                    Vec::new()
                } else {
                    unsafe { slice::from_raw_parts(args.user_data, args.user_data_size as usize) }
                        .to_vec()
                };
                (true, info.host_process_id, bytes)
            }
            None => (false, 0, Vec::new()),
        };
        *SEEN.lock().unwrap_or_else(|e| e.into_inner()) = Some(record);
    }

    extern "C-unwind" fn unwinding_op(_a: i32, _b: i32) -> i32 {
        panic!("unwinding export called");
    }

    /// Records `Load` calls, resolves `Add` and `calculator_divide_checked`
    /// in-process, and answers every other operation with a panicking export.
    #[derive(Debug)]
    struct RecordingBindings;

    impl CalculatorBindings for RecordingBindings {
        fn binary_op(&self, symbol: &str) -> Result<BinaryOpFn, HostError> {
            if symbol == Operation::Add.symbol() {
                return InProcessBindings::new().binary_op(symbol);
            }
            let func: BinaryOpFn = unwinding_op;
            Ok(func)
        }

        fn load_hook(&self, _symbol: &str) -> Result<LoadFn, HostError> {
            let hook: LoadFn = recording_hook;
            Ok(hook)
        }

        fn divide_checked(&self) -> Result<DivideCheckedFn, HostError> {
            InProcessBindings::new().divide_checked()
        }

        fn abi_version(&self) -> Result<u32, HostError> {
            Ok(ABI_VERSION + 1)
        }
    }

    fn recording_host() -> PluginHost {
        PluginHost::new(Arc::new(RecordingBindings))
    }

    #[test]
    fn test_execute_function_forwards_entry_info() {
        let host = recording_host();
        host.execute_function(&FunctionCall::load().with_arguments(*b"abc"))
            .expect("execute");
        let seen = SEEN.lock().unwrap_or_else(|e| e.into_inner()).take();
        assert_eq!(seen, Some((true, std::process::id(), b"abc".to_vec())));

        host.execute_function(&FunctionCall::load()).expect("execute");
        let seen = SEEN.lock().unwrap_or_else(|e| e.into_inner()).take();
        assert_eq!(seen, Some((false, 0, Vec::new())));
    }

    #[test]
    fn test_execute_function_rejects_empty_name() {
        let call = FunctionCall {
            function_name: String::new(),
            arguments: None,
        };
        let err = PluginHost::in_process().execute_function(&call).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_execute_function_rejects_oversize_arguments() {
        let call = FunctionCall::load().with_arguments(vec![0_u8; MAX_FUNCTION_ARGUMENTS_SIZE + 1]);
        let err = PluginHost::in_process().execute_function(&call).unwrap_err();
        assert!(matches!(
            err,
            HostError::ArgumentsTooLarge { size: 13, limit: 12 }
        ));
    }

    #[test]
    fn test_execute_function_accepts_limit_sized_arguments() {
        let call = FunctionCall::load().with_arguments(vec![7_u8; MAX_FUNCTION_ARGUMENTS_SIZE]);
        PluginHost::in_process()
            .execute_function(&call)
            .expect("execute");
    }

    #[test]
    fn test_create_delegate_rejects_empty_name() {
        let err = PluginHost::in_process().create_delegate("").unwrap_err();
        assert!(matches!(err, HostError::EmptyFunctionName));
    }

    #[test]
    fn test_verify_abi_mismatch() {
        let err = recording_host().verify_abi().unwrap_err();
        assert!(matches!(
            err,
            HostError::AbiMismatch {
                expected: 1,
                found: 2
            }
        ));
        PluginHost::in_process().verify_abi().expect("in-process abi");
    }

    #[test]
    fn test_invoke_divide_by_zero_is_reported() {
        let err = PluginHost::in_process()
            .invoke(Operation::Divide, 5, 0)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Arithmetic);
        assert_eq!(err.to_string(), "Divide failed: attempt to divide 5 by zero");
    }

    #[test]
    fn test_divide_overflow_is_reported() {
        let err = PluginHost::in_process()
            .invoke(Operation::Divide, i32::MIN, -1)
            .unwrap_err();
        assert!(matches!(err, HostError::OperationFailed { .. }));
        assert!(err.to_string().contains("overflows"));
    }

    #[test]
    fn test_in_process_divide_delegate() {
        let delegate = PluginHost::in_process()
            .create_delegate("Divide")
            .expect("delegate");
        assert_eq!(delegate.symbol(), "Divide");
        assert_eq!(delegate.call(7, 2).expect("divide"), 3);
        let err = delegate.call(7, 0).unwrap_err();
        assert_eq!(err.to_string(), "Divide failed: attempt to divide 7 by zero");
    }

    #[test]
    fn test_divide_delegate_never_calls_unwinding_export() {
        let delegate = recording_host()
            .create_delegate("Divide")
            .expect("delegate");
        assert_eq!(delegate.call(7, 2).expect("divide"), 3);
        let err = delegate.call(7, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Arithmetic);
        assert_eq!(err.to_string(), "Divide failed: attempt to divide 7 by zero");
    }

    #[test]
    fn test_delegate_reports_in_runtime_panic() {
        let host = recording_host();
        assert_eq!(host.invoke(Operation::Add, 2, 3).expect("add"), 5);

        let err = host.invoke(Operation::Multiply, 3, 4).unwrap_err();
        assert!(matches!(err, HostError::OperationFailed { .. }));
        assert_eq!(err.to_string(), "Multiply failed: unwinding export called");
    }

    #[test]
    fn test_checked_quotient_maps_statuses() {
        unsafe extern "C" fn rejecting(_a: i32, _b: i32, _out: *mut i32) -> StatusCode {
            StatusCode::InvalidArgFailure
        }

        let divide = InProcessBindings::new().divide_checked().expect("resolve");
        assert_eq!(checked_quotient(divide, -7, 2).expect("divide"), -3);

        let err = checked_quotient(rejecting, 1, 1).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Divide failed: calculator_divide_checked rejected its arguments"
        );
    }

    #[test]
    fn test_open_without_library_is_in_process() {
        let host = PluginHost::open(&PluginConfig::default()).expect("open");
        assert_eq!(host.invoke(Operation::Add, 2, 3).expect("add"), 5);

        let host = PluginHost::open(&PluginConfig {
            library_path: Some(String::new()),
        })
        .expect("open");
        assert_eq!(host.invoke(Operation::Multiply, 3, 4).expect("multiply"), 12);
    }

    #[test]
    fn test_panic_message_variants() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(owned.as_ref()), "owned");
        let borrowed: Box<dyn Any + Send> = Box::new("borrowed");
        assert_eq!(panic_message(borrowed.as_ref()), "borrowed");
        let other: Box<dyn Any + Send> = Box::new(3_u8);
        assert_eq!(panic_message(other.as_ref()), "plugin panicked");
    }
}
