use std::any::Any;
use std::cell::RefCell;
use std::ffi::{CStr, CString, c_char};
use std::panic::{self, AssertUnwindSafe};

use crate::error::{ExampleError, Result};

thread_local! {
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Borrows a C string argument as `&str`.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated buffer that stays alive and
/// unmodified for `'a`.
pub unsafe fn cstr_arg<'a>(ptr: *const c_char, arg: &'static str) -> Result<&'a str> {
    if ptr.is_null() {
        return Err(ExampleError::NullPointer { arg });
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().map_err(|_| ExampleError::InvalidUtf8 { arg })
}

/// Hands ownership of `s` to the caller; release with `free_string`.
pub fn to_c_string(s: String) -> Result<*mut c_char> {
    Ok(CString::new(s)?.into_raw())
}

pub fn last_error() -> Option<String> {
    LAST_ERROR.with(|slot| slot.borrow().clone())
}

fn set_last_error(message: String) {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(message));
}

fn clear_last_error() {
    LAST_ERROR.with(|slot| slot.borrow_mut().take());
}

/// Runs an export body: panics are caught, failures are logged and stored in
/// the last-error slot and mapped to `failed`, successes clear the slot.
pub fn guard<T>(symbol: &'static str, failed: T, body: impl FnOnce() -> Result<T>) -> T {
    let outcome = panic::catch_unwind(AssertUnwindSafe(body)).unwrap_or_else(|payload| {
        Err(ExampleError::Panic {
            symbol,
            message: panic_message(payload.as_ref()),
        })
    });

    match outcome {
        Ok(value) => {
            clear_last_error();
            value
        }
        Err(err) => {
            tracing::warn!(symbol, error = %err, "export failed");
            set_last_error(err.to_string());
            failed
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
