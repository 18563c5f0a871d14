use std::ffi::{CString, c_char, c_longlong};
use std::io::Write;
use std::ptr;

use tracing::debug;

use super::scaffold::{cstr_arg, guard, last_error, to_c_string};
use crate::ops;

// ---------- FFI: numbers ----------

/// `n!`, or `-1` when `n` is negative or the result overflows.
#[unsafe(no_mangle)]
pub extern "C" fn factorial(n: c_longlong) -> c_longlong {
    guard("factorial", -1, || {
        debug!(n, "factorial");
        ops::factorial(n)
    })
}

/// Fair coin flip.
#[unsafe(no_mangle)]
pub extern "C" fn maybe() -> bool {
    guard("maybe", false, || {
        let flip = ops::maybe();
        debug!(flip, "maybe");
        Ok(flip)
    })
}

// ---------- FFI: strings ----------

/// Greeting for `name`. The returned string is owned by the caller.
///
/// # Safety
/// `name` must be null or a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn greet(name: *const c_char) -> *mut c_char {
    guard("greet", ptr::null_mut(), || {
        let name = unsafe { cstr_arg(name, "name") }?;
        debug!(name, "greet");
        to_c_string(ops::greet(name))
    })
}

/// `s` repeated `n` times. The returned string is owned by the caller.
///
/// # Safety
/// `s` must be null or a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn repeat_string(s: *const c_char, n: c_longlong) -> *mut c_char {
    guard("repeat_string", ptr::null_mut(), || {
        let s = unsafe { cstr_arg(s, "s") }?;
        debug!(s, n, "repeat_string");
        to_c_string(ops::repeat_string(s, n)?)
    })
}

/// Prints the shouted form of `msg` on stdout.
///
/// # Safety
/// `msg` must be null or a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn shout_it(msg: *const c_char) {
    guard("shout_it", (), || {
        let msg = unsafe { cstr_arg(msg, "msg") }?;
        debug!(msg, "shout_it");
        let mut out = std::io::stdout().lock();
        writeln!(out, "{}", ops::shout(msg))?;
        out.flush()?;
        Ok(())
    })
}

/// Sorted copy of a JSON array of numbers. The returned string is owned by the caller.
///
/// # Safety
/// `json` must be null or a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sort_json_array(json: *const c_char) -> *mut c_char {
    guard("sort_json_array", ptr::null_mut(), || {
        let json = unsafe { cstr_arg(json, "json") }?;
        debug!(json, "sort_json_array");
        to_c_string(ops::sort_json_array(json)?)
    })
}

// ---------- FFI: memory & errors ----------

/// Releases a string returned by this library. Null is ignored.
///
/// # Safety
/// `s` must be null or a pointer previously returned by this library and not
/// yet freed.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn free_string(s: *mut c_char) {
    if s.is_null() {
        return;
    }
    drop(unsafe { CString::from_raw(s) });
}

/// Message of the last failed call on this thread, or null if the last call
/// succeeded. The returned string is owned by the caller.
#[unsafe(no_mangle)]
pub extern "C" fn example_last_error() -> *mut c_char {
    // Not routed through `guard`: that would clear the slot being read.
    match last_error().map(CString::new) {
        Some(Ok(message)) => message.into_raw(),
        _ => ptr::null_mut(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;

    unsafe fn take(s: *mut c_char) -> String {
        assert!(!s.is_null());
        let owned = unsafe { CStr::from_ptr(s) }.to_str().unwrap().to_owned();
        unsafe { free_string(s) };
        owned
    }

    #[test]
    fn factorial_signals_failure_with_minus_one() {
        assert_eq!(factorial(5), 120);
        assert!(example_last_error().is_null());
        assert_eq!(factorial(-1), -1);
        let err = unsafe { take(example_last_error()) };
        assert!(err.contains("negative"), "{err}");
        assert_eq!(factorial(25), -1);
    }

    #[test]
    fn string_exports_round_trip() {
        let name = CString::new("World").unwrap();
        assert_eq!(unsafe { take(greet(name.as_ptr())) }, "Hello, World!");

        let ha = CString::new("ha").unwrap();
        assert_eq!(unsafe { take(repeat_string(ha.as_ptr(), 3)) }, "hahaha");

        let data = CString::new("[3,1,4,1,5,9,2,6]").unwrap();
        assert_eq!(unsafe { take(sort_json_array(data.as_ptr())) }, "[1,1,2,3,4,5,6,9]");
    }

    #[test]
    fn null_arguments_return_null() {
        assert!(unsafe { greet(ptr::null()) }.is_null());
        let err = unsafe { take(example_last_error()) };
        assert!(err.contains("`name`"), "{err}");

        assert!(unsafe { sort_json_array(ptr::null()) }.is_null());
        unsafe { shout_it(ptr::null()) };
        let err = unsafe { take(example_last_error()) };
        assert!(err.contains("`msg`"), "{err}");
    }

    #[test]
    fn free_string_accepts_null() {
        unsafe { free_string(ptr::null_mut()) };
    }
}
