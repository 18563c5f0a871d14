// src/bindings.rs
//
// Safe Rust handles over the C exports. `LinkedApi` calls the symbols compiled
// into this binary; `DynamicApi` resolves the same symbols from a shared
// library at run time. Both go through the C ABI and the same ownership rules
// a C caller follows.

use std::ffi::{CStr, CString, OsStr, OsString, c_char, c_longlong};

use libloading::{Library, Symbol};
use tracing::{debug, info};

use crate::error::{ExampleError, Result};
use crate::ffi;

/// The demo's view of the library.
pub trait ExampleApi {
    fn factorial(&self, n: i64) -> Result<i64>;
    fn greet(&self, name: &str) -> Result<String>;
    fn repeat_string(&self, s: &str, n: i64) -> Result<String>;
    fn shout_it(&self, msg: &str) -> Result<()>;
    fn maybe(&self) -> Result<bool>;
    fn sort_json_array(&self, json: &str) -> Result<String>;
}

type StrFn = unsafe extern "C" fn(*const c_char) -> *mut c_char;

#[derive(Clone, Copy)]
struct Exports {
    factorial: unsafe extern "C" fn(c_longlong) -> c_longlong,
    greet: StrFn,
    repeat_string: unsafe extern "C" fn(*const c_char, c_longlong) -> *mut c_char,
    shout_it: unsafe extern "C" fn(*const c_char),
    maybe: unsafe extern "C" fn() -> bool,
    sort_json_array: StrFn,
    free_string: unsafe extern "C" fn(*mut c_char),
    last_error: unsafe extern "C" fn() -> *mut c_char,
}

impl Exports {
    fn linked() -> Self {
        Exports {
            factorial: ffi::factorial,
            greet: ffi::greet,
            repeat_string: ffi::repeat_string,
            shout_it: ffi::shout_it,
            maybe: ffi::maybe,
            sort_json_array: ffi::sort_json_array,
            free_string: ffi::free_string,
            last_error: ffi::example_last_error,
        }
    }

    fn resolve(library: &Library) -> Result<Self> {
        unsafe {
            Ok(Exports {
                factorial: symbol(library, "factorial")?,
                greet: symbol(library, "greet")?,
                repeat_string: symbol(library, "repeat_string")?,
                shout_it: symbol(library, "shout_it")?,
                maybe: symbol(library, "maybe")?,
                sort_json_array: symbol(library, "sort_json_array")?,
                free_string: symbol(library, "free_string")?,
                last_error: symbol(library, "example_last_error")?,
            })
        }
    }

    /// Copies a library-owned string and hands the buffer back to the library.
    unsafe fn take_string(&self, ptr: *mut c_char) -> Result<String> {
        let copied = unsafe { CStr::from_ptr(ptr) }
            .to_str()
            .map(str::to_owned)
            .map_err(|_| ExampleError::InvalidUtf8 { arg: "return value" });
        unsafe { (self.free_string)(ptr) };
        copied
    }

    fn failure(&self, symbol: &'static str) -> ExampleError {
        let ptr = unsafe { (self.last_error)() };
        let message = if ptr.is_null() {
            "no error recorded".to_string()
        } else {
            unsafe { self.take_string(ptr) }.unwrap_or_else(|e| e.to_string())
        };
        ExampleError::Call { symbol, message }
    }

    fn string_call(&self, symbol: &'static str, ptr: *mut c_char) -> Result<String> {
        if ptr.is_null() {
            return Err(self.failure(symbol));
        }
        unsafe { self.take_string(ptr) }
    }

    fn factorial(&self, n: i64) -> Result<i64> {
        match unsafe { (self.factorial)(n) } {
            -1 => Err(self.failure("factorial")),
            result => Ok(result),
        }
    }

    fn greet(&self, name: &str) -> Result<String> {
        let name = CString::new(name)?;
        let ptr = unsafe { (self.greet)(name.as_ptr()) };
        self.string_call("greet", ptr)
    }

    fn repeat_string(&self, s: &str, n: i64) -> Result<String> {
        let s = CString::new(s)?;
        let ptr = unsafe { (self.repeat_string)(s.as_ptr(), n) };
        self.string_call("repeat_string", ptr)
    }

    fn shout_it(&self, msg: &str) -> Result<()> {
        let msg = CString::new(msg)?;
        unsafe { (self.shout_it)(msg.as_ptr()) };
        // void return: the error slot is the only failure signal
        let ptr = unsafe { (self.last_error)() };
        if ptr.is_null() {
            Ok(())
        } else {
            let message = unsafe { self.take_string(ptr) }?;
            Err(ExampleError::Call { symbol: "shout_it", message })
        }
    }

    fn maybe(&self) -> Result<bool> {
        Ok(unsafe { (self.maybe)() })
    }

    fn sort_json_array(&self, json: &str) -> Result<String> {
        let json = CString::new(json)?;
        let ptr = unsafe { (self.sort_json_array)(json.as_ptr()) };
        self.string_call("sort_json_array", ptr)
    }
}

unsafe fn symbol<T: Copy>(library: &Library, name: &'static str) -> Result<T> {
    let sym: Symbol<T> = unsafe { library.get(name.as_bytes()) }
        .map_err(|source| ExampleError::Symbol { symbol: name, source })?;
    debug!(symbol = name, "resolved");
    Ok(*sym)
}

macro_rules! delegate_api {
    ($ty:ty) => {
        impl ExampleApi for $ty {
            fn factorial(&self, n: i64) -> Result<i64> {
                self.exports.factorial(n)
            }
            fn greet(&self, name: &str) -> Result<String> {
                self.exports.greet(name)
            }
            fn repeat_string(&self, s: &str, n: i64) -> Result<String> {
                self.exports.repeat_string(s, n)
            }
            fn shout_it(&self, msg: &str) -> Result<()> {
                self.exports.shout_it(msg)
            }
            fn maybe(&self) -> Result<bool> {
                self.exports.maybe()
            }
            fn sort_json_array(&self, json: &str) -> Result<String> {
                self.exports.sort_json_array(json)
            }
        }
    };
}

/// The exports linked into the current binary.
pub struct LinkedApi {
    exports: Exports,
}

impl LinkedApi {
    pub fn new() -> Self {
        LinkedApi { exports: Exports::linked() }
    }
}

impl Default for LinkedApi {
    fn default() -> Self {
        Self::new()
    }
}

delegate_api!(LinkedApi);

/// The exports of a shared library opened at run time.
pub struct DynamicApi {
    exports: Exports,
    // Keeps the function pointers in `exports` valid; dropped last.
    _library: Library,
}

impl DynamicApi {
    /// Opens `path` with the platform loader. A bare file name is searched
    /// for on the loader path (`LD_LIBRARY_PATH` and friends).
    pub fn open(path: impl AsRef<OsStr>) -> Result<Self> {
        let path = path.as_ref();
        let library = unsafe { Library::new(path) }.map_err(|source| ExampleError::Load {
            path: path.to_string_lossy().into_owned(),
            source,
        })?;
        let exports = Exports::resolve(&library)?;
        info!(path = %path.to_string_lossy(), "loaded example library");
        Ok(DynamicApi { exports, _library: library })
    }
}

delegate_api!(DynamicApi);

/// Platform file name of the shared library, e.g. `libexample.so`.
pub fn default_library_name() -> OsString {
    libloading::library_filename("example")
}
