//! C FFI bindings for csv2tex-core
//!
//! This crate provides a C-compatible API so that programs written in other
//! languages can convert CSV text to LaTeX and receive typed failures as an
//! error message instead of a crash.

use csv2tex_core::RenderOptions;
use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

thread_local! {
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

fn set_last_error(message: impl Into<String>) {
    LAST_ERROR.with(|e| *e.borrow_mut() = Some(message.into()));
}

fn clear_last_error() {
    LAST_ERROR.with(|e| *e.borrow_mut() = None);
}

fn into_c_string(s: String) -> *mut c_char {
    match CString::new(s) {
        Ok(c) => c.into_raw(),
        Err(_) => {
            set_last_error("output contains an interior NUL byte");
            ptr::null_mut()
        }
    }
}

/// Read a borrowed C string as UTF-8
///
/// # Safety
/// `s` must be null or a valid NUL-terminated string
unsafe fn borrow_str<'a>(s: *const c_char, what: &str) -> Option<&'a str> {
    if s.is_null() {
        set_last_error(format!("{} is null", what));
        return None;
    }
    match CStr::from_ptr(s).to_str() {
        Ok(s) => Some(s),
        Err(_) => {
            set_last_error(format!("{} is not valid UTF-8", what));
            None
        }
    }
}

/// Parse render options from JSON; null means defaults
///
/// # Safety
/// `options_json` must be null or a valid NUL-terminated string
unsafe fn parse_options(options_json: *const c_char) -> Option<RenderOptions> {
    if options_json.is_null() {
        return Some(RenderOptions::default());
    }
    let json = borrow_str(options_json, "options")?;
    match serde_json::from_str::<RenderOptions>(json) {
        Ok(options) => Some(options),
        Err(e) => {
            set_last_error(format!("invalid options: {}", e));
            None
        }
    }
}

/// Convert CSV text into a LaTeX table
///
/// # Safety
/// - `csv` must be a valid C string
/// - `options_json` must be a valid C string holding a JSON options object, or null
/// - Returns null on error; see `csv2tex_last_error`
/// - Caller must free the returned string with `csv2tex_free_string`
#[no_mangle]
pub unsafe extern "C" fn csv2tex_convert(
    csv: *const c_char,
    options_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let Some(csv) = borrow_str(csv, "csv") else {
        return ptr::null_mut();
    };
    let Some(options) = parse_options(options_json) else {
        return ptr::null_mut();
    };

    match csv2tex_core::convert_str(csv, &options) {
        Ok(text) => into_c_string(text),
        Err(e) => {
            set_last_error(e.to_string());
            ptr::null_mut()
        }
    }
}

/// Get the `\usepackage{...}` line needed for the given options
///
/// # Safety
/// - `options_json` must be a valid C string or null
/// - Returns null when no extra packages are needed or on error
/// - Caller must free the returned string with `csv2tex_free_string`
#[no_mangle]
pub unsafe extern "C" fn csv2tex_usepackage_line(options_json: *const c_char) -> *mut c_char {
    clear_last_error();

    let Some(options) = parse_options(options_json) else {
        return ptr::null_mut();
    };

    csv2tex_core::usepackage_line(&options)
        .map(into_c_string)
        .unwrap_or(ptr::null_mut())
}

/// Get the message of the last error on this thread
///
/// # Safety
/// - Returns null if the last call succeeded
/// - Caller must free the returned string with `csv2tex_free_string`
#[no_mangle]
pub unsafe extern "C" fn csv2tex_last_error() -> *mut c_char {
    LAST_ERROR
        .with(|e| e.borrow().clone())
        .and_then(|message| CString::new(message).ok())
        .map(|s| s.into_raw())
        .unwrap_or(ptr::null_mut())
}

/// Free a string returned by other FFI functions
///
/// # Safety
/// - `s` must be a valid pointer returned by a csv2tex_* function or null
#[no_mangle]
pub unsafe extern "C" fn csv2tex_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}
