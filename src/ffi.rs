//! FFI bindings for the lifestyle stress core
//!
//! This module provides C-compatible functions so a host dashboard written in
//! another language can load a dataset once and request estimates from it.
//! Strings returned by these functions must be freed with
//! `lifestyle_free_string`; dashboards with `lifestyle_dashboard_free`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::ptr;

use crate::pipeline::Dashboard;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Status code for success
pub const LIFESTYLE_OK: c_int = 0;

/// Status code for failure; see `lifestyle_last_error`
pub const LIFESTYLE_ERR: c_int = -1;

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

// ============================================================================
// Dashboard lifecycle
// ============================================================================

/// Load a dataset and fit the estimator.
///
/// # Safety
/// - `path` must be a valid null-terminated C string.
/// - Returns a handle that must be freed with `lifestyle_dashboard_free`.
/// - Returns NULL on error; call `lifestyle_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn lifestyle_dashboard_open(path: *const c_char) -> *mut Dashboard {
    clear_last_error();

    let path_str = match cstr_to_string(path) {
        Some(s) => s,
        None => {
            set_last_error("Invalid path string pointer");
            return ptr::null_mut();
        }
    };

    match Dashboard::open_path(path_str) {
        Ok(dashboard) => Box::into_raw(Box::new(dashboard)),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free a dashboard handle.
///
/// # Safety
/// - `dashboard` must be a handle returned by `lifestyle_dashboard_open`, or NULL.
/// - The handle must not be used after this call.
#[no_mangle]
pub unsafe extern "C" fn lifestyle_dashboard_free(dashboard: *mut Dashboard) {
    if !dashboard.is_null() {
        drop(Box::from_raw(dashboard));
    }
}

// ============================================================================
// Estimation
// ============================================================================

/// Estimate a stress level and write it to `out`.
///
/// # Safety
/// - `dashboard` must be a valid handle from `lifestyle_dashboard_open`.
/// - `out` must point to writable memory for one `f64`.
/// - Returns `LIFESTYLE_OK` on success, `LIFESTYLE_ERR` on error.
#[no_mangle]
pub unsafe extern "C" fn lifestyle_estimate(
    dashboard: *const Dashboard,
    screen_time_hours: f64,
    caffeine_mg: f64,
    out: *mut f64,
) -> c_int {
    clear_last_error();

    if dashboard.is_null() {
        set_last_error("Null dashboard pointer");
        return LIFESTYLE_ERR;
    }
    if out.is_null() {
        set_last_error("Null output pointer");
        return LIFESTYLE_ERR;
    }

    let dashboard = &*dashboard;
    match dashboard.estimate(screen_time_hours, caffeine_mg) {
        Ok(estimate) => {
            *out = estimate.stress_level;
            LIFESTYLE_OK
        }
        Err(e) => {
            set_last_error(&e.to_string());
            LIFESTYLE_ERR
        }
    }
}

/// Encode the dashboard report as JSON.
///
/// # Safety
/// - `dashboard` must be a valid handle from `lifestyle_dashboard_open`.
/// - Returns a newly allocated string that must be freed with `lifestyle_free_string`.
/// - Returns NULL on error; call `lifestyle_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn lifestyle_report_json(dashboard: *const Dashboard) -> *mut c_char {
    clear_last_error();

    if dashboard.is_null() {
        set_last_error("Null dashboard pointer");
        return ptr::null_mut();
    }

    let dashboard = &*dashboard;
    match dashboard.report_json(None) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Utility functions
// ============================================================================

/// Free a string returned by this library.
///
/// # Safety
/// - `s` must be a string returned by a lifestyle function, or NULL.
/// - The string must not be used after this call.
#[no_mangle]
pub unsafe extern "C" fn lifestyle_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local string; do not free it.
/// - The pointer is valid until the next lifestyle call on the same thread.
/// - Returns NULL if there was no error.
#[no_mangle]
pub unsafe extern "C" fn lifestyle_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match e.borrow().as_ref() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}
