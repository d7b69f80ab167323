//! FFI bindings for Nutri Goals
//!
//! This module provides C-compatible functions for calling the engine from other languages.
//! All functions use C strings (null-terminated) and return allocated memory that
//! must be freed by the caller using `nutri_free_string`.
//!
//! Dates are passed as `YYYY-MM-DD`; a NULL date means the current UTC date.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use chrono::{NaiveDate, Utc};
use serde_json::json;

use crate::config::EngineConfig;
use crate::pipeline::{profile_json_to_goals, GoalsCalculator};
use crate::validation::{parse_date, validate_profile, RawProfileInput};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

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

/// NULL means today; anything else must be a valid ISO date
unsafe fn reference_date(ptr: *const c_char) -> Result<NaiveDate, String> {
    if ptr.is_null() {
        return Ok(Utc::now().date_naive());
    }
    let text = cstr_to_string(ptr).ok_or("Invalid date string pointer")?;
    parse_date(&text).ok_or_else(|| format!("Invalid reference date '{text}'"))
}

// ============================================================================
// Stateless API
// ============================================================================

/// Validate a profile JSON and return its goals report JSON.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - `today` must be NULL or a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `nutri_free_string`.
/// - Returns NULL on error; call `nutri_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn nutri_calculate_goals(
    json: *const c_char,
    today: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    let today = match reference_date(today) {
        Ok(d) => d,
        Err(msg) => {
            set_last_error(&msg);
            return ptr::null_mut();
        }
    };

    match profile_json_to_goals(&json_str, today) {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Validate a profile JSON.
///
/// Returns `{"valid": true, "profile": {...}}` or
/// `{"valid": false, "errors": {"field": ["message", ...]}}`. Field failures
/// are not errors; only unreadable input returns NULL.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - `today` must be NULL or a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `nutri_free_string`.
#[no_mangle]
pub unsafe extern "C" fn nutri_validate_profile(
    json: *const c_char,
    today: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    let today = match reference_date(today) {
        Ok(d) => d,
        Err(msg) => {
            set_last_error(&msg);
            return ptr::null_mut();
        }
    };

    let raw: RawProfileInput = match serde_json::from_str(&json_str) {
        Ok(raw) => raw,
        Err(e) => {
            set_last_error(&format!("Invalid JSON: {e}"));
            return ptr::null_mut();
        }
    };

    let result = match validate_profile(&raw, today) {
        Ok(profile) => json!({ "valid": true, "profile": profile }),
        Err(errors) => json!({ "valid": false, "errors": errors }),
    };
    string_to_cstr(&result.to_string())
}

// ============================================================================
// Configured API
// ============================================================================

/// Opaque handle to a configured calculator
pub struct NutriCalculatorHandle {
    calculator: GoalsCalculator,
}

/// Create a calculator from a config JSON (NULL for defaults).
///
/// # Safety
/// - `config_json` must be NULL or a valid null-terminated C string.
/// - Returns NULL on error; free the handle with `nutri_calculator_free`.
#[no_mangle]
pub unsafe extern "C" fn nutri_calculator_new(
    config_json: *const c_char,
) -> *mut NutriCalculatorHandle {
    clear_last_error();

    let config = if config_json.is_null() {
        EngineConfig::default()
    } else {
        let text = match cstr_to_string(config_json) {
            Some(s) => s,
            None => {
                set_last_error("Invalid config string pointer");
                return ptr::null_mut();
            }
        };
        match EngineConfig::from_json(&text) {
            Ok(c) => c,
            Err(e) => {
                set_last_error(&e.to_string());
                return ptr::null_mut();
            }
        }
    };

    let handle = Box::new(NutriCalculatorHandle {
        calculator: GoalsCalculator::with_config(config),
    });
    Box::into_raw(handle)
}

/// Free a calculator handle.
///
/// # Safety
/// - `calculator` must be a pointer returned by `nutri_calculator_new`, or NULL.
#[no_mangle]
pub unsafe extern "C" fn nutri_calculator_free(calculator: *mut NutriCalculatorHandle) {
    if !calculator.is_null() {
        drop(Box::from_raw(calculator));
    }
}

/// Calculate a goals report with a configured calculator.
///
/// A NULL `today` uses the configured reference date, else the current date.
///
/// # Safety
/// - `calculator` must be a valid handle from `nutri_calculator_new`.
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `nutri_free_string`.
#[no_mangle]
pub unsafe extern "C" fn nutri_calculator_calculate(
    calculator: *const NutriCalculatorHandle,
    json: *const c_char,
    today: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let handle = match calculator.as_ref() {
        Some(h) => h,
        None => {
            set_last_error("Invalid calculator handle");
            return ptr::null_mut();
        }
    };

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    let today = if today.is_null() {
        handle.calculator.today()
    } else {
        match reference_date(today) {
            Ok(d) => d,
            Err(msg) => {
                set_last_error(&msg);
                return ptr::null_mut();
            }
        }
    };

    match handle.calculator.process_json(&json_str, today) {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Nutri Goals functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Nutri Goals function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn nutri_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next Nutri Goals call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn nutri_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn nutri_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_profile_json() -> CString {
        CString::new(
            r#"{
                "weight_kg": 70,
                "height_cm": 175,
                "birth_date": "1996-01-15",
                "sex": "male",
                "activity_level": "moderately_active",
                "goal_type": "maintenance"
            }"#,
        )
        .unwrap()
    }

    unsafe fn take_string(ptr: *mut c_char) -> String {
        let s = CStr::from_ptr(ptr).to_str().unwrap().to_string();
        nutri_free_string(ptr);
        s
    }

    #[test]
    fn test_ffi_calculate_goals() {
        let json = sample_profile_json();
        let today = CString::new("2026-06-01").unwrap();

        unsafe {
            let result = nutri_calculate_goals(json.as_ptr(), today.as_ptr());
            assert!(!result.is_null());

            let value: serde_json::Value = serde_json::from_str(&take_string(result)).unwrap();
            assert_eq!(value["goals"]["daily_calorie_goal"], 2556);
            assert_eq!(value["goals"]["daily_protein_goal"], 192);
        }
    }

    #[test]
    fn test_ffi_validate_profile() {
        let good = sample_profile_json();
        let bad = CString::new(r#"{"weight_kg": 500, "gender": "male"}"#).unwrap();
        let today = CString::new("2026-06-01").unwrap();

        unsafe {
            let ok: serde_json::Value =
                serde_json::from_str(&take_string(nutri_validate_profile(good.as_ptr(), today.as_ptr())))
                    .unwrap();
            assert_eq!(ok["valid"], true);

            let failed: serde_json::Value =
                serde_json::from_str(&take_string(nutri_validate_profile(bad.as_ptr(), today.as_ptr())))
                    .unwrap();
            assert_eq!(failed["valid"], false);
            assert_eq!(failed["errors"]["weight_kg"][0], "Weight must be less than 300kg");
        }
    }

    #[test]
    fn test_ffi_calculator_lifecycle() {
        let config = CString::new(r#"{"remainder_policy": "unguarded", "reference_date": "2026-06-01"}"#)
            .unwrap();
        let json = sample_profile_json();

        unsafe {
            let calculator = nutri_calculator_new(config.as_ptr());
            assert!(!calculator.is_null());

            let result = nutri_calculator_calculate(calculator, json.as_ptr(), ptr::null());
            assert!(!result.is_null());
            let value: serde_json::Value = serde_json::from_str(&take_string(result)).unwrap();
            assert_eq!(value["provenance"]["reference_date"], "2026-06-01");

            nutri_calculator_free(calculator);
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        unsafe {
            let invalid_json = CString::new("not json").unwrap();
            let result = nutri_calculate_goals(invalid_json.as_ptr(), ptr::null());
            assert!(result.is_null());

            let error = nutri_last_error();
            assert!(!error.is_null());
            let error_str = CStr::from_ptr(error).to_str().unwrap();
            assert!(error_str.starts_with("Invalid JSON"));

            let json = sample_profile_json();
            let bad_date = CString::new("June 1st").unwrap();
            assert!(nutri_calculate_goals(json.as_ptr(), bad_date.as_ptr()).is_null());

            let bad_config = CString::new(r#"{"weight_history_limit": 0}"#).unwrap();
            assert!(nutri_calculator_new(bad_config.as_ptr()).is_null());
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = nutri_version();
            assert!(!version.is_null());

            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert_eq!(version_str, env!("CARGO_PKG_VERSION"));
        }
    }
}
