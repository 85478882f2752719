//! Process hardening: core dump suppression and memory pinning.
//!
//! Operator passwords and their hashes pass through this process on every
//! unlock. On Unix:
//!
//! - **`disable_core_dumps`** sets `RLIMIT_CORE` to 0 so a crash never
//!   writes a request's password to disk.
//! - **`lock_memory`** calls `mlockall(MCL_CURRENT | MCL_FUTURE)` so pages
//!   holding them are never swapped out.
//!
//! Both are no-ops on other platforms.

/// Disable core dumps by setting `RLIMIT_CORE` to 0.
///
/// # Errors
///
/// Returns an error string if the `setrlimit` syscall fails.
#[cfg(unix)]
pub fn disable_core_dumps() -> Result<(), String> {
    // SAFETY: `setrlimit` only adjusts a kernel resource limit for this
    // process; the `rlimit` value is fully initialised and outlives the call.
    #[allow(unsafe_code)]
    let result = unsafe {
        let rlim = libc::rlimit {
            rlim_cur: 0,
            rlim_max: 0,
        };
        libc::setrlimit(libc::RLIMIT_CORE, &rlim)
    };

    if result == 0 {
        Ok(())
    } else {
        Err(format!(
            "core dumps stay enabled, a crash could write passwords to disk: setrlimit(RLIMIT_CORE): {}",
            std::io::Error::last_os_error()
        ))
    }
}

/// No-op on non-Unix platforms.
#[cfg(not(unix))]
pub fn disable_core_dumps() -> Result<(), String> {
    Ok(())
}

/// Pin all current and future memory pages with `mlockall`.
///
/// Requires `CAP_IPC_LOCK` or root. Set `DISKDEC_DISABLE_MLOCK=true` to skip
/// it on development machines.
///
/// # Errors
///
/// Returns an error string if the `mlockall` syscall fails.
#[cfg(unix)]
pub fn lock_memory() -> Result<(), String> {
    // SAFETY: `mlockall` takes two well-defined flags and touches no memory
    // owned by Rust; failure is reported through the return value.
    #[allow(unsafe_code)]
    let result = unsafe { libc::mlockall(libc::MCL_CURRENT | libc::MCL_FUTURE) };

    if result == 0 {
        Ok(())
    } else {
        Err(format!(
            "password buffers may be swapped to disk: mlockall: {}",
            std::io::Error::last_os_error()
        ))
    }
}

/// No-op on non-Unix platforms.
#[cfg(not(unix))]
pub fn lock_memory() -> Result<(), String> {
    Ok(())
}
