//! Safe wrappers for platform-specific unsafe operations.
//!
//! Every `unsafe` block outside the CPAL stream wrapper lives here.

/// Run a closure with stderr temporarily redirected to `/dev/null`.
///
/// CPAL prints ALSA/JACK probing noise while enumerating devices; it is
/// harmless but reads like an error to the driver.
pub fn with_suppressed_stderr<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    // SAFETY: Safe as long as no other thread is concurrently manipulating fd 2.
    unsafe {
        let saved_fd = libc::dup(2);
        let devnull = libc::open(c"/dev/null".as_ptr(), libc::O_WRONLY);
        if saved_fd >= 0 && devnull >= 0 {
            libc::dup2(devnull, 2);
            libc::close(devnull);
        }

        let result = f();

        if saved_fd >= 0 {
            libc::dup2(saved_fd, 2);
            libc::close(saved_fd);
        }

        result
    }
}

/// Set an environment variable.
///
/// Caller must ensure no other threads are reading the environment.
pub fn set_env(key: &str, value: &str) {
    // SAFETY: Caller must ensure no other threads are reading environment
    // variables concurrently.
    unsafe {
        std::env::set_var(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suppressed_stderr_returns_closure_value() {
        let value = with_suppressed_stderr(|| {
            eprintln!("hidden");
            42
        });
        assert_eq!(value, 42);
    }
}
