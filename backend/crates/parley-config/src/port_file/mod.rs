pub(crate) mod port_file_info;

/// Whether a process with this PID exists. `kill(pid, 0)` sends no signal.
#[cfg(unix)]
pub fn is_process_running(pid: u32) -> bool {
    // SAFETY: signal 0 only performs the existence check.
    unsafe { libc::kill(pid as i32, 0) == 0 }
}

/// Liveness cannot be checked here; the client falls back to a
/// connection error if the server is gone.
#[cfg(not(unix))]
pub fn is_process_running(_pid: u32) -> bool {
    true
}
