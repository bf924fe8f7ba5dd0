//! Memory measurement for the benchmark binaries.
//!
//! The sigma builder holds two sorted copies of the basis, the diagonal and two
//! scratch vectors, all linear in the number of determinants. The scaling runs
//! record the process high-water mark next to each timing so that this footprint
//! can be checked against the size of the space.

/// Extracts the value in kilobytes of `key` from the contents of `/proc/self/status`.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn status_field_kb(status: &str, key: &str) -> Option<u64> {
    status
        .lines()
        .find_map(|line| line.strip_prefix(key))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|value| value.parse().ok())
}

/// Peak resident set size (`VmHWM`) of the current process in kilobytes.
///
/// Returns 0 if the value cannot be read or the platform is not Linux.
#[cfg(target_os = "linux")]
pub fn get_peak_rss_kb() -> u64 {
    std::fs::read_to_string("/proc/self/status")
        .ok()
        .and_then(|status| status_field_kb(&status, "VmHWM:"))
        .unwrap_or(0)
}

#[cfg(not(target_os = "linux"))]
pub fn get_peak_rss_kb() -> u64 {
    use std::sync::Once;
    static WARN_ONCE: Once = Once::new();
    WARN_ONCE.call_once(|| {
        log::warn!("Peak RSS measurement is only supported on Linux; returning 0.");
    });
    0
}
