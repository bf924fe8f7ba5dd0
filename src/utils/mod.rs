//! Common utilities for the benchmark binaries.
//!
//! - **`perf`**: Contains platform-specific utilities for performance analysis.
//!   Currently, it provides a function to read the peak resident set size (RSS)
//!   on Linux systems, which the scaling benchmark records next to its timings.

pub mod perf;
