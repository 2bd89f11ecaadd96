//! Process exit codes
//!
//! The contract is deliberately coarse: 0 for success and help output,
//! 1 for every failure. Scripts driving this tool only branch on
//! "did it work", so finer-grained codes would be noise.

/// Successful termination (including usage/help output)
pub const OK: i32 = 0;

/// Any failure: usage, session, load, resolution, tool, upload
pub const FAILURE: i32 = 1;
