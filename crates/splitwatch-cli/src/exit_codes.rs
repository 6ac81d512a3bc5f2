//! Process exit codes. Schedulers key alerting off these, keep them stable.

pub const SUCCESS: i32 = 0;
pub const DEGRADED: i32 = 1; // Run finished but the classifier call failed
pub const CONFIG_ERROR: i32 = 2; // Bad config, unreadable input or unreachable source
