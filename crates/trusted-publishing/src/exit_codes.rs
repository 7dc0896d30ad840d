//! Process exit codes. These are part of the public contract: workflow steps
//! only distinguish success from failure.

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1; // Any classified or unclassified exchange failure
