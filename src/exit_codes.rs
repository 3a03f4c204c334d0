//! Exit code constants for the utask CLI.
//!
//! - 0: Success (including a halted pipeline with nothing to do)
//! - 1: User error (bad args, invalid config)
//! - 2: Lookup failure (unknown command, unbound module)
//! - 3: Task module failure
//! - 4: Remote submission failure
//! - 5: Artifact failure (store I/O or missing reference)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments or invalid configuration.
pub const USER_ERROR: i32 = 1;

/// Lookup failure: the command or the module behind it is unknown.
pub const LOOKUP_FAILURE: i32 = 2;

/// A task module entry point failed.
pub const MODULE_FAILURE: i32 = 3;

/// The batch backend rejected or could not receive the job.
pub const SUBMISSION_FAILURE: i32 = 4;

/// An artifact could not be stored or loaded, or a reference was missing.
pub const ARTIFACT_FAILURE: i32 = 5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [
            SUCCESS,
            USER_ERROR,
            LOOKUP_FAILURE,
            MODULE_FAILURE,
            SUBMISSION_FAILURE,
            ARTIFACT_FAILURE,
        ];
        for (i, &a) in codes.iter().enumerate() {
            for (j, &b) in codes.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b, "Exit codes must be distinct");
                }
            }
        }
    }

    #[test]
    fn success_is_zero() {
        assert_eq!(SUCCESS, 0);
    }
}
