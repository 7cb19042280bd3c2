//! CLI Exit Code Registry
//!
//! Single source of truth for the `concilia` exit codes. Exit codes are
//! part of the shell contract — close scripts and schedulers rely on them.
//!
//! | Code | Meaning                                                  |
//! |------|----------------------------------------------------------|
//! | 0    | Fully reconciled, no discrepancies                       |
//! | 1    | Discrepancies found (unmatched records on either side)   |
//! | 2    | Usage error (bad args, missing file)                     |
//! | 3    | Duplicate record id within one input                     |
//! | 4    | Ambiguous matches with `fail_on_ambiguous` set           |
//! | 5    | Parse error (config or input structure)                  |

/// Fully reconciled - every record accounted for.
pub const EXIT_SUCCESS: u8 = 0;

/// Discrepancies found. Like `diff(1)`, exit 1 means "the sides differ";
/// it is the expected outcome the tool exists to surface, not a failure.
pub const EXIT_DISCREPANCIES: u8 = 1;

/// Usage error - bad arguments, missing or unreadable file.
pub const EXIT_USAGE: u8 = 2;

/// Duplicate record id found in one input collection.
pub const EXIT_DUPLICATE_ID: u8 = 3;

/// Ambiguous matches found and the config escalates them.
pub const EXIT_AMBIGUOUS: u8 = 4;

/// Parse error - invalid config or input missing a mapped column.
pub const EXIT_PARSE: u8 = 5;

use concilia_recon::ReconError;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::DuplicateId { .. } => EXIT_DUPLICATE_ID,
        ReconError::MissingColumn { .. }
        | ReconError::ConfigParse(_)
        | ReconError::ConfigValidation(_)
        | ReconError::Io(_) => EXIT_PARSE,
    }
}
