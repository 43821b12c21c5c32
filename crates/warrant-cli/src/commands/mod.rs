//! Command implementations.
//!
//! Each command returns its rendered output; `main` prints it.

pub mod assemble;
pub mod compose;
pub mod design;
pub mod impact;
pub mod library;
pub mod query;
pub mod reason;
pub mod validate;

pub use self::assemble::execute_assemble;
pub use self::compose::execute_compose;
pub use self::design::execute_design;
pub use self::impact::execute_impact;
pub use self::library::execute_library;
pub use self::query::execute_query;
pub use self::reason::execute_reason;
pub use self::validate::execute_validate;

use crate::error::{CliError, Result};
use std::fs;
use std::path::Path;
use warrant_domain::AssuranceCase;

/// Read a text file, naming it in the error.
pub(crate) fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| CliError::InvalidInput(format!("Cannot read {}: {}", path.display(), e)))
}

/// Load a case from its JSON file.
pub(crate) fn load_case(path: &Path) -> Result<AssuranceCase> {
    Ok(AssuranceCase::from_json(&read_file(path)?)?)
}
