//! CLI subcommands

pub mod key;
pub mod keygen;

use std::io::Read;
use std::path::Path;

use crate::CliError;

/// Read a file, or stdin when the path is `-`
pub(crate) fn read_input(path: &Path) -> Result<String, CliError> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}
