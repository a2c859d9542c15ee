//! Command line value parsers.

use byte_unit::Byte;
use std::str::FromStr;

/// Parses a human-readable size ("1GB", "250MiB", "64KB") into bytes.
///
/// Used for `--log-max-size`, so zero is rejected: a file rolled after every
/// write is never what the operator meant.
pub fn parse_log_file_size(s: &str) -> Result<u64, String> {
	let bytes = Byte::from_str(s.trim())
		.map_err(|e| format!("invalid size '{}': {}", s, e))?
		.as_u64();
	if bytes == 0 {
		return Err(format!("log file size must be greater than zero, got '{}'", s));
	}
	Ok(bytes)
}
