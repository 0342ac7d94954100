//! Shared helpers for command implementations.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Write output to file or stdout
pub fn write_output(output: Option<&PathBuf>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }
        None => {
            print!("{}", content);
            io::stdout().flush()?;
        }
    }
    Ok(())
}

/// Parse an RFC 3339 timestamp such as `2024-06-01T22:30:00Z`
pub fn parse_timestamp(s: &str) -> Result<OffsetDateTime> {
    OffsetDateTime::parse(s.trim(), &Rfc3339)
        .with_context(|| format!("Invalid timestamp '{}', expected RFC 3339", s))
}

pub fn format_timestamp(at: OffsetDateTime) -> String {
    at.format(&Rfc3339).unwrap_or_else(|_| at.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_parse_timestamp() {
        let at = parse_timestamp("2024-06-01T22:30:00Z").unwrap();
        assert_eq!(at, datetime!(2024-06-01 22:30 UTC));
    }

    #[test]
    fn test_parse_timestamp_invalid() {
        let err = parse_timestamp("tonight").unwrap_err();
        assert!(err.to_string().contains("RFC 3339"));
    }

    #[test]
    fn test_format_timestamp_round_trips() {
        let at = datetime!(2024-06-01 22:30:15 +02:00);
        assert_eq!(parse_timestamp(&format_timestamp(at)).unwrap(), at);
    }

    #[test]
    fn test_write_output_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        write_output(Some(&path), "hello\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
    }
}
