//! Diagnostic output of raw frames.

use std::fmt;

use log::{debug, log_enabled, Level};

/// Receives the bytes of every frame taken from the rx queue, before dispatch.
///
/// Sinks only observe; they never influence what happens to the frame.
pub trait DumpSink {
    fn dump(&mut self, frame: &[u8]);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDump;

impl DumpSink for NoDump {
    #[inline]
    fn dump(&mut self, _frame: &[u8]) {}
}

/// Logs every frame as a [`HexDump`] at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDump;

impl DumpSink for LogDump {
    fn dump(&mut self, frame: &[u8]) {
        if log_enabled!(Level::Debug) {
            debug!("packet len={}\n{}", frame.len(), HexDump(frame));
        }
    }
}

/// Formats bytes as rows of sixteen: hex pairs with a gap after the eighth byte,
/// then the printable ASCII characters of the row.
///
/// ```text
/// FFFFFFFFFFFF0211  2233445508060001 | ......."3DU....
/// ```
#[derive(Debug, Clone, Copy)]
pub struct HexDump<'a>(pub &'a [u8]);

impl fmt::Display for HexDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row_idx, row) in self.0.chunks(16).enumerate() {
            if row_idx > 0 {
                f.write_str("\n")?;
            }
            for (i, b) in row.iter().enumerate() {
                write!(f, "{:02X}", b)?;
                if i == 7 {
                    f.write_str("  ")?;
                }
            }
            if row.len() < 8 {
                f.write_str("  ")?;
            }
            for _ in row.len()..16 {
                f.write_str("  ")?;
            }
            f.write_str(" | ")?;
            for &b in row {
                let c = if (32..127).contains(&b) { b as char } else { '.' };
                write!(f, "{}", c)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_row() {
        let bytes: Vec<u8> = (0x30..0x40).collect();
        assert_eq!(
            HexDump(&bytes).to_string(),
            "3031323334353637  38393A3B3C3D3E3F | 0123456789:;<=>?"
        );
    }

    #[test]
    fn short_row_keeps_ascii_column_aligned() {
        let dump = HexDump(&[0x41, 0x00, 0x7f]).to_string();
        assert_eq!(dump, format!("41007F{} | A..", " ".repeat(28)));

        let full = HexDump(&[0u8; 16]).to_string();
        assert_eq!(dump.find(" | "), full.find(" | "));
    }

    #[test]
    fn rows_are_aligned() {
        let bytes: Vec<u8> = (0..42).collect();
        let dump = HexDump(&bytes).to_string();
        let rows: Vec<&str> = dump.lines().collect();
        assert_eq!(rows.len(), 3);
        for row in rows.iter() {
            assert_eq!(row.find(" | "), Some(34));
        }
        assert!(rows[2].starts_with("2021222324252627  2829"));
        assert!(rows[2].ends_with(" |  !\"#$%&'()"));
    }

    #[test]
    fn empty_input() {
        assert_eq!(HexDump(&[]).to_string(), "");
    }
}
