use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::epw::{EpwHeader, EpwRecord};
use crate::error::Result;

/// Writes header and data body to a `.epw` file.
pub struct EpwWriter;

impl EpwWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn write(&self, header: &EpwHeader, records: &[EpwRecord], path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        header.write_to(&mut writer)?;
        for record in records {
            writeln!(writer, "{}", record.to_row())?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl Default for EpwWriter {
    fn default() -> Self {
        Self::new()
    }
}
