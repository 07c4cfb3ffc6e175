//! Model files: the Q-table in its logical `bins × .. × actions` shape
//!
//! Tables are encoded with bincode. Writes go to a temporary file in the
//! target directory which is then renamed over the destination, so a reader
//! never sees a half-written model.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use ndarray::ArrayD;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use qlearn_core::{RLError, Result};

use crate::q_table::QTable;

/// Write `table` to `path`, replacing any existing file
pub fn save_table(table: &QTable, path: &Path) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        bincode::serialize_into(&mut writer, &table.view_dyn()?)?;
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| RLError::Io(e.error))?;

    debug!(path = %path.display(), shape = ?table.shape(), "Saved Q-table");
    Ok(())
}

/// Read a table of any shape from `path`
pub fn load_table(path: &Path) -> Result<QTable> {
    let reader = BufReader::new(File::open(path)?);
    let array: ArrayD<f64> = bincode::deserialize_from(reader)?;
    let table = QTable::from_array(array)?;

    info!(path = %path.display(), shape = ?table.shape(), "Loaded Q-table");
    Ok(table)
}

/// Read a table from `path` and require the given logical shape
pub fn load_table_checked(path: &Path, expected_shape: &[usize]) -> Result<QTable> {
    let table = load_table(path)?;
    let actual = table.shape();
    if actual != expected_shape {
        return Err(RLError::ShapeMismatch {
            expected: expected_shape.to_vec(),
            actual,
        });
    }
    Ok(table)
}
