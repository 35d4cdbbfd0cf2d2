pub mod error;
pub mod protocol;
pub mod replay;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

pub use error::{ReplayError, Result};
pub use protocol::fields_for;
pub use protocol::types::{EventType, FieldKind, FieldSpec};
pub use replay::decoder::{ConsoleSink, Decoder, EventSink};
pub use replay::types::*;
pub use replay::{decode_all, decode_into, decode_reader};

pub fn read_replay_file(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    fs::read(path).map_err(|source| ReplayError::Open {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_replay_file(path: impl AsRef<Path>) -> Result<Decoded> {
    let path = path.as_ref();
    let data = read_replay_file(path)?;
    let decoded = decode_all(&data);
    info!(
        events = decoded.log.len(),
        bytes = data.len(),
        "decoded {} ({})",
        path.display(),
        decoded.termination
    );

    Ok(decoded)
}

/// Writes `log` as a JSON document, creating parent directories as needed.
pub fn export_json(log: &ReplayLog, path: impl AsRef<Path>, pretty: bool) -> Result<()> {
    let path = path.as_ref();
    let write_err = |source| ReplayError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    let mut writer = BufWriter::new(File::create(path).map_err(write_err)?);
    if pretty {
        serde_json::to_writer_pretty(&mut writer, log)?;
    } else {
        serde_json::to_writer(&mut writer, log)?;
    }
    writer.flush().map_err(write_err)?;
    info!(events = log.len(), "exported {}", path.display());

    Ok(())
}
