//! Persisted datasets (made by FontLab https://www.fontlab.com/)

use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{FontMetaError, Result};

/// Font id → record. A `BTreeMap` keeps the written keys sorted.
pub type Dataset<R> = BTreeMap<String, R>;

/// Directory of `<name>.json` datasets.
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    /// Load a dataset; a missing file is an empty dataset.
    pub fn read<R: DeserializeOwned>(&self, name: &str) -> Result<Dataset<R>> {
        let path = self.path_for(name);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Dataset::new()),
            Err(err) => return Err(FontMetaError::Io(err)),
        };
        Ok(serde_json::from_str(&raw)?)
    }

    /// Replace a dataset. The file is swapped in whole, so readers never see
    /// a half-written dataset.
    pub fn write<R: Serialize>(&self, name: &str, data: &Dataset<R>) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(name);

        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        write_json_pretty(data, &mut tmp)?;
        tmp.write_all(b"\n")?;
        tmp.persist(&path).map_err(|err| FontMetaError::Io(err.error))?;

        Ok(path)
    }
}

/// Write any serializable value as prettified JSON.
pub fn write_json_pretty<T: Serialize + ?Sized>(value: &T, mut w: impl Write) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    w.write_all(json.as_bytes())?;
    Ok(())
}
