//! Filesystem-backed run store.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::codec::{decode_stack, encode_stack};
use crate::error::StoreError;
use crate::info::DatasetInfo;
use crate::measurements::Measurements;
use crate::store::{Category, ChannelStack, RunStore};
use crate::STACK_EXTENSION;

const INFO_FILE: &str = "info.json";
const MEASUREMENTS_FILE: &str = "measurements.json";

/// A dataset directory:
///
/// ```text
/// <root>/Inputs/<run_id>.plm
/// <root>/Labels/<run_id>.plm
/// <root>/info.json
/// <root>/measurements.json
/// ```
#[derive(Clone, Debug)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    /// Open an existing dataset directory. Nothing is touched on disk.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create (or reuse) a dataset directory with both category folders.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        for category in [Category::Inputs, Category::Labels] {
            fs::create_dir_all(root.join(category.dir_name()))?;
        }
        Ok(Self { root })
    }

    /// The dataset directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of one stack file.
    pub fn stack_path(&self, run_id: &str, category: Category) -> PathBuf {
        self.root
            .join(category.dir_name())
            .join(format!("{run_id}.{STACK_EXTENSION}"))
    }

    fn write_json<T: serde::Serialize>(&self, name: &str, value: &T) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root)?;
        let json = serde_json::to_string_pretty(value)?;
        fs::write(self.root.join(name), json)?;
        Ok(())
    }
}

impl RunStore for DirStore {
    fn location(&self) -> String {
        self.root.display().to_string()
    }

    fn list_runs(&self) -> Result<Vec<String>, StoreError> {
        let dir = self.root.join(Category::Inputs.dir_name());
        let mut runs = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(STACK_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                runs.push(stem.to_string());
            }
        }
        runs.sort();
        debug!(dir = %dir.display(), count = runs.len(), "listed runs");
        Ok(runs)
    }

    fn contains(&self, run_id: &str, category: Category) -> bool {
        self.stack_path(run_id, category).is_file()
    }

    fn load(&self, run_id: &str, category: Category) -> Result<ChannelStack, StoreError> {
        let path = self.stack_path(run_id, category);
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::MissingRun {
                    run_id: run_id.to_string(),
                    category,
                })
            }
            Err(e) => return Err(e.into()),
        };
        let stack = decode_stack(&mut BufReader::new(file))?;
        debug!(run_id, %category, channels = stack.channels().len(), "loaded stack");
        Ok(stack)
    }

    fn save(
        &self,
        run_id: &str,
        category: Category,
        stack: &ChannelStack,
    ) -> Result<(), StoreError> {
        let path = self.stack_path(run_id, category);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        // Write aside, then rename over any previous file.
        let tmp = path.with_extension(format!("{STACK_EXTENSION}.tmp"));
        {
            let mut w = BufWriter::new(File::create(&tmp)?);
            encode_stack(&mut w, stack)?;
            w.flush()?;
        }
        fs::rename(&tmp, &path)?;
        debug!(run_id, %category, path = %path.display(), "saved stack");
        Ok(())
    }

    fn load_info(&self) -> Result<DatasetInfo, StoreError> {
        let path = self.root.join(INFO_FILE);
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(StoreError::MissingInfo),
            Err(e) => return Err(e.into()),
        };
        let info: DatasetInfo = serde_json::from_reader(BufReader::new(file))?;
        info.validate()?;
        Ok(info)
    }

    fn save_info(&self, info: &DatasetInfo) -> Result<(), StoreError> {
        self.write_json(INFO_FILE, info)
    }

    fn load_measurements(&self) -> Result<Option<Measurements>, StoreError> {
        let path = self.root.join(MEASUREMENTS_FILE);
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_reader(BufReader::new(file))?))
    }

    fn save_measurements(&self, measurements: &Measurements) -> Result<(), StoreError> {
        self.write_json(MEASUREMENTS_FILE, measurements)
    }
}
