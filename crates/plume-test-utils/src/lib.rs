//! Test utilities and mock types for Plume development.
//!
//! Provides an in-memory [`RunStore`] ([`MemStore`]), mock
//! [`InferenceModel`](plume_core::InferenceModel)s in [`models`], and
//! dataset builders in [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod models;

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use plume_store::{Category, ChannelStack, DatasetInfo, Measurements, RunStore, StoreError};

pub use models::{ConstantModel, FailingModel, FnModel, IdentityModel};

/// In-memory [`RunStore`].
///
/// Backed by a `BTreeMap` so runs list in sorted order like on disk.
pub struct MemStore {
    name: String,
    stacks: RwLock<BTreeMap<(&'static str, String), ChannelStack>>,
    info: RwLock<Option<DatasetInfo>>,
    measurements: RwLock<Option<Measurements>>,
}

impl MemStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stacks: RwLock::new(BTreeMap::new()),
            info: RwLock::new(None),
            measurements: RwLock::new(None),
        }
    }

    /// Pre-populate the metadata document.
    pub fn with_info(self, info: DatasetInfo) -> Self {
        *self.info.write().unwrap_or_else(PoisonError::into_inner) = Some(info);
        self
    }

    /// Pre-populate one stack.
    pub fn insert(&self, run_id: &str, category: Category, stack: ChannelStack) {
        self.stacks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((category.dir_name(), run_id.to_string()), stack);
    }

    /// A stored stack, if present.
    pub fn get(&self, run_id: &str, category: Category) -> Option<ChannelStack> {
        self.stacks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(category.dir_name(), run_id.to_string()))
            .cloned()
    }

    /// Sorted keys stored under `category`.
    pub fn keys(&self, category: Category) -> Vec<String> {
        self.stacks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .filter(|(c, _)| *c == category.dir_name())
            .map(|(_, k)| k.clone())
            .collect()
    }

    /// The stored metadata document, if any.
    pub fn info(&self) -> Option<DatasetInfo> {
        self.info.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// The stored measurements document, if any.
    pub fn measurements(&self) -> Option<Measurements> {
        self.measurements
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl RunStore for MemStore {
    fn location(&self) -> String {
        format!("mem://{}", self.name)
    }

    fn list_runs(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.keys(Category::Inputs))
    }

    fn contains(&self, run_id: &str, category: Category) -> bool {
        self.stacks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&(category.dir_name(), run_id.to_string()))
    }

    fn load(&self, run_id: &str, category: Category) -> Result<ChannelStack, StoreError> {
        self.get(run_id, category).ok_or_else(|| StoreError::MissingRun {
            run_id: run_id.to_string(),
            category,
        })
    }

    fn save(
        &self,
        run_id: &str,
        category: Category,
        stack: &ChannelStack,
    ) -> Result<(), StoreError> {
        self.insert(run_id, category, stack.clone());
        Ok(())
    }

    fn load_info(&self) -> Result<DatasetInfo, StoreError> {
        self.info().ok_or(StoreError::MissingInfo)
    }

    fn save_info(&self, info: &DatasetInfo) -> Result<(), StoreError> {
        *self.info.write().unwrap_or_else(PoisonError::into_inner) = Some(info.clone());
        Ok(())
    }

    fn load_measurements(&self) -> Result<Option<Measurements>, StoreError> {
        Ok(self.measurements())
    }

    fn save_measurements(&self, measurements: &Measurements) -> Result<(), StoreError> {
        *self
            .measurements
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(measurements.clone());
        Ok(())
    }
}
