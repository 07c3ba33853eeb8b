// Simple implementations for the ProgressStore and StudyTimeSink ports.

use crate::traits::{ProgressMap, ProgressStore, StudyTimeSink, TrainerError};
use serde::{Deserialize, Serialize};

/// Store that only keeps progress in memory, but is (de)serializable to
/// easily allow reuse of it in file backed stores.
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct MemoryProgressStore {
    progress: ProgressMap,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn from(progress: &ProgressMap) -> Self {
        MemoryProgressStore {
            progress: progress.clone(),
        }
    }
}

impl ProgressStore for MemoryProgressStore {
    fn load(&self) -> Result<ProgressMap, TrainerError> {
        Ok(self.progress.clone())
    }

    fn save(&mut self, progress: &ProgressMap) -> Result<(), TrainerError> {
        self.progress = progress.clone();
        Ok(())
    }
}

/// A progress store that reads and writes a yaml file.
#[derive(Debug)]
pub struct YamlProgressStore {
    store: MemoryProgressStore,
    filename: String,
}

impl YamlProgressStore {
    /// Create a new yaml store, persisting to filename. If this file already
    /// exists its records are loaded when created.
    pub fn new(filename: &str) -> Result<Self, TrainerError> {
        let store = if std::path::Path::new(filename).exists() {
            let file = std::fs::File::open(filename)?;
            let yaml: serde_yaml::Value = serde_yaml::from_reader(file)?;
            serde_yaml::from_value(yaml)?
        } else {
            Default::default()
        };

        Ok(YamlProgressStore {
            store,
            filename: filename.to_owned(),
        })
    }

    /// Write the data to the disk.
    fn write(&mut self) -> Result<(), TrainerError> {
        use std::fs::OpenOptions;
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.filename)?;
        serde_yaml::to_writer(file, &self.store)?;
        Ok(())
    }
}

impl ProgressStore for YamlProgressStore {
    fn load(&self) -> Result<ProgressMap, TrainerError> {
        self.store.load()
    }

    fn save(&mut self, progress: &ProgressMap) -> Result<(), TrainerError> {
        self.store.save(progress)?;
        self.write()
    }
}

/// In-memory accumulator for total study time.
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct MemoryStudyLog {
    total_seconds: u64,
}

impl MemoryStudyLog {
    pub fn new() -> Self {
        Default::default()
    }

    /// Accumulated study time over all recorded sessions.
    pub fn total(&self) -> u64 {
        self.total_seconds
    }
}

impl StudyTimeSink for MemoryStudyLog {
    fn add_elapsed(&mut self, seconds: u64) -> Result<(), TrainerError> {
        self.total_seconds += seconds;
        Ok(())
    }
}

/// Study time accumulator backed by a yaml file.
#[derive(Debug)]
pub struct YamlStudyLog {
    log: MemoryStudyLog,
    filename: String,
}

impl YamlStudyLog {
    pub fn new(filename: &str) -> Result<Self, TrainerError> {
        let log = if std::path::Path::new(filename).exists() {
            let file = std::fs::File::open(filename)?;
            let yaml: serde_yaml::Value = serde_yaml::from_reader(file)?;
            serde_yaml::from_value(yaml)?
        } else {
            Default::default()
        };

        Ok(YamlStudyLog {
            log,
            filename: filename.to_owned(),
        })
    }

    pub fn total(&self) -> u64 {
        self.log.total()
    }

    fn write(&mut self) -> Result<(), TrainerError> {
        use std::fs::OpenOptions;
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.filename)?;
        serde_yaml::to_writer(file, &self.log)?;
        Ok(())
    }
}

impl StudyTimeSink for YamlStudyLog {
    fn add_elapsed(&mut self, seconds: u64) -> Result<(), TrainerError> {
        self.log.add_elapsed(seconds)?;
        self.write()
    }
}
