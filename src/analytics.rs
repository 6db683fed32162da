//! Usage analytics.
//!
//! Each recorded call appends one JSON line, in the host application's
//! usage-log format, to a daily log file. Writing the log never changes the
//! outcome of the call being recorded.

use anyhow::{Context, Result};
use log::warn;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use time::macros::{datetime, format_description};
use time::OffsetDateTime;
use uuid::Uuid;

pub const TOOLKIT_NAME: &str = env!("CARGO_PKG_NAME");

/// Log files are rotated once they grow past this size
pub const MAX_LOG_BYTES: u64 = 25 * 1024 * 1024;

const LOG_DIR_ENV: &str = "PIXEL_POINTS_LOG_DIR";
const HOST_VERSION_ENV: &str = "BHOM_VERSION";

/// Ticks as used by .NET's `DateTime.Ticks`: 100ns intervals since
/// 0001-01-01 UTC, or whole seconds when `short` is set
pub fn csharp_ticks(date_time: OffsetDateTime, short: bool) -> i64 {
    let elapsed = date_time - datetime!(0001-01-01 0:00 UTC);
    if short {
        elapsed.whole_seconds()
    } else {
        (elapsed.whole_nanoseconds() / 100) as i64
    }
}

/// Name and type descriptor of one argument of a recorded call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterInfo {
    #[serde(rename = "_t")]
    pub type_name: String,
    #[serde(rename = "Name")]
    pub name: String,
}

/// Describes the function being recorded
#[derive(Debug, Clone, PartialEq)]
pub struct CallInfo {
    pub method_name: String,
    pub type_name: String,
    pub parameters: Vec<ParameterInfo>,
}

impl CallInfo {
    pub fn new(method_name: &str, module: &str) -> Self {
        Self {
            method_name: method_name.to_string(),
            type_name: format!("{}::{}", module, method_name),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter<T: ?Sized>(mut self, name: &str) -> Self {
        self.parameters.push(ParameterInfo {
            type_name: std::any::type_name::<T>().to_string(),
            name: name.to_string(),
        });
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectedItem {
    #[serde(rename = "MethodName")]
    pub method_name: String,
    #[serde(rename = "Parameters")]
    pub parameters: Vec<ParameterInfo>,
    #[serde(rename = "TypeName")]
    pub type_name: String,
    #[serde(rename = "_bhomVersion")]
    pub host_version: String,
    #[serde(rename = "_t")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogTime {
    #[serde(rename = "$date")]
    pub date: i64,
}

/// One line of the usage log
#[derive(Debug, Clone, Serialize)]
pub struct UsageLogEntry {
    #[serde(rename = "BHoMVersion")]
    pub host_version: String,
    #[serde(rename = "BHoM_Guid")]
    pub guid: Uuid,
    #[serde(rename = "CallerName")]
    pub caller_name: String,
    #[serde(rename = "ComponentId")]
    pub component_id: Uuid,
    #[serde(rename = "CustomData")]
    pub custom_data: BTreeMap<String, String>,
    #[serde(rename = "Errors")]
    pub errors: Vec<String>,
    #[serde(rename = "FileId")]
    pub file_id: String,
    #[serde(rename = "FileName")]
    pub file_name: String,
    #[serde(rename = "Fragments")]
    pub fragments: Vec<serde_json::Value>,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "ProjectID")]
    pub project_id: String,
    #[serde(rename = "SelectedItem")]
    pub selected_item: SelectedItem,
    #[serde(rename = "Time")]
    pub time: LogTime,
    #[serde(rename = "UI")]
    pub ui: String,
    #[serde(rename = "UiVersion")]
    pub ui_version: String,
    #[serde(rename = "_t")]
    pub kind: String,
}

/// Append-only usage log in a directory
#[derive(Debug, Clone)]
pub struct UsageLog {
    dir: PathBuf,
    host_version: String,
}

impl UsageLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            host_version: std::env::var(HOST_VERSION_ENV).unwrap_or_default(),
        }
    }

    /// `$PIXEL_POINTS_LOG_DIR`, else the host's shared log folder if it
    /// exists, else `<temp>/BHoMLogs`
    pub fn default_location() -> Self {
        if let Ok(dir) = std::env::var(LOG_DIR_ENV) {
            return Self::new(dir);
        }
        if let Ok(program_data) = std::env::var("PROGRAMDATA") {
            let shared = Path::new(&program_data).join("BHoM").join("Logs");
            if shared.is_dir() {
                return Self::new(shared);
            }
        }
        Self::new(std::env::temp_dir().join("BHoMLogs"))
    }

    pub fn with_host_version(mut self, version: impl Into<String>) -> Self {
        self.host_version = version.into();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Today's log file
    pub fn file_path(&self) -> PathBuf {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        let date = now
            .format(format_description!("[year][month][day]"))
            .unwrap_or_else(|_| "00000000".to_string());
        self.dir.join(format!("{}_{}.log", TOOLKIT_NAME, date))
    }

    /// Run `f`, then append a usage entry describing the call and its
    /// outcome. The result of `f` is returned untouched.
    pub fn record<T, E, F>(&self, call: &CallInfo, f: F) -> Result<T, E>
    where
        E: fmt::Display,
        F: FnOnce() -> Result<T, E>,
    {
        let mut entry = self.entry(call);
        let result = f();

        if let Err(e) = &result {
            entry.errors.push(e.to_string());
        }
        if let Err(e) = self.append(&entry) {
            warn!("Failed to write usage log in {}: {:#}", self.dir.display(), e);
        }

        result
    }

    fn entry(&self, call: &CallInfo) -> UsageLogEntry {
        let id = Uuid::new_v4();
        let mut custom_data = BTreeMap::new();
        if let Ok(exe) = std::env::current_exe() {
            custom_data.insert("interpreter".to_string(), exe.display().to_string());
        }

        UsageLogEntry {
            host_version: self.host_version.clone(),
            guid: id,
            caller_name: call.method_name.clone(),
            component_id: id,
            custom_data,
            errors: Vec::new(),
            file_id: String::new(),
            file_name: String::new(),
            fragments: Vec::new(),
            name: String::new(),
            project_id: String::new(),
            selected_item: SelectedItem {
                method_name: call.method_name.clone(),
                parameters: call.parameters.clone(),
                type_name: call.type_name.clone(),
                host_version: self.host_version.clone(),
                kind: "Rust".to_string(),
            },
            time: LogTime {
                date: csharp_ticks(OffsetDateTime::now_utc(), true),
            },
            ui: "Rust".to_string(),
            ui_version: TOOLKIT_NAME.to_string(),
            kind: "BH.oM.UI.UsageLogEntry".to_string(),
        }
    }

    fn append(&self, entry: &UsageLogEntry) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating {}", self.dir.display()))?;

        let path = self.file_path();
        self.rotate_if_full(&path)?;

        let line = serde_json::to_string(entry)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("opening {}", path.display()))?;
        writeln!(file, "{}", line)?;

        Ok(())
    }

    /// Keep a single backup (`<name>.1`) once the log passes `MAX_LOG_BYTES`
    fn rotate_if_full(&self, path: &Path) -> Result<()> {
        let size = match std::fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(_) => return Ok(()),
        };
        if size < MAX_LOG_BYTES {
            return Ok(());
        }

        let mut backup = path.as_os_str().to_owned();
        backup.push(".1");
        std::fs::rename(path, &backup)
            .with_context(|| format!("rotating {}", path.display()))?;
        Ok(())
    }
}
