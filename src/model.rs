use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::Error;

/// A `KEY = value` assignment read from a Doxyfile or one of its includes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    pub value: String,
    pub source: PathBuf,
    pub line: u32,
}

/// Resolved configuration of one Doxyfile, includes merged in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoxyConfig {
    entries: BTreeMap<String, Entry>,
    include_path: IncludeSearchPath,
    files_read: usize,
}

impl DoxyConfig {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|entry| entry.value.as_str())
    }

    pub fn entry(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values()
    }

    /// Directories collected from every `@INCLUDE_PATH` seen during the parse.
    pub fn include_path(&self) -> &IncludeSearchPath {
        &self.include_path
    }

    /// Number of files opened, the start file and all includes.
    pub fn files_read(&self) -> usize {
        self.files_read
    }

    pub(crate) fn insert(&mut self, entry: Entry) {
        self.entries.insert(entry.key.clone(), entry);
    }

    pub(crate) fn include_path_mut(&mut self) -> &mut IncludeSearchPath {
        &mut self.include_path
    }

    pub(crate) fn record_file_read(&mut self) {
        self.files_read += 1;
    }
}

/// Ordered directories consulted when resolving an `@INCLUDE` target.
///
/// Directories accumulate across the whole parse, not per file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludeSearchPath {
    dirs: Vec<String>,
}

impl IncludeSearchPath {
    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.dirs.iter().map(String::as_str)
    }

    pub(crate) fn extend<I>(&mut self, dirs: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.dirs.extend(dirs);
    }
}

/// Directory the HTML documentation was written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDirectory {
    pub path: PathBuf,
    pub exists: bool,
}

impl ResolvedDirectory {
    pub fn as_path(&self) -> &Path {
        &self.path
    }
}

/// Where the published HTML directory comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PublishMode {
    /// Derive the directory from the Doxyfile's output keys.
    #[default]
    Doxyfile,
    /// Use the directory the user configured verbatim.
    HtmlDirectory,
}

impl PublishMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Doxyfile => "DoxyFile",
            Self::HtmlDirectory => "HtmlDirectory",
        }
    }
}

impl Display for PublishMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PublishMode {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "" | "DoxyFile" => Ok(Self::Doxyfile),
            "HtmlDirectory" => Ok(Self::HtmlDirectory),
            other => Err(Error::config(format!("unknown publish type `{other}`"))),
        }
    }
}

/// User-supplied values that decide how the output directory is located.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishSettings {
    pub mode: PublishMode,
    pub doxyfile_path: String,
    pub html_directory: Option<String>,
    pub run_subfolder: Option<String>,
}

impl PublishSettings {
    pub fn doxyfile(path: impl Into<String>) -> Self {
        Self {
            mode: PublishMode::Doxyfile,
            doxyfile_path: path.into(),
            ..Self::default()
        }
    }

    pub fn html_directory(dir: impl Into<String>) -> Self {
        Self {
            mode: PublishMode::HtmlDirectory,
            html_directory: Some(dir.into()),
            ..Self::default()
        }
    }

    pub fn run_subfolder(mut self, subfolder: impl Into<String>) -> Self {
        self.run_subfolder = Some(subfolder.into());
        self
    }
}

/// Tag attached to a console line that matched a diagnostic pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Normal,
    Error,
    Warning,
}

impl LineKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

/// Outcome of classifying one console line. Both flags may be set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineTags {
    pub error: bool,
    pub warning: bool,
}

impl LineTags {
    pub fn is_normal(self) -> bool {
        !self.error && !self.warning
    }

    /// Tags in the order their notes are written.
    pub fn kinds(self) -> impl Iterator<Item = LineKind> {
        [
            self.error.then_some(LineKind::Error),
            self.warning.then_some(LineKind::Warning),
        ]
        .into_iter()
        .flatten()
    }
}

/// Running error and warning totals for one process execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConsoleCounts {
    pub errors: usize,
    pub warnings: usize,
}

/// Build result as seen by the host pipeline, best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum BuildStatus {
    #[default]
    Success,
    Unstable,
    Failure,
}

impl BuildStatus {
    pub fn worst(self, other: Self) -> Self {
        self.max(other)
    }
}

impl Display for BuildStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => f.write_str("SUCCESS"),
            Self::Unstable => f.write_str("UNSTABLE"),
            Self::Failure => f.write_str("FAILURE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_mode_parses_host_selector_strings() {
        assert_eq!("DoxyFile".parse::<PublishMode>().ok(), Some(PublishMode::Doxyfile));
        assert_eq!(
            "HtmlDirectory".parse::<PublishMode>().ok(),
            Some(PublishMode::HtmlDirectory)
        );
        assert_eq!("".parse::<PublishMode>().ok(), Some(PublishMode::Doxyfile));
        assert!("Latex".parse::<PublishMode>().is_err());
    }

    #[test]
    fn build_status_only_gets_worse() {
        assert_eq!(BuildStatus::Success.worst(BuildStatus::Unstable), BuildStatus::Unstable);
        assert_eq!(BuildStatus::Failure.worst(BuildStatus::Unstable), BuildStatus::Failure);
        assert_eq!(BuildStatus::Unstable.worst(BuildStatus::Success), BuildStatus::Unstable);
    }

    #[test]
    fn line_tags_list_error_before_warning() {
        let tags = LineTags {
            error: true,
            warning: true,
        };
        assert_eq!(
            tags.kinds().collect::<Vec<_>>(),
            vec![LineKind::Error, LineKind::Warning]
        );
        assert!(LineTags::default().is_normal());
    }
}
