use std::path::{Path, PathBuf};

use crate::env::Environment;
use crate::error::Error;
use crate::model::{DoxyConfig, PublishMode, PublishSettings, ResolvedDirectory};
use crate::parser::DoxyfileLoader;
use crate::workspace::{LocalWorkspace, Workspace};

pub const KEY_OUTPUT_DIRECTORY: &str = "OUTPUT_DIRECTORY";
pub const KEY_GENERATE_HTML: &str = "GENERATE_HTML";
pub const KEY_HTML_OUTPUT: &str = "HTML_OUTPUT";
pub const DEFAULT_HTML_OUTPUT: &str = "html";

/// Whether Doxygen writes HTML for this configuration. An absent
/// `GENERATE_HTML` means yes.
pub fn html_enabled(config: &DoxyConfig) -> bool {
    config
        .get(KEY_GENERATE_HTML)
        .is_none_or(|value| value.eq_ignore_ascii_case("YES"))
}

/// Compute the HTML output directory from a parsed Doxyfile.
///
/// The path is `base[/subfolder][/OUTPUT_DIRECTORY]/(HTML_OUTPUT | html)`.
pub fn resolve_output_dir<W: Workspace>(
    config: &DoxyConfig,
    base: &Path,
    subfolder: Option<&str>,
    workspace: &W,
) -> Result<ResolvedDirectory, Error> {
    if !html_enabled(config) {
        return Err(Error::HtmlDisabled);
    }

    let mut path = base.to_path_buf();
    if let Some(subfolder) = non_blank(subfolder) {
        path.push(subfolder);
    }
    if let Some(output_dir) = non_blank(config.get(KEY_OUTPUT_DIRECTORY)) {
        path.push(output_dir);
    }
    match non_blank(config.get(KEY_HTML_OUTPUT)) {
        Some(html_output) => path.push(html_output),
        None => {
            tracing::info!(
                "The {KEY_HTML_OUTPUT} tag is not present or is left blank. \
                 {DEFAULT_HTML_OUTPUT} will be used as the default path."
            );
            path.push(DEFAULT_HTML_OUTPUT);
        }
    }

    tracing::info!("Computed Doxygen output path '{}'.", path.display());
    existing(path, workspace)
}

/// Resolve a directory the user configured directly, relative to `base`.
pub fn resolve_fixed_dir<W: Workspace>(
    html_directory: Option<&str>,
    base: &Path,
    workspace: &W,
) -> Result<ResolvedDirectory, Error> {
    let Some(html_directory) = non_blank(html_directory) else {
        return Err(Error::config("the Doxygen HTML directory is blank"));
    };
    existing(base.join(html_directory), workspace)
}

/// Locates the published HTML directory according to [`PublishSettings`].
#[derive(Debug, Clone)]
pub struct DirectoryLocator<W = LocalWorkspace> {
    settings: PublishSettings,
    environment: Environment,
    workspace: W,
}

impl DirectoryLocator<LocalWorkspace> {
    pub fn new(settings: PublishSettings) -> Self {
        Self {
            settings,
            environment: Environment::memory(),
            workspace: LocalWorkspace,
        }
    }
}

impl<W: Workspace + Clone> DirectoryLocator<W> {
    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn workspace<W2: Workspace + Clone>(self, workspace: W2) -> DirectoryLocator<W2> {
        DirectoryLocator {
            settings: self.settings,
            environment: self.environment,
            workspace,
        }
    }

    pub fn settings(&self) -> &PublishSettings {
        &self.settings
    }

    pub fn locate(&self, base: impl AsRef<Path>) -> Result<ResolvedDirectory, Error> {
        let base = base.as_ref();
        match self.settings.mode {
            PublishMode::HtmlDirectory => {
                tracing::info!("Using the Doxygen HTML directory specified by the configuration.");
                resolve_fixed_dir(
                    self.settings.html_directory.as_deref(),
                    base,
                    &self.workspace,
                )
            }
            PublishMode::Doxyfile => {
                tracing::info!("Using the Doxyfile information.");
                let config = self.load_config(base)?;
                resolve_output_dir(
                    &config,
                    base,
                    self.settings.run_subfolder.as_deref(),
                    &self.workspace,
                )
            }
        }
    }

    fn load_config(&self, base: &Path) -> Result<DoxyConfig, Error> {
        if self.settings.doxyfile_path.trim().is_empty() {
            return Err(Error::config("the Doxyfile path is empty"));
        }
        DoxyfileLoader::new()
            .path(self.settings.doxyfile_path.trim())
            .base_dir(base)
            .environment(self.environment.clone())
            .workspace(self.workspace.clone())
            .load()
    }
}

/// Make `path` absolute against the working directory and check that it is a
/// directory.
fn existing<W: Workspace>(path: PathBuf, workspace: &W) -> Result<ResolvedDirectory, Error> {
    let path = std::path::absolute(&path).map_err(|source| Error::io(&path, source))?;
    if !workspace.is_dir(&path) {
        return Err(Error::DirectoryNotFound { path });
    }
    Ok(ResolvedDirectory { path, exists: true })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
