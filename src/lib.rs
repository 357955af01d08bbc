//! Run Doxygen as a build step and locate the HTML it generated.
//!
//! [`DoxyfileLoader`] reads a Doxyfile, following `@INCLUDE` and
//! `@INCLUDE_PATH` and expanding `$(NAME)` placeholders, into a
//! [`DoxyConfig`]. [`resolve_output_dir`] turns that configuration into the
//! directory Doxygen wrote HTML to, and [`DirectoryLocator`] picks between the
//! Doxyfile-driven and fixed-directory publish modes.
//!
//! While Doxygen runs, [`ConsoleParser`] sits between its standard output and
//! the build log, tagging and counting error and warning lines.

mod builder;
mod console;
mod env;
mod error;
mod expand;
mod model;
mod parser;
mod resolve;
mod workspace;

pub use builder::{GenerateStep, Installation, Installations, StepReport};
pub use console::{ConsoleParser, NoteStyle, classify};
pub use env::Environment;
pub use error::{Error, ErrorKind};
pub use expand::{VariableExpander, expand};
pub use model::{
    BuildStatus, ConsoleCounts, DoxyConfig, Entry, IncludeSearchPath, LineKind, LineTags,
    PublishMode, PublishSettings, ResolvedDirectory,
};
pub use parser::{DoxyfileLoader, split_values};
pub use resolve::{
    DEFAULT_HTML_OUTPUT, DirectoryLocator, KEY_GENERATE_HTML, KEY_HTML_OUTPUT,
    KEY_OUTPUT_DIRECTORY, html_enabled, resolve_fixed_dir, resolve_output_dir,
};
pub use workspace::{LocalWorkspace, Workspace, is_absolute};
