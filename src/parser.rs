use std::path::{Path, PathBuf};

use crate::env::Environment;
use crate::error::Error;
use crate::expand::VariableExpander;
use crate::model::{DoxyConfig, Entry};
use crate::workspace::{LocalWorkspace, Workspace, is_absolute};

/// Builder-style Doxyfile reader.
///
/// Reads the start file and everything it `@INCLUDE`s into one
/// [`DoxyConfig`]. Values have `$(NAME)` placeholders expanded against the
/// configured [`Environment`] before they are split into tokens.
#[derive(Debug, Clone)]
pub struct DoxyfileLoader<W = LocalWorkspace> {
    path: PathBuf,
    base_dir: Option<PathBuf>,
    environment: Environment,
    include_guard: bool,
    workspace: W,
}

impl DoxyfileLoader<LocalWorkspace> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for DoxyfileLoader<LocalWorkspace> {
    fn default() -> Self {
        Self {
            path: PathBuf::from("Doxyfile"),
            base_dir: None,
            environment: Environment::memory(),
            include_guard: true,
            workspace: LocalWorkspace,
        }
    }
}

impl<W: Workspace> DoxyfileLoader<W> {
    /// Start file. Relative paths are taken from the base directory.
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = path.as_ref().to_path_buf();
        self
    }

    pub fn base_dir(mut self, base_dir: impl AsRef<Path>) -> Self {
        self.base_dir = Some(base_dir.as_ref().to_path_buf());
        self
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Fail on an `@INCLUDE` that re-enters a file still being read. On by
    /// default; with the guard off such a cycle recurses without bound.
    pub fn include_guard(mut self, include_guard: bool) -> Self {
        self.include_guard = include_guard;
        self
    }

    pub fn workspace<W2: Workspace>(self, workspace: W2) -> DoxyfileLoader<W2> {
        DoxyfileLoader {
            path: self.path,
            base_dir: self.base_dir,
            environment: self.environment,
            include_guard: self.include_guard,
            workspace,
        }
    }

    pub fn start_file(&self) -> PathBuf {
        match &self.base_dir {
            Some(base) => base.join(&self.path),
            None => self.path.clone(),
        }
    }

    pub fn load(&self) -> Result<DoxyConfig, Error> {
        let start = self.start_file();
        tracing::info!("The Doxyfile path is '{}'.", start.display());

        let mut state = ParseState::default();
        self.load_file(&start, &mut state)?;
        Ok(state.config)
    }

    fn load_file(&self, path: &Path, state: &mut ParseState) -> Result<(), Error> {
        if self.include_guard && state.stack.iter().any(|open| open == path) {
            return Err(Error::IncludeResolution {
                reference: path.display().to_string(),
                from: state.stack.last().cloned().unwrap_or_default(),
            });
        }

        let text = self.workspace.read_to_string(path).map_err(|err| match err {
            Error::Io { path, source } => Error::config(format!(
                "cannot open Doxyfile '{}': {source}",
                path.display()
            )),
            other => other,
        })?;
        state.config.record_file_read();
        state.stack.push(path.to_path_buf());

        let expander = VariableExpander::new(&self.environment);
        for (idx, line) in text.lines().enumerate() {
            let Some(statement) = parse_statement(line, &expander) else {
                continue;
            };
            let line_num = idx as u32 + 1;

            match statement {
                Statement::IncludePath(dirs) => {
                    tracing::debug!(
                        "{}:{line_num}: include path extended with {dirs:?}",
                        path.display()
                    );
                    state.config.include_path_mut().extend(dirs);
                }
                Statement::Include(reference) => {
                    let included = self.resolve_include(&reference, path, &state.config)?;
                    tracing::debug!(
                        "{}:{line_num}: including '{}'",
                        path.display(),
                        included.display()
                    );
                    self.load_file(&included, state)?;
                }
                Statement::Assign { key, value, append } => {
                    if append && state.config.contains_key(&key) {
                        continue;
                    }
                    state.config.insert(Entry {
                        key,
                        value,
                        source: path.to_path_buf(),
                        line: line_num,
                    });
                }
            }
        }

        state.stack.pop();
        Ok(())
    }

    /// Locate an `@INCLUDE` target: absolute references are used as is; else
    /// each include-path directory is tried in order, then the including
    /// file's own directory.
    fn resolve_include(
        &self,
        reference: &str,
        current_file: &Path,
        config: &DoxyConfig,
    ) -> Result<PathBuf, Error> {
        let not_found = || Error::IncludeResolution {
            reference: reference.to_owned(),
            from: current_file.to_path_buf(),
        };

        if reference.is_empty() {
            return Err(not_found());
        }

        if is_absolute(reference) {
            let candidate = PathBuf::from(reference);
            return if self.workspace.exists(&candidate) {
                Ok(candidate)
            } else {
                Err(not_found())
            };
        }

        let parent = current_file.parent().unwrap_or_else(|| Path::new(""));
        for dir in config.include_path().iter() {
            let dir_path = if is_absolute(dir) {
                PathBuf::from(dir)
            } else {
                parent.join(dir)
            };
            if !self.workspace.is_dir(&dir_path) {
                continue;
            }
            let candidate = dir_path.join(reference);
            if self.workspace.exists(&candidate) {
                return Ok(candidate);
            }
        }

        let candidate = parent.join(reference);
        if self.workspace.exists(&candidate) {
            Ok(candidate)
        } else {
            Err(not_found())
        }
    }
}

#[derive(Debug, Default)]
struct ParseState {
    config: DoxyConfig,
    stack: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Statement {
    IncludePath(Vec<String>),
    Include(String),
    Assign {
        key: String,
        value: String,
        append: bool,
    },
}

/// Classify one physical line. Comments, lines without `=`, and lines with
/// nothing after the `=` yield `None`.
fn parse_statement(line: &str, expander: &VariableExpander<'_>) -> Option<Statement> {
    if line.trim_start().starts_with('#') {
        return None;
    }

    let (key, raw_value) = line.split_once('=')?;
    let key = key.trim();
    let raw_value = raw_value.trim();
    if key.is_empty() || raw_value.is_empty() {
        return None;
    }

    let mut values = split_values(&expander.expand(raw_value));

    if key.starts_with("@INCLUDE_PATH") {
        return Some(Statement::IncludePath(values));
    }
    if key.starts_with("@INCLUDE") {
        let reference = if values.is_empty() {
            String::new()
        } else {
            values.swap_remove(0)
        };
        return Some(Statement::Include(reference));
    }

    let (key, append) = match key.strip_suffix('+') {
        Some(head) => (head.trim_end(), true),
        None => (key, false),
    };
    let value = if values.is_empty() {
        String::new()
    } else {
        values.swap_remove(0)
    };

    Some(Statement::Assign {
        key: key.to_owned(),
        value,
        append,
    })
}

/// Split a value into space-separated tokens, keeping double-quoted runs
/// together. `\"` becomes `"`, and a lone `\` continuation marker is dropped.
pub fn split_values(input: &str) -> Vec<String> {
    let bytes = input.as_bytes();
    let mut values = Vec::new();
    let mut idx = 0usize;

    loop {
        while idx < bytes.len() && bytes[idx].is_ascii_whitespace() {
            idx += 1;
        }
        if idx >= bytes.len() {
            break;
        }

        let raw = match closing_quote(bytes, idx) {
            Some(end) => {
                let inner = &input[idx + 1..end];
                idx = end + 1;
                inner
            }
            None => {
                let start = idx;
                while idx < bytes.len() && !bytes[idx].is_ascii_whitespace() {
                    idx += 1;
                }
                &input[start..idx]
            }
        };

        if raw == "\\" {
            continue;
        }
        values.push(raw.replace("\\\"", "\""));
    }

    values
}

/// Index of the quote closing a quoted token opened at `start`, if `start`
/// opens one.
fn closing_quote(bytes: &[u8], start: usize) -> Option<usize> {
    if bytes[start] != b'"' {
        return None;
    }
    (start + 1..bytes.len())
        .find(|&idx| bytes[idx] == b'"' && !is_preceded_by_odd_backslashes(bytes, idx))
}

fn is_preceded_by_odd_backslashes(bytes: &[u8], idx: usize) -> bool {
    let mut cursor = idx;
    let mut backslash_count = 0usize;
    while cursor > 0 && bytes[cursor - 1] == b'\\' {
        cursor -= 1;
        backslash_count += 1;
    }

    backslash_count % 2 == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statement(line: &str) -> Option<Statement> {
        let env = Environment::memory().with_var("DOCS", "/srv/docs");
        parse_statement(line, &VariableExpander::new(&env))
    }

    fn assign(key: &str, value: &str) -> Option<Statement> {
        Some(Statement::Assign {
            key: key.to_owned(),
            value: value.to_owned(),
            append: false,
        })
    }

    #[test]
    fn splits_plain_and_quoted_tokens() {
        assert_eq!(split_values("a b  c"), vec!["a", "b", "c"]);
        assert_eq!(
            split_values("\"My Project\" other"),
            vec!["My Project", "other"]
        );
        assert_eq!(split_values("\"say \\\"hi\\\"\""), vec!["say \"hi\""]);
        assert_eq!(split_values("\"\""), vec![""]);
    }

    #[test]
    fn drops_continuation_marker() {
        assert_eq!(split_values("src \\"), vec!["src"]);
        assert_eq!(split_values("\\"), Vec::<String>::new());
        assert_eq!(split_values("a\\b"), vec!["a\\b"]);
    }

    #[test]
    fn unterminated_quote_is_a_bare_token() {
        assert_eq!(split_values("\"open ended"), vec!["\"open", "ended"]);
    }

    #[test]
    fn quoted_run_can_abut_a_bare_token() {
        assert_eq!(split_values("\"a b\"c"), vec!["a b", "c"]);
    }

    #[test]
    fn skips_comments_even_with_separator() {
        assert_eq!(statement("# OUTPUT_DIRECTORY = nope"), None);
        assert_eq!(statement("   #HTML_OUTPUT=nope"), None);
    }

    #[test]
    fn skips_lines_without_value() {
        assert_eq!(statement("PROJECT_NAME"), None);
        assert_eq!(statement("HTML_OUTPUT ="), None);
        assert_eq!(statement("HTML_OUTPUT =   "), None);
        assert_eq!(statement("= orphan"), None);
        assert_eq!(statement(""), None);
    }

    #[test]
    fn splits_on_first_separator_only() {
        assert_eq!(statement("ALIASES = a=b"), assign("ALIASES", "a=b"));
    }

    #[test]
    fn keeps_first_token_trimmed() {
        assert_eq!(statement("  INPUT   =   src include  "), assign("INPUT", "src"));
        assert_eq!(
            statement("PROJECT_NAME = \"My Project\""),
            assign("PROJECT_NAME", "My Project")
        );
        assert_eq!(statement("INPUT = \\"), assign("INPUT", ""));
    }

    #[test]
    fn recognizes_include_directives() {
        assert_eq!(
            statement("@INCLUDE_PATH = conf shared"),
            Some(Statement::IncludePath(vec![
                "conf".to_owned(),
                "shared".to_owned()
            ]))
        );
        assert_eq!(
            statement("@INCLUDE = common.cfg extra.cfg"),
            Some(Statement::Include("common.cfg".to_owned()))
        );
    }

    #[test]
    fn expands_variables_before_splitting() {
        assert_eq!(
            statement("OUTPUT_DIRECTORY = $(DOCS)/api"),
            assign("OUTPUT_DIRECTORY", "/srv/docs/api")
        );
        assert_eq!(
            statement("@INCLUDE = $( DOCS )/base.cfg"),
            Some(Statement::Include("/srv/docs/base.cfg".to_owned()))
        );
    }

    #[test]
    fn marks_append_assignments() {
        assert_eq!(
            statement("FILE_PATTERNS += *.hpp"),
            Some(Statement::Assign {
                key: "FILE_PATTERNS".to_owned(),
                value: "*.hpp".to_owned(),
                append: true,
            })
        );
    }
}
