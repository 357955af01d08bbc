use std::collections::BTreeMap;

/// Variables available to `$(NAME)` expansion and to the Doxygen process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    kind: EnvironmentKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum EnvironmentKind {
    /// Read through to the current process environment on every lookup.
    Process,
    /// Look up in a fixed map supplied by the host build.
    Memory(BTreeMap<String, String>),
}

impl Default for Environment {
    fn default() -> Self {
        Self::memory()
    }
}

impl Environment {
    /// Read variables from the current process environment.
    pub fn process() -> Self {
        Self {
            kind: EnvironmentKind::Process,
        }
    }

    /// An empty in-memory environment.
    pub fn memory() -> Self {
        Self::from_memory(BTreeMap::new())
    }

    pub fn from_memory(map: BTreeMap<String, String>) -> Self {
        Self {
            kind: EnvironmentKind::Memory(map),
        }
    }

    /// Capture the process environment into an in-memory map.
    pub fn snapshot() -> Self {
        let map = std::env::vars_os()
            .map(|(key, value)| {
                (
                    key.to_string_lossy().into_owned(),
                    value.to_string_lossy().into_owned(),
                )
            })
            .collect();
        Self::from_memory(map)
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let EnvironmentKind::Process = self.kind {
            self = Self::snapshot();
        }
        if let EnvironmentKind::Memory(map) = &mut self.kind {
            map.insert(key.into(), value.into());
        }
        self
    }

    pub fn as_memory(&self) -> Option<&BTreeMap<String, String>> {
        match &self.kind {
            EnvironmentKind::Memory(map) => Some(map),
            EnvironmentKind::Process => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match &self.kind {
            EnvironmentKind::Process => {
                std::env::var_os(key).map(|value| value.to_string_lossy().into_owned())
            }
            EnvironmentKind::Memory(map) => map.get(key).cloned(),
        }
    }

    /// Variables to hand to a child process. `None` means inherit the parent's.
    pub(crate) fn child_vars(&self) -> Option<&BTreeMap<String, String>> {
        self.as_memory()
    }
}
