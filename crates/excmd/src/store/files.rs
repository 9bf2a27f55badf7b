use std::collections::VecDeque;

/// How many alternate file names are remembered.
pub const MAX_ALTERNATES: usize = 20;

/// A previously edited file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AltFile {
    /// The file's name, as it was given.
    pub path: String,

    /// Line to put the cursor on when returning to the file.
    pub line: usize,
}

/// The current file name, and the list of alternate file names used by `#`.
#[derive(Clone, Debug, Default)]
pub struct FileRegistry {
    current: Option<String>,
    alternates: VecDeque<AltFile>,
}

impl FileRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        FileRegistry::default()
    }

    /// The name of the file being edited.
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Change the name of the file being edited.
    pub fn set_current(&mut self, path: Option<String>) {
        self.current = path;
    }

    /// Whether `path` names some file other than the current one.
    pub fn is_other(&self, path: &str) -> bool {
        self.current.as_deref() != Some(path)
    }

    /// The `n`th most recent alternate file, starting from 0.
    pub fn alternate(&self, n: usize) -> Option<&AltFile> {
        self.alternates.get(n)
    }

    /// Iterate over the alternate files, most recent first.
    pub fn alternates(&self) -> impl Iterator<Item = &AltFile> {
        self.alternates.iter()
    }

    /// Make `path` the most recent alternate file, forgetting the oldest one if the list is
    /// full.
    pub fn push_alternate(&mut self, path: String, line: usize) {
        if self.alternates.len() >= MAX_ALTERNATES {
            let _ = self.alternates.pop_back();
        }

        self.alternates.push_front(AltFile { path, line });
    }
}
