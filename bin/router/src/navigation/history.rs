use parking_lot::Mutex;

/// Extra data attached to a history entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    /// Path the user asked for before being sent to the login page.
    pub from: Option<String>,
}

impl NavigationState {
    pub fn from_path(path: impl Into<String>) -> Self {
        Self {
            from: Some(path.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub state: NavigationState,
}

impl Location {
    fn new(path: impl Into<String>, state: NavigationState) -> Self {
        Self {
            path: path.into(),
            state,
        }
    }
}

pub trait History: Send + Sync {
    fn current(&self) -> Location;
    /// Adds a new entry, dropping everything after the current one.
    fn push(&self, path: &str);
    /// Overwrites the current entry.
    fn replace(&self, path: &str, state: NavigationState);
}

struct Entries {
    stack: Vec<Location>,
    index: usize,
}

/// History kept in memory, starting at `/`.
pub struct MemoryHistory {
    entries: Mutex<Entries>,
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("/")
    }
}

impl MemoryHistory {
    pub fn new(initial_path: &str) -> Self {
        Self {
            entries: Mutex::new(Entries {
                stack: vec![Location::new(initial_path, NavigationState::default())],
                index: 0,
            }),
        }
    }

    /// Moves one entry back. Returns `false` when already at the first entry.
    pub fn back(&self) -> bool {
        let mut entries = self.entries.lock();
        if entries.index == 0 {
            return false;
        }
        entries.index -= 1;
        true
    }

    pub fn len(&self) -> usize {
        self.entries.lock().stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn paths(&self) -> Vec<String> {
        self.entries
            .lock()
            .stack
            .iter()
            .map(|location| location.path.clone())
            .collect()
    }
}

impl History for MemoryHistory {
    fn current(&self) -> Location {
        let entries = self.entries.lock();
        entries.stack[entries.index].clone()
    }

    fn push(&self, path: &str) {
        let mut entries = self.entries.lock();
        let next = entries.index + 1;
        entries.stack.truncate(next);
        entries
            .stack
            .push(Location::new(path, NavigationState::default()));
        entries.index = next;
    }

    fn replace(&self, path: &str, state: NavigationState) {
        let mut entries = self.entries.lock();
        let index = entries.index;
        entries.stack[index] = Location::new(path, state);
    }
}
