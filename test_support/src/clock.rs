//! A timestamp source driven by a table instead of the filesystem.

use std::collections::HashMap;

use mymake::timestamps::Timestamps;

/// Modification times keyed by name; unknown names are missing (`0`).
#[derive(Debug, Clone, Default)]
pub struct ScriptedClock {
    times: HashMap<String, u64>,
}

impl ScriptedClock {
    /// Create a clock where every name is missing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`ScriptedClock::set`].
    ///
    /// ```
    /// use mymake::timestamps::Timestamps;
    /// use test_support::ScriptedClock;
    ///
    /// let clock = ScriptedClock::new().with("a.c", 7);
    /// assert_eq!(clock.last_modification("a.c"), 7);
    /// assert_eq!(clock.last_modification("b.c"), 0);
    /// ```
    #[must_use]
    pub fn with(mut self, name: &str, time: u64) -> Self {
        self.set(name, time);
        self
    }

    /// Record `time` as the modification time of `name`.
    pub fn set(&mut self, name: &str, time: u64) {
        self.times.insert(name.to_owned(), time);
    }

    /// Forget `name`, making it missing again.
    pub fn remove(&mut self, name: &str) {
        self.times.remove(name);
    }
}

impl Timestamps for ScriptedClock {
    fn last_modification(&self, name: &str) -> u64 {
        self.times.get(name).copied().unwrap_or(0)
    }
}
