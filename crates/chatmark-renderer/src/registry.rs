//! Ordered, named rule tables.
//!
//! Rules are registered under a unique name at a position given by an
//! [`Anchor`]. Anchors are resolved when the rule is added, so the table
//! always holds a fixed evaluation order. Once configuration is done the
//! table is frozen with [`OrderedRegistry::into_items`].

use crate::error::ConfigError;

/// Insertion position relative to the current table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anchor {
    /// Before every existing rule.
    Start,
    /// After every existing rule.
    End,
    /// Immediately before the named rule.
    Before(String),
    /// Immediately after the named rule.
    After(String),
}

impl Anchor {
    /// Anchor immediately before `name`.
    pub fn before(name: impl Into<String>) -> Self {
        Self::Before(name.into())
    }

    /// Anchor immediately after `name`.
    pub fn after(name: impl Into<String>) -> Self {
        Self::After(name.into())
    }
}

/// Named items kept in evaluation order.
pub struct OrderedRegistry<T> {
    kind: &'static str,
    entries: Vec<(String, T)>,
}

impl<T> OrderedRegistry<T> {
    /// Create an empty table. `kind` labels errors (`"block"`, `"inline"`).
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    /// Insert `item` under `name` at `anchor`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::DuplicateRule`] if `name` is taken,
    /// [`ConfigError::UnknownAnchor`] if the anchor names a missing rule.
    pub fn add(&mut self, name: &str, item: T, anchor: &Anchor) -> Result<(), ConfigError> {
        if self.position(name).is_some() {
            return Err(ConfigError::DuplicateRule {
                kind: self.kind,
                name: name.to_owned(),
            });
        }

        let index = match anchor {
            Anchor::Start => 0,
            Anchor::End => self.entries.len(),
            Anchor::Before(target) => self.anchor_position(name, target)?,
            Anchor::After(target) => self.anchor_position(name, target)? + 1,
        };
        self.entries.insert(index, (name.to_owned(), item));
        Ok(())
    }

    /// Remove and return the rule registered under `name`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnknownRule`] if no such rule exists.
    pub fn remove(&mut self, name: &str) -> Result<T, ConfigError> {
        let index = self.position(name).ok_or_else(|| ConfigError::UnknownRule {
            kind: self.kind,
            name: name.to_owned(),
        })?;
        Ok(self.entries.remove(index).1)
    }

    /// Whether a rule named `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Rule names in evaluation order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Number of registered rules.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Freeze the table into its evaluation order.
    pub fn into_items(self) -> Vec<(String, T)> {
        self.entries
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(n, _)| n == name)
    }

    fn anchor_position(&self, name: &str, target: &str) -> Result<usize, ConfigError> {
        self.position(target)
            .ok_or_else(|| ConfigError::UnknownAnchor {
                kind: self.kind,
                name: name.to_owned(),
                anchor: target.to_owned(),
            })
    }
}
