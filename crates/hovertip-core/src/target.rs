#![forbid(unsafe_code)]

//! Registered tooltip targets and their tip text.

use ahash::AHashMap;

/// Opaque identifier for an element that carries a tip.
///
/// Hosts assign ids; the scheduler never interprets them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub u32);

impl TargetId {
    /// Raw id value.
    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for TargetId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "target#{}", self.0)
    }
}

/// Result of [`TargetRegistry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// The target was not known before.
    Added,
    /// The target was already registered; nothing changed.
    AlreadyRegistered,
}

/// Map from target id to tip text.
#[derive(Debug, Clone, Default)]
pub struct TargetRegistry {
    tips: AHashMap<TargetId, String>,
}

impl TargetRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `target` with its tip text.
    ///
    /// Registering an existing target is a no-op and keeps the original tip.
    /// Use [`set_tip`](Self::set_tip) to change the text.
    pub fn register(&mut self, target: TargetId, tip: impl Into<String>) -> Registration {
        if self.tips.contains_key(&target) {
            return Registration::AlreadyRegistered;
        }
        self.tips.insert(target, tip.into());
        Registration::Added
    }

    /// Remove `target`, returning its tip text if it was registered.
    pub fn unregister(&mut self, target: TargetId) -> Option<String> {
        self.tips.remove(&target)
    }

    /// Replace the tip text of a registered target.
    ///
    /// Returns `false` (and stores nothing) if the target is unknown.
    pub fn set_tip(&mut self, target: TargetId, tip: impl Into<String>) -> bool {
        match self.tips.get_mut(&target) {
            Some(slot) => {
                *slot = tip.into();
                true
            }
            None => false,
        }
    }

    /// Tip text for `target`.
    #[must_use]
    pub fn tip(&self, target: TargetId) -> Option<&str> {
        self.tips.get(&target).map(String::as_str)
    }

    /// Whether `target` is registered.
    #[must_use]
    pub fn contains(&self, target: TargetId) -> bool {
        self.tips.contains_key(&target)
    }

    /// Number of registered targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tips.len()
    }

    /// Whether no targets are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tips.is_empty()
    }
}
