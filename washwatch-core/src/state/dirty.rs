//! Change tracking
//!
//! A dirty flag is set by any externally observable mutation and cleared by
//! the next [`Dirty::take_changed`]. Reading is destructive: two reads in a
//! row with no mutation in between return `true` then `false`.

/// Read-and-clear change tracking
pub trait Dirty {
    /// Record an observable change
    fn mark(&mut self);

    /// Return whether anything changed since the last call, and reset
    fn take_changed(&mut self) -> bool;
}

/// Plain dirty flag, composed into each stateful component
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DirtyFlag(bool);

impl DirtyFlag {
    /// Create a clean flag
    pub const fn new() -> Self {
        Self(false)
    }

    /// Peek without clearing
    pub fn is_set(&self) -> bool {
        self.0
    }
}

impl Dirty for DirtyFlag {
    fn mark(&mut self) {
        self.0 = true;
    }

    fn take_changed(&mut self) -> bool {
        core::mem::take(&mut self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_clean() {
        let mut flag = DirtyFlag::new();
        assert!(!flag.is_set());
        assert!(!flag.take_changed());
    }

    #[test]
    fn test_read_clears() {
        let mut flag = DirtyFlag::new();
        flag.mark();
        assert!(flag.is_set());
        assert!(flag.take_changed());
        assert!(!flag.take_changed());
    }

    #[test]
    fn test_repeated_marks_collapse() {
        let mut flag = DirtyFlag::new();
        flag.mark();
        flag.mark();
        assert!(flag.take_changed());
        assert!(!flag.is_set());
    }
}
