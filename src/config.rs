use crate::path::WINDOWS_MAX_PATH;

/// Length threshold that decides, per operation, whether the conventional
/// API or the extended-length native path is used. Constructed once and
/// immutable; there is no global switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathPolicy {
    max_path: usize,
}

impl PathPolicy {
    pub fn new(max_path: usize) -> Self {
        Self { max_path }
    }

    /// Route every operation through the extended path, regardless of length.
    pub fn always_extended() -> Self {
        Self { max_path: 0 }
    }

    pub fn max_path(&self) -> usize {
        self.max_path
    }

    /// True when `path` must take the extended-length route. Length is
    /// measured in UTF-16 code units, matching how Win32 counts MAX_PATH.
    pub fn uses_extended(&self, path: &str) -> bool {
        path.encode_utf16().count() >= self.max_path
    }
}

impl Default for PathPolicy {
    fn default() -> Self {
        Self {
            max_path: WINDOWS_MAX_PATH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_below_threshold_uses_conventional() {
        let policy = PathPolicy::new(10);
        let path = "a".repeat(9);
        assert!(!policy.uses_extended(&path));
    }

    #[test]
    fn test_at_threshold_uses_extended() {
        let policy = PathPolicy::new(10);
        assert!(policy.uses_extended(&"a".repeat(10)));
        assert!(policy.uses_extended(&"a".repeat(11)));
    }

    #[test]
    fn test_always_extended_catches_everything() {
        let policy = PathPolicy::always_extended();
        assert!(policy.uses_extended("a"));
        assert!(policy.uses_extended(""));
    }

    #[test]
    fn test_length_counts_utf16_units() {
        let policy = PathPolicy::new(4);
        // Three chars, but the emoji is a surrogate pair: 4 UTF-16 units.
        assert!(policy.uses_extended("ab😀"));
        assert!(!policy.uses_extended("abc"));
    }
}
