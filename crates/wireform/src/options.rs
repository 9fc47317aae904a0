//! Per-call behavior flags.

use bitflags::bitflags;

bitflags! {
    /// Composable decode/encode options. Each flag is independent; a set is
    /// immutable for the duration of one call.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Options: u8 {
        /// Indent output with two spaces per nesting level.
        const PRETTY = 1 << 0;
        /// Omit fields whose value equals the type's default on write.
        const NON_DEFAULT = 1 << 1;
        /// Parse and discard unknown properties on read instead of failing.
        const IGNORE_UNKNOWN_PROPERTIES = 1 << 2;
        /// Re-parse a scalar literal that is itself a document when the
        /// target is not a string.
        const UNWRAP_STRINGS = 1 << 3;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_compose() {
        let opts = Options::PRETTY | Options::NON_DEFAULT;
        assert!(opts.contains(Options::PRETTY));
        assert!(!opts.contains(Options::UNWRAP_STRINGS));
        assert_eq!(Options::default(), Options::empty());
    }
}
