//! Property-based tests for output trimming

use proptest::prelude::*;
use shellcall::OutputTrimming;

proptest! {
    #[test]
    fn test_whitespace_matches_str_trim(text in "\\PC{0,100}", pad in "[ \\t\\n\\r]{0,6}") {
        let padded = format!("{}{}{}", pad, text, pad);
        prop_assert_eq!(OutputTrimming::Whitespace.trim(&padded), padded.trim());
    }

    #[test]
    fn test_none_is_identity(text in "\\PC{0,100}") {
        prop_assert_eq!(OutputTrimming::None.trim(&text), text.as_str());
    }

    #[test]
    fn test_character_set_only_strips_members(text in "[a-z#\\n]{0,60}") {
        let trimming = OutputTrimming::from_setting("#\n");
        let trimmed = trimming.trim(&text);

        prop_assert!(!trimmed.starts_with(['#', '\n']));
        prop_assert!(!trimmed.ends_with(['#', '\n']));
        prop_assert!(text.contains(trimmed));
    }

    #[test]
    fn test_trimming_is_idempotent(text in "\\PC{0,100}") {
        let once = OutputTrimming::Whitespace.trim(&text);
        prop_assert_eq!(OutputTrimming::Whitespace.trim(once), once);
    }
}
