/// Composite catalog ids are `{addon id}{COMPOSITE_SEPARATOR}{inner catalog id}`.
///
/// Either half may itself contain the separator, so ids are never split on it.
/// Decoding goes through [`candidate_fragment`] against a known addon id instead.
pub const COMPOSITE_SEPARATOR: char = '-';

pub fn composite_catalog_id(addon_id: &str, inner_id: &str) -> String {
    format!("{}{}{}", addon_id, COMPOSITE_SEPARATOR, inner_id)
}

/// The inner-id part of `composite_id` if it was built from `addon_id`.
///
/// Returns `None` unless `composite_id` starts with `addon_id` immediately
/// followed by the separator.
pub fn candidate_fragment<'a>(composite_id: &'a str, addon_id: &str) -> Option<&'a str> {
    composite_id
        .strip_prefix(addon_id)?
        .strip_prefix(COMPOSITE_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_catalog_id() {
        assert_eq!(composite_catalog_id("com.alpha", "top"), "com.alpha-top");
        assert_eq!(composite_catalog_id("my-addon", "top-rated"), "my-addon-top-rated");
    }

    #[test]
    fn test_candidate_fragment_with_hyphens() {
        let id = composite_catalog_id("my-addon", "top-rated");
        assert_eq!(candidate_fragment(&id, "my-addon"), Some("top-rated"));
        assert_eq!(candidate_fragment(&id, "my"), Some("addon-top-rated"));
    }

    #[test]
    fn test_candidate_fragment_requires_separator() {
        assert_eq!(candidate_fragment("com.alphatop", "com.alpha"), None);
        assert_eq!(candidate_fragment("com.alpha", "com.alpha"), None);
        assert_eq!(candidate_fragment("com.beta-top", "com.alpha"), None);
        assert_eq!(candidate_fragment("com.alpha-", "com.alpha"), Some(""));
    }
}
