//! Slug derivation for catalogue entities.
//!
//! Slugs are trimmed, non-empty identifiers composed of lowercase ASCII
//! letters, digits, and single hyphens, capped at [`SLUG_MAX`] characters.

/// Maximum slug length stored alongside catalogue entities.
pub const SLUG_MAX: usize = 64;

/// Return `true` when `value` is a valid slug.
pub fn is_valid_slug(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= SLUG_MAX
        && !value.starts_with('-')
        && !value.ends_with('-')
        && !value.contains("--")
        && value
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
}

/// Derive a slug from free text.
///
/// Non-alphanumeric runs collapse to a single hyphen. Text with no ASCII
/// alphanumerics yields `"n-a"` so callers always receive a valid slug.
///
/// # Examples
/// ```
/// use lending_backend::domain::slugify;
///
/// assert_eq!(slugify("The Rust Book, 2nd ed."), "the-rust-book-2nd-ed");
/// ```
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len().min(SLUG_MAX));
    let mut pending_hyphen = false;
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
        if slug.len() >= SLUG_MAX {
            break;
        }
    }
    slug.truncate(SLUG_MAX);
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        return "n-a".to_owned();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Fantasy", "fantasy")]
    #[case("  Science   Fiction ", "science-fiction")]
    #[case("C++ & Rust!", "c-rust")]
    #[case("Łódź", "d")]
    #[case("???", "n-a")]
    fn derives_slugs(#[case] input: &str, #[case] expected: &str) {
        let slug = slugify(input);
        assert_eq!(slug, expected);
        assert!(is_valid_slug(&slug));
    }

    #[rstest]
    fn caps_length() {
        let slug = slugify(&"word ".repeat(40));
        assert!(slug.len() <= SLUG_MAX);
        assert!(is_valid_slug(&slug));
    }

    #[rstest]
    #[case("", false)]
    #[case("-lead", false)]
    #[case("trail-", false)]
    #[case("double--hyphen", false)]
    #[case("Upper", false)]
    #[case("ok-slug-2", true)]
    fn validates_slugs(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(is_valid_slug(input), expected);
    }
}
