//! Heading slugs

/// Convert heading text to a URL-safe anchor
///
/// Lowercases, replaces every run of non-alphanumeric characters with a
/// single hyphen and trims hyphens from both ends.
///
/// ```
/// use odtmark_core::slug::slugify;
/// assert_eq!(slugify("1.2 Getting Started!"), "1-2-getting-started");
/// assert_eq!(slugify("  Ünïcode  & more "), "ünïcode-more");
/// ```
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Link text of a table-of-contents entry without its page number
///
/// Entries look like `Introduction\t3`; the tab and everything after it go.
pub fn strip_page_number(text: &str) -> &str {
    let text = match text.find('\t') {
        Some(idx) => &text[..idx],
        None => text,
    };
    text.trim_end()
}
