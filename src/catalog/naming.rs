//! Slugs and display names
//!
//! Both functions are pure; the catalog relies on `slugify` being
//! deterministic and idempotent because slugs are unique keys in the store.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;
use url::Url;

const SEPARATOR: char = '-';

/// Derives a URL-safe slug from a display name
///
/// Letters are decomposed and their accents dropped, so the slug is plain
/// ASCII. The result is lowercased, every run of other characters becomes a
/// single `-`, and separators at either end are dropped.
///
/// # Example
///
/// ```
/// use catalog_ingest::slugify;
///
/// assert_eq!(slugify("Masina de tocat  -- 32 mm"), "masina-de-tocat-32-mm");
/// assert_eq!(slugify("Mașină De Tocat"), "masina-de-tocat");
/// assert_eq!(slugify(&slugify("Feliator (Inox)")), slugify("Feliator (Inox)"));
/// ```
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;

    for c in name.nfkd().filter(|c| !is_combining_mark(*c)) {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push(SEPARATOR);
            }
            pending_separator = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }

    slug
}

/// Derives a display name from the last path segment of a URL
///
/// `https://site/produse/masini-de-tocat/` becomes `Masini De Tocat`.
/// Input that does not parse as a URL is treated as a bare path.
pub fn display_name_from_url(url: &str) -> String {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.to_string(),
    };

    let segment = path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();

    title_case(&segment.replace('-', " "))
}

/// Uppercases the first letter of every word and lowercases the rest
///
/// A "word" starts at any letter not preceded by another letter, so
/// `3d printers` becomes `3D Printers`.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_is_letter = false;

    for c in text.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(c);
            previous_is_letter = false;
        }
    }

    out
}
