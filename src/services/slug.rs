use lazy_static::lazy_static;
use regex::Regex;

const MAX_SLUG_CHARS: usize = 100;

lazy_static! {
    static ref SEPARATORS: Regex = Regex::new(r"[\s/:：]+").unwrap();
    /// Keeps CJK ideographs, lowercase latin, digits and dashes
    static ref DISALLOWED: Regex = Regex::new(r"[^\u{4e00}-\u{9fa5}a-z0-9-]").unwrap();
    static ref DASH_RUNS: Regex = Regex::new(r"-+").unwrap();
    static ref TRAILING_SEGMENT: Regex = Regex::new(r"-[^-]*$").unwrap();
}

/// URL-friendly slug of a title
///
/// Falls back to the id (or `movie`) when the title leaves fewer than two
/// characters.
pub fn generate_slug(title: &str, id: Option<i64>) -> String {
    let fallback = || id.map(|i| i.to_string()).unwrap_or_else(|| "movie".to_string());

    let lower = title.trim().to_lowercase();
    let slug = SEPARATORS.replace_all(&lower, "-");
    let slug = DISALLOWED.replace_all(&slug, "");
    let slug = DASH_RUNS.replace_all(&slug, "-");
    let slug = slug.trim_matches('-');

    if slug.chars().count() < 2 {
        return fallback();
    }

    if slug.chars().count() > MAX_SLUG_CHARS {
        let cut: String = slug.chars().take(MAX_SLUG_CHARS).collect();
        return TRAILING_SEGMENT.replace(&cut, "").to_string();
    }

    slug.to_string()
}

/// Detail page path: `/movie/{id}/{slug}`
pub fn movie_url(id: i64, title: &str) -> String {
    format!("/movie/{}/{}", id, generate_slug(title, Some(id)))
}

/// Leading integer of a path parameter (`"42-some-title"` → 42)
pub fn extract_movie_id(param: &str) -> Option<i64> {
    let trimmed = param.trim_start();
    let digits_start = usize::from(trimmed.starts_with(['-', '+']));
    let digits_end = trimmed[digits_start..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(trimmed.len(), |i| i + digits_start);

    trimmed[..digits_end].parse().ok()
}
