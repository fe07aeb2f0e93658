//! URL slugs for salary pages

use regex_lite::Regex;
use std::sync::OnceLock;

fn disallowed() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s-]").expect("valid slug pattern"))
}

fn separators() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\s_-]+").expect("valid separator pattern"))
}

/// Convert text to a URL-friendly slug
pub fn slugify(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let lowered = text.to_lowercase();
    let stripped = disallowed().replace_all(lowered.trim(), "");
    let joined = separators().replace_all(&stripped, "-");
    joined.trim_matches('-').to_string()
}

fn part_or<'a>(value: Option<&'a str>, fallback: &'a str) -> &'a str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => fallback,
    }
}

/// Build `/salaries/{company}/{designation}/{location}/{id}`.
///
/// The id is used verbatim.
pub fn salary_url(
    company: Option<&str>,
    designation: Option<&str>,
    location: Option<&str>,
    id: &str,
) -> String {
    format!(
        "/salaries/{}/{}/{}/{}",
        slugify(part_or(company, "company")),
        slugify(part_or(designation, "role")),
        slugify(part_or(location, "location")),
        id
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Google India!!"), "google-india");
        assert_eq!(slugify("  multiple   spaces "), "multiple-spaces");
        assert_eq!(slugify("snake_case--and - dashes"), "snake-case-and-dashes");
        assert_eq!(slugify("-Leading & trailing-"), "leading-trailing");
        assert_eq!(slugify("C++ / .NET"), "c-net");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_salary_url() {
        assert_eq!(
            salary_url(Some("Acme Corp"), Some("SWE II"), Some("Bengaluru"), "abc-123"),
            "/salaries/acme-corp/swe-ii/bengaluru/abc-123"
        );
    }

    #[test]
    fn test_salary_url_fallbacks() {
        assert_eq!(
            salary_url(None, Some(""), None, "0f8c"),
            "/salaries/company/role/location/0f8c"
        );
    }

    #[test]
    fn test_id_is_not_slugified() {
        assert_eq!(
            salary_url(Some("A"), Some("B"), Some("C"), "ID_With.Dots"),
            "/salaries/a/b/c/ID_With.Dots"
        );
    }
}
