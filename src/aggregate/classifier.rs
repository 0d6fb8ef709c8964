//! Directive line classifier
//!
//! Turns one decoded robots.txt line into a typed directive observation, or
//! rejects it. Rejection is silent: unrecognized keys and malformed lines are
//! expected noise in captured payloads.

/// One classified robots.txt line
///
/// `Allow` and `Disallow` carry no path: only the occurrence of the directive
/// is counted, never its content. `UserAgent` carries the remainder of the
/// line after the first `:`, unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    UserAgent(String),
    Allow,
    Disallow,
}

/// Classifies a single line of robots.txt text
///
/// # Arguments
///
/// * `line` - One line split from a decoded response payload
///
/// # Returns
///
/// * `Some(Directive)` - The line carried a recognized directive key
/// * `None` - Empty line, no `:` separator, or unrecognized key
///
/// # Examples
///
/// ```
/// use crawlstats::aggregate::{classify_line, Directive};
///
/// assert_eq!(classify_line("Disallow:/private"), Some(Directive::Disallow));
/// assert_eq!(classify_line("User-agent: *"), Some(Directive::UserAgent(" *".to_string())));
/// assert_eq!(classify_line("Sitemap:/s.xml"), None);
/// ```
pub fn classify_line(line: &str) -> Option<Directive> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (key, value) = trimmed.split_once(':')?;

    // Keys match the directive labels case-sensitively; anything else
    // (Sitemap, Crawl-delay, comments, lowercase variants) is dropped.
    match key {
        "User-agent" => Some(Directive::UserAgent(value.to_string())),
        "Allow" => Some(Directive::Allow),
        "Disallow" => Some(Directive::Disallow),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disallow_ignores_path() {
        assert_eq!(classify_line("Disallow:/private"), Some(Directive::Disallow));
        assert_eq!(classify_line("Disallow:/a"), Some(Directive::Disallow));
        assert_eq!(classify_line("Disallow:/b"), Some(Directive::Disallow));
        assert_eq!(classify_line("Disallow:"), Some(Directive::Disallow));
    }

    #[test]
    fn test_allow_ignores_path() {
        assert_eq!(classify_line("Allow:/"), Some(Directive::Allow));
        assert_eq!(classify_line("Allow:/public/index.html"), Some(Directive::Allow));
    }

    #[test]
    fn test_user_agent_value_unchanged() {
        assert_eq!(
            classify_line("User-agent: *"),
            Some(Directive::UserAgent(" *".to_string()))
        );
        assert_eq!(
            classify_line("User-agent:Googlebot"),
            Some(Directive::UserAgent("Googlebot".to_string()))
        );
        // Only the first colon splits; the rest of the value survives intact.
        assert_eq!(
            classify_line("User-agent: bot:v2"),
            Some(Directive::UserAgent(" bot:v2".to_string()))
        );
    }

    #[test]
    fn test_surrounding_whitespace_trimmed() {
        assert_eq!(classify_line("  Disallow:/x  "), Some(Directive::Disallow));
        assert_eq!(classify_line("\tAllow:/y"), Some(Directive::Allow));
    }

    #[test]
    fn test_rejects_empty_line() {
        assert_eq!(classify_line(""), None);
        assert_eq!(classify_line("   "), None);
    }

    #[test]
    fn test_rejects_line_without_colon() {
        assert_eq!(classify_line("Disallow /private"), None);
        assert_eq!(classify_line("some random text"), None);
    }

    #[test]
    fn test_rejects_unrecognized_key() {
        assert_eq!(classify_line("Sitemap:/s.xml"), None);
        assert_eq!(classify_line("Crawl-delay: 10"), None);
        assert_eq!(classify_line("# Disallow:/commented"), None);
    }

    #[test]
    fn test_rejects_case_mismatch() {
        assert_eq!(classify_line("disallow:/x"), None);
        assert_eq!(classify_line("USER-AGENT: *"), None);
    }
}
