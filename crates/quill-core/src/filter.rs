//! Keyword filtering for listing queries.

use uuid::Uuid;

/// Filter applied to a listing: an optional free-text keyword matched as
/// a case-insensitive substring against the resource's designated field,
/// plus an optional owner restriction (posts of one user).
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub keyword: Option<String>,
    pub owner: Option<Uuid>,
}

impl ListFilter {
    pub fn by_keyword(keyword: Option<String>) -> Self {
        Self {
            keyword: keyword.filter(|k| !k.trim().is_empty()),
            owner: None,
        }
    }

    pub fn owned_by(mut self, owner: Uuid) -> Self {
        self.owner = Some(owner);
        self
    }

    /// The `LIKE` pattern for the keyword, or `None` when the filter
    /// matches everything. Lowercased; callers compare against the
    /// lowercased column with `ESCAPE '\'`.
    pub fn like_pattern(&self) -> Option<String> {
        self.keyword.as_deref().map(like_pattern)
    }
}

/// Build a `%keyword%` pattern with `\`, `%` and `_` escaped so user
/// input always matches literally.
pub fn like_pattern(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len() + 2);
    escaped.push('%');
    for ch in keyword.to_lowercase().chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_keyword_in_wildcards_and_lowercases() {
        assert_eq!(like_pattern("Rust"), "%rust%");
    }

    #[test]
    fn escapes_like_metacharacters() {
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn blank_keywords_match_everything() {
        assert!(ListFilter::by_keyword(None).like_pattern().is_none());
        assert!(
            ListFilter::by_keyword(Some("   ".into()))
                .like_pattern()
                .is_none()
        );
    }
}
