//! STRM prefix rules.

use serde::{Deserialize, Serialize};

use crate::config::StrmConfig;

/// How the target of a pointer file should be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrmKind {
    /// Target is a plain http(s) URL.
    HttpStrm,
    /// Target is a path on an Alist instance.
    AlistStrm,
}

impl StrmKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrmKind::HttpStrm => "http_strm",
            StrmKind::AlistStrm => "alist_strm",
        }
    }
}

/// A configured prefix and the kind it marks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrmPrefixRule {
    pub prefix: String,
    pub kind: StrmKind,
    pub enabled: bool,
}

/// Ordered prefix rules plus the pointer-file extension they require.
#[derive(Debug, Clone)]
pub struct StrmRuleSet {
    extension: String,
    rules: Vec<StrmPrefixRule>,
}

impl StrmRuleSet {
    pub fn new(extension: impl Into<String>, rules: Vec<StrmPrefixRule>) -> Self {
        Self {
            extension: extension.into().to_ascii_lowercase(),
            rules,
        }
    }

    pub fn from_config(config: &StrmConfig) -> Self {
        let rules = config
            .rules
            .iter()
            .map(|r| StrmPrefixRule {
                prefix: r.prefix.clone(),
                kind: r.kind,
                enabled: r.enabled,
            })
            .collect();
        Self::new(config.extension.clone(), rules)
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn rules(&self) -> &[StrmPrefixRule] {
        &self.rules
    }

    /// First enabled rule, in declared order, whose prefix starts `path`.
    /// `path` must also end with the pointer-file extension (any casing).
    pub fn match_path(&self, path: &str) -> Option<&StrmPrefixRule> {
        if !path.to_ascii_lowercase().ends_with(&self.extension) {
            return None;
        }
        self.rules
            .iter()
            .filter(|rule| rule.enabled)
            .find(|rule| path.starts_with(&rule.prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(prefix: &str, kind: StrmKind, enabled: bool) -> StrmPrefixRule {
        StrmPrefixRule {
            prefix: prefix.to_string(),
            kind,
            enabled,
        }
    }

    #[test]
    fn test_prefix_and_extension_required() {
        let set = StrmRuleSet::new(".strm", vec![rule("/strm/http/", StrmKind::HttpStrm, true)]);

        assert_eq!(
            set.match_path("/strm/http/movie.strm").map(|r| r.kind),
            Some(StrmKind::HttpStrm)
        );
        assert!(set.match_path("/strm/http/movie.STRM").is_some());
        assert!(set.match_path("/strm/http/movie.mkv").is_none());
        assert!(set.match_path("/video/movie.strm").is_none());
    }

    #[test]
    fn test_disabled_rules_are_skipped() {
        let set = StrmRuleSet::new(
            ".strm",
            vec![
                rule("/strm/other/", StrmKind::AlistStrm, false),
                rule("/strm/http/", StrmKind::HttpStrm, true),
            ],
        );
        assert!(set.match_path("/strm/other/movie.strm").is_none());
        assert!(set.match_path("/strm/http/movie.strm").is_some());
    }

    #[test]
    fn test_first_enabled_rule_wins() {
        let set = StrmRuleSet::new(
            ".strm",
            vec![
                rule("/strm/", StrmKind::AlistStrm, true),
                rule("/strm/http/", StrmKind::HttpStrm, true),
            ],
        );
        assert_eq!(
            set.match_path("/strm/http/movie.strm").map(|r| r.kind),
            Some(StrmKind::AlistStrm)
        );
    }
}
