//! Request matching primitives.
//!
//! # Responsibilities
//! - Match the request path against a compiled pattern
//! - Restrict a rule to a set of HTTP methods
//! - Combine conditions with AND semantics
//!
//! # Design Decisions
//! - Path patterns are case-insensitive unless a rule opts out
//! - Patterns are compiled once when the table is built
//! - Empty method list = any method

use axum::http::Method;
use regex::{Regex, RegexBuilder};

use crate::routing::category::RouteCategory;

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, method: &Method, path: &str) -> bool;
}

/// Whether a path pattern ignores letter casing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseMode {
    Insensitive,
    Sensitive,
}

/// Matches the request path against a regular expression.
#[derive(Debug, Clone)]
pub struct PathPatternMatcher {
    regex: Regex,
}

impl PathPatternMatcher {
    /// Compile a path pattern.
    pub fn new(pattern: &str, case: CaseMode) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(case == CaseMode::Insensitive)
            .build()?;
        Ok(Self { regex })
    }
}

impl Matcher for PathPatternMatcher {
    fn matches(&self, _method: &Method, path: &str) -> bool {
        self.regex.is_match(path)
    }
}

/// Matches the request method.
#[derive(Debug, Clone)]
pub struct MethodMatcher {
    methods: Vec<Method>,
}

impl MethodMatcher {
    pub fn new(methods: Vec<Method>) -> Self {
        Self { methods }
    }
}

impl Matcher for MethodMatcher {
    fn matches(&self, method: &Method, _path: &str) -> bool {
        self.methods.is_empty() || self.methods.contains(method)
    }
}

/// Combines multiple matchers with AND semantics.
#[derive(Debug)]
pub struct AndMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AndMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }
}

impl Matcher for AndMatcher {
    fn matches(&self, method: &Method, path: &str) -> bool {
        self.matchers.iter().all(|m| m.matches(method, path))
    }
}

/// A category paired with the condition that selects it.
#[derive(Debug)]
pub struct PatternRule {
    category: RouteCategory,
    pattern: String,
    matcher: Box<dyn Matcher>,
}

impl PatternRule {
    /// Rule matching `pattern` for any method.
    pub fn new(
        category: RouteCategory,
        pattern: &str,
        case: CaseMode,
    ) -> Result<Self, regex::Error> {
        let path = PathPatternMatcher::new(pattern, case)?;
        Ok(Self {
            category,
            pattern: pattern.to_string(),
            matcher: Box::new(path),
        })
    }

    /// Rule matching `pattern` only for the listed methods.
    pub fn with_methods(
        category: RouteCategory,
        pattern: &str,
        case: CaseMode,
        methods: Vec<Method>,
    ) -> Result<Self, regex::Error> {
        let path = PathPatternMatcher::new(pattern, case)?;
        Ok(Self {
            category,
            pattern: pattern.to_string(),
            matcher: Box::new(AndMatcher::new(vec![
                Box::new(MethodMatcher::new(methods)),
                Box::new(path),
            ])),
        })
    }

    pub fn category(&self) -> RouteCategory {
        self.category
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn matches(&self, method: &Method, path: &str) -> bool {
        self.matcher.matches(method, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_matcher_case_modes() {
        let insensitive = PathPatternMatcher::new(r"^/web/index.html$", CaseMode::Insensitive).unwrap();
        assert!(insensitive.matches(&Method::GET, "/WEB/index.HTML"));

        let sensitive = PathPatternMatcher::new(r"^/web/index.html$", CaseMode::Sensitive).unwrap();
        assert!(sensitive.matches(&Method::GET, "/web/index.html"));
        assert!(!sensitive.matches(&Method::GET, "/WEB/index.html"));
    }

    #[test]
    fn test_method_matcher() {
        let any = MethodMatcher::new(vec![]);
        assert!(any.matches(&Method::DELETE, "/"));

        let get_only = MethodMatcher::new(vec![Method::GET]);
        assert!(get_only.matches(&Method::GET, "/"));
        assert!(!get_only.matches(&Method::POST, "/"));
    }

    #[test]
    fn test_rule_with_methods() {
        let rule = PatternRule::with_methods(
            RouteCategory::ImageCache,
            r"^/Items/\d+/Images(/.*)?$",
            CaseMode::Insensitive,
            vec![Method::GET],
        )
        .unwrap();

        assert!(rule.matches(&Method::GET, "/items/6/images/primary"));
        assert!(!rule.matches(&Method::POST, "/Items/6/Images/Primary"));
        assert_eq!(rule.category(), RouteCategory::ImageCache);
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(PatternRule::new(RouteCategory::WebAsset, "([", CaseMode::Sensitive).is_err());
    }
}
