//! Post-processing hooks applied to resolved STRM targets.
//!
//! A hook is a pure string transform. Hooks are registered per [`StrmKind`] and
//! injected into the resolver, so tests can swap in deterministic transforms.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::strm::rules::StrmKind;

/// Request details a hook may use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookContext {
    pub kind: StrmKind,
    pub item_id: String,
    pub user_agent: Option<String>,
}

/// `(content, context) -> content`.
pub type ContentHook = Arc<dyn Fn(&str, &HookContext) -> String + Send + Sync>;

/// Hooks keyed by STRM kind.
#[derive(Clone, Default)]
pub struct HookSet {
    hooks: HashMap<StrmKind, ContentHook>,
}

impl HookSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the hook for `kind`.
    pub fn with_hook<F>(mut self, kind: StrmKind, hook: F) -> Self
    where
        F: Fn(&str, &HookContext) -> String + Send + Sync + 'static,
    {
        self.hooks.insert(kind, Arc::new(hook));
        self
    }

    pub fn get(&self, kind: StrmKind) -> Option<&ContentHook> {
        self.hooks.get(&kind)
    }

    /// Run the hook for `ctx.kind`. Returns `None` when no hook is registered.
    pub fn apply(&self, content: &str, ctx: &HookContext) -> Option<String> {
        self.get(ctx.kind).map(|hook| hook(content, ctx))
    }
}

impl fmt::Debug for HookSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookSet")
            .field("kinds", &self.hooks.keys().collect::<Vec<_>>())
            .finish()
    }
}
