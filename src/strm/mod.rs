//! STRM pointer-file handling.
//!
//! # Data Flow
//! ```text
//! MediaItem.path
//!     → rules.rs (enabled prefix rule + extension check)
//!     → StrmKind of the matched rule
//!
//! Selected MediaSource.path
//!     → hooks.rs (transform registered for the kind)
//!     → alist.rs (signing transform for Alist targets)
//!     → redirect target
//! ```

pub mod alist;
pub mod hooks;
pub mod rules;

pub use alist::AlistSigner;
pub use hooks::{ContentHook, HookContext, HookSet};
pub use rules::{StrmKind, StrmPrefixRule, StrmRuleSet};

use crate::config::GatewayConfig;

/// Built-in hooks for a configuration: Alist signing when `[alist]` is present.
pub fn default_hooks(config: &GatewayConfig) -> Result<HookSet, url::ParseError> {
    let mut hooks = HookSet::new();
    if let Some(alist) = &config.alist {
        let signer = AlistSigner::from_config(alist)?;
        hooks = hooks.with_hook(StrmKind::AlistStrm, move |content, ctx| {
            signer.transform(content, ctx)
        });
    }
    Ok(hooks)
}
