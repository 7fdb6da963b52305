// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Display metadata resolution for volume items.
//!
//! The platform-specific lookups (icon extraction, process image path,
//! indirect-string expansion) live behind [`MetadataResolver`]; this
//! module owns the fallback chains on top of them.

use crate::platform::AudioSession;
use std::sync::Arc;
use tracing::trace;

/// A resolved icon image, encoded bytes as handed back by the platform.
#[derive(Clone)]
pub struct Icon(pub Arc<Vec<u8>>);

impl std::fmt::Debug for Icon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Icon({} bytes)", self.0.len())
    }
}

/// Platform lookups the core delegates to. Pure from the core's viewpoint:
/// no shared state, absence is never an error.
pub trait MetadataResolver: Send + Sync {
    /// Load an icon from an icon path or an executable path.
    fn resolve_icon(&self, path: &str) -> Option<Icon>;
    /// Full image path of the process, when the OS will tell us.
    fn resolve_process_path(&self, pid: u32) -> Option<String>;
    /// Expand a platform indirect string (`@module,-id`) to display text.
    /// Implementations return the input unchanged on failure.
    fn resolve_indirect_string(&self, raw: &str) -> String;
}

/// Resolver that finds nothing. Items fall through to their synthesized
/// names and render without icons.
pub struct NullResolver;

impl MetadataResolver for NullResolver {
    fn resolve_icon(&self, _path: &str) -> Option<Icon> {
        None
    }

    fn resolve_process_path(&self, _pid: u32) -> Option<String> {
        None
    }

    fn resolve_indirect_string(&self, raw: &str) -> String {
        raw.to_string()
    }
}

/// Run `raw` through the resolver only when it uses indirect syntax.
fn expand_indirect(resolver: &dyn MetadataResolver, raw: &str) -> String {
    let raw = raw.trim();
    if raw.starts_with('@') {
        resolver.resolve_indirect_string(raw)
    } else {
        raw.to_string()
    }
}

/// Trim an icon path and strip the indirect-syntax `@` prefix, leaving a
/// plain file path for the resolver.
fn normalize_icon_path(raw: &str) -> String {
    let raw = raw.trim();
    raw.strip_prefix('@').unwrap_or(raw).to_string()
}

/// File name without extension, accepting both `/` and `\` separators
/// (session paths come from the platform, not from this host's rules).
pub(crate) fn file_stem(path: &str) -> Option<&str> {
    let name = path.rsplit(['/', '\\']).next()?;
    if name.is_empty() {
        return None;
    }
    match name.rfind('.') {
        Some(0) | None => Some(name),
        Some(dot) => Some(&name[..dot]),
    }
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.trim().is_empty())
}

/// Human-readable name for a session.
///
/// Fallback order: session display name, session identifier (both expanded
/// through indirect-string syntax), file stem of the process path, and
/// finally a synthesized `PID: n` label.
pub fn resolve_display_name(
    session: &dyn AudioSession,
    resolver: &dyn MetadataResolver,
    process_path: Option<&str>,
) -> String {
    if let Some(name) = non_blank(session.display_name()).or_else(|| non_blank(session.session_identifier())) {
        return expand_indirect(resolver, &name);
    }
    if let Some(stem) = process_path.and_then(file_stem) {
        return stem.to_string();
    }
    format!("PID: {}", session.process_id())
}

/// Icon for a session: the session-provided icon path first, the process
/// executable's own icon second, nothing third.
pub fn resolve_icon(
    session: &dyn AudioSession,
    resolver: &dyn MetadataResolver,
    process_path: Option<&str>,
) -> Option<Icon> {
    if let Some(icon_path) = non_blank(session.icon_path()) {
        trace!("resolving session icon from {:?}", icon_path);
        return resolver.resolve_icon(&normalize_icon_path(&icon_path));
    }
    let exe = process_path?;
    resolver.resolve_icon(exe)
}
