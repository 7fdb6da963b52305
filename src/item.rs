// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A volume item: one tracked audio session plus its display metadata.
//!
//! Volume and mute are projections over the live session, never a cached
//! copy. Reads go straight to the backend; writes push immediately, no
//! batching or debounce. Metadata is resolved once per session (re)bind.

use crate::metadata::{self, Icon, MetadataResolver};
use crate::observe::{Notifier, SubscriptionId};
use crate::platform::{AudioSession, PlatformError};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Field-change notification raised toward the UI binding layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemEvent {
    VolumeChanged,
    /// Mute changed; the derived mute glyph changed with it.
    MuteChanged,
    DisplayNameChanged,
    IconChanged,
}

/// One session the mixer exposes. Shared between the registry, its event
/// bridge, and the consumer; fields are written on the dispatch context.
pub struct VolumeItem {
    id: Uuid,
    session: RwLock<Option<Arc<dyn AudioSession>>>,
    process_id: RwLock<Option<u32>>,
    display_name: RwLock<Option<String>>,
    icon: RwLock<Option<Icon>>,
    events: Notifier<ItemEvent>,
}

impl VolumeItem {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4(),
            session: RwLock::new(None),
            process_id: RwLock::new(None),
            display_name: RwLock::new(None),
            icon: RwLock::new(None),
            events: Notifier::new(),
        })
    }

    /// Stable identity for list diffing on the consumer side.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Attach a session and resolve its display metadata.
    pub(crate) fn bind_session(&self, session: Arc<dyn AudioSession>, resolver: &dyn MetadataResolver) {
        let pid = session.process_id();
        let process_path = resolver.resolve_process_path(pid);

        let name = metadata::resolve_display_name(session.as_ref(), resolver, process_path.as_deref());
        let icon = metadata::resolve_icon(session.as_ref(), resolver, process_path.as_deref());
        debug!(pid, name = %name, has_icon = icon.is_some(), "bound session");

        *self.session.write() = Some(session);
        *self.process_id.write() = Some(pid);
        *self.display_name.write() = Some(name);
        *self.icon.write() = icon;

        self.events.notify(&ItemEvent::DisplayNameChanged);
        self.events.notify(&ItemEvent::IconChanged);
    }

    /// Drop the session reference. The item reads as silent/unmuted and
    /// writes become no-ops; the registry removes it right after.
    pub(crate) fn clear_session(&self) {
        *self.session.write() = None;
    }

    pub(crate) fn session(&self) -> Option<Arc<dyn AudioSession>> {
        self.session.read().clone()
    }

    /// Volume as integer percent, rounded from the backend's 0.0-1.0.
    pub fn volume(&self) -> u32 {
        match self.session() {
            Some(session) => (session.volume() * 100.0).round() as u32,
            None => 0,
        }
    }

    /// Clamp to 0-100 and push to the backend immediately.
    pub fn set_volume(&self, percent: u32) -> Result<(), PlatformError> {
        let Some(session) = self.session() else {
            return Ok(());
        };
        let percent = percent.min(100);
        session.set_volume(percent as f32 / 100.0)?;
        self.events.notify(&ItemEvent::VolumeChanged);
        Ok(())
    }

    pub fn muted(&self) -> bool {
        self.session().map(|s| s.muted()).unwrap_or(false)
    }

    pub fn set_muted(&self, muted: bool) -> Result<(), PlatformError> {
        let Some(session) = self.session() else {
            return Ok(());
        };
        session.set_muted(muted)?;
        self.events.notify(&ItemEvent::MuteChanged);
        Ok(())
    }

    pub fn toggle_mute(&self) -> Result<(), PlatformError> {
        self.set_muted(!self.muted())
    }

    /// Glyph for the mute button, derived from the mute flag.
    pub fn mute_glyph(&self) -> &'static str {
        if self.muted() {
            "\u{1F507}" // 🔇
        } else {
            "\u{1F50A}" // 🔊
        }
    }

    pub fn display_name(&self) -> Option<String> {
        self.display_name.read().clone()
    }

    pub fn icon(&self) -> Option<Icon> {
        self.icon.read().clone()
    }

    pub fn process_id(&self) -> Option<u32> {
        *self.process_id.read()
    }

    pub fn subscribe(&self, listener: impl Fn(&ItemEvent) + Send + Sync + 'static) -> SubscriptionId {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.events.unsubscribe(id)
    }

    /// Renotify volume after an external change (bridge path).
    pub(crate) fn notify_volume_changed(&self) {
        self.events.notify(&ItemEvent::VolumeChanged);
    }

    /// Renotify mute (and with it the glyph) after an external change.
    pub(crate) fn notify_mute_changed(&self) {
        self.events.notify(&ItemEvent::MuteChanged);
    }
}

impl std::fmt::Debug for VolumeItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VolumeItem")
            .field("id", &self.id)
            .field("display_name", &*self.display_name.read())
            .field("process_id", &*self.process_id.read())
            .field("live", &self.session.read().is_some())
            .finish()
    }
}
