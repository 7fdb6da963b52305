// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Event bridges: backend callback contracts implemented over core state.
//!
//! Each bridge translates one callback surface into dispatched work
//! against the registry or a single item. Nothing is allowed to unwind
//! across the callback boundary; failures on these paths are absorbed
//! here.

use crate::adjuster::AdjusterCore;
use crate::dispatch::Dispatcher;
use crate::item::VolumeItem;
use crate::platform::{
    AudioSession, DataFlow, DeviceNotificationHandler, DeviceRole, DeviceState,
    DisconnectReason, SessionCreatedHandler, SessionEventHandler, SessionState,
};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

/// Keeps one item synchronized with its session and removes it when the
/// session ends.
pub(crate) struct SessionEventBridge {
    /// Taken on close; a bridge whose item is gone ignores every callback.
    item: Mutex<Option<Arc<VolumeItem>>>,
    adjuster: Weak<AdjusterCore>,
    dispatcher: Dispatcher,
}

impl SessionEventBridge {
    pub(crate) fn new(
        item: Arc<VolumeItem>,
        adjuster: Weak<AdjusterCore>,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            item: Mutex::new(Some(item)),
            adjuster,
            dispatcher,
        }
    }

    fn live_item(&self) -> Option<Arc<VolumeItem>> {
        self.item.lock().clone()
    }

    /// Remove the item from the registry and release the session.
    /// Idempotent: the first call takes the item, later calls see nothing.
    fn close_session(&self) {
        let Some(item) = self.item.lock().take() else {
            return;
        };
        debug!(item = %item.id(), "session ended, closing");

        let adjuster = self.adjuster.clone();
        self.dispatcher.invoke(move || {
            if let Some(core) = adjuster.upgrade() {
                core.remove_item(&item);
            }
            if let Some(session) = item.session() {
                session.unregister_event_client();
            }
            item.clear_session();
            // Dropping `item`'s last session Arc releases the handle.
        });
    }
}

impl SessionEventHandler for SessionEventBridge {
    fn on_volume_changed(&self, volume: f32, muted: bool) {
        let Some(item) = self.live_item() else {
            return;
        };
        trace!(volume, muted, "session volume changed");
        self.dispatcher.invoke(move || {
            // Mute rides along with volume on this callback, and the mute
            // glyph derives from the flag, so renotify both.
            item.notify_volume_changed();
            item.notify_mute_changed();
        });
    }

    fn on_channel_volume_changed(&self, _channel_count: u32, _changed_channel: u32) {
        // The item models one scalar volume; a channel change is an
        // aggregate volume change.
        let Some(item) = self.live_item() else {
            return;
        };
        self.dispatcher.invoke(move || item.notify_volume_changed());
    }

    fn on_session_disconnected(&self, reason: DisconnectReason) {
        trace!(?reason, "session disconnected");
        self.close_session();
    }

    fn on_state_changed(&self, state: SessionState) {
        if state == SessionState::Expired {
            self.close_session();
        }
    }
}

/// Wraps sessions the backend creates after the initial enumeration.
pub(crate) struct SessionCreatedBridge {
    adjuster: Weak<AdjusterCore>,
    dispatcher: Dispatcher,
}

impl SessionCreatedBridge {
    pub(crate) fn new(adjuster: Weak<AdjusterCore>, dispatcher: Dispatcher) -> Self {
        Self {
            adjuster,
            dispatcher,
        }
    }
}

impl SessionCreatedHandler for SessionCreatedBridge {
    fn on_session_created(&self, session: Arc<dyn AudioSession>) {
        let adjuster = self.adjuster.clone();
        self.dispatcher.invoke(move || {
            if let Some(core) = adjuster.upgrade() {
                core.wrap_session(session);
            }
        });
    }
}

/// Follows endpoint notifications and drives registry rebinding.
pub(crate) struct DeviceEventBridge {
    adjuster: Weak<AdjusterCore>,
}

impl DeviceEventBridge {
    pub(crate) fn new(adjuster: Weak<AdjusterCore>) -> Self {
        Self { adjuster }
    }
}

impl DeviceNotificationHandler for DeviceEventBridge {
    fn on_device_state_changed(&self, device_id: &str, new_state: DeviceState) {
        let Some(core) = self.adjuster.upgrade() else {
            return;
        };
        if core.current_device_id().as_deref() != Some(device_id) {
            return;
        }
        debug!(device_id, ?new_state, "tracked device state changed");
        if new_state == DeviceState::Active {
            core.initialize();
        } else {
            core.teardown();
        }
    }

    fn on_default_device_changed(&self, flow: DataFlow, role: DeviceRole, device_id: &str) {
        // Only the endpoint the mixer actually follows.
        if flow != DataFlow::Render || role != DeviceRole::Multimedia {
            return;
        }
        let Some(core) = self.adjuster.upgrade() else {
            return;
        };
        debug!(device_id, "default render device changed, rebinding");
        core.teardown();
        core.initialize();
    }
}
