// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! In-memory audio backend for exercising the registry.
//!
//! Fakes implement the platform traits and expose `fire_*` helpers that
//! deliver callbacks the way a real backend would: through whatever
//! handler the core registered, on the caller's thread.

#![allow(dead_code)]

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tinymix::platform::{
    AudioSession, DataFlow, Device, DeviceNotificationHandler, DeviceRole, DeviceState,
    DisconnectReason, EndpointEnumerator, PlatformError, SessionCreatedHandler,
    SessionEventHandler, SessionManager, SessionState,
};

/// Opt-in test logging: `RUST_LOG=tinymix=trace cargo test`.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

pub struct FakeSession {
    pid: u32,
    name: Option<String>,
    identifier: Option<String>,
    icon_path: Option<String>,
    volume: Mutex<f32>,
    muted: AtomicBool,
    handler: Mutex<Option<Arc<dyn SessionEventHandler>>>,
    unregister_calls: AtomicUsize,
}

impl FakeSession {
    pub fn new(pid: u32, name: &str) -> Arc<Self> {
        Arc::new(Self {
            pid,
            name: Some(name.to_string()),
            identifier: None,
            icon_path: None,
            volume: Mutex::new(0.5),
            muted: AtomicBool::new(false),
            handler: Mutex::new(None),
            unregister_calls: AtomicUsize::new(0),
        })
    }

    pub fn anonymous(pid: u32) -> Arc<Self> {
        Arc::new(Self {
            pid,
            name: None,
            identifier: None,
            icon_path: None,
            volume: Mutex::new(0.5),
            muted: AtomicBool::new(false),
            handler: Mutex::new(None),
            unregister_calls: AtomicUsize::new(0),
        })
    }

    pub fn has_event_client(&self) -> bool {
        self.handler.lock().is_some()
    }

    pub fn unregister_calls(&self) -> usize {
        self.unregister_calls.load(Ordering::SeqCst)
    }

    fn current_handler(&self) -> Option<Arc<dyn SessionEventHandler>> {
        self.handler.lock().clone()
    }

    /// Deliver a volume-changed callback, stale handler included: a real
    /// backend keeps firing at a client until unregistration lands.
    pub fn fire_volume_changed(&self) {
        if let Some(handler) = self.current_handler() {
            handler.on_volume_changed(*self.volume.lock(), self.muted.load(Ordering::SeqCst));
        }
    }

    pub fn fire_channel_volume_changed(&self) {
        if let Some(handler) = self.current_handler() {
            handler.on_channel_volume_changed(2, 0);
        }
    }

    pub fn fire_disconnected(&self, reason: DisconnectReason) {
        if let Some(handler) = self.current_handler() {
            handler.on_session_disconnected(reason);
        }
    }

    pub fn fire_state_changed(&self, state: SessionState) {
        if let Some(handler) = self.current_handler() {
            handler.on_state_changed(state);
        }
    }

    /// Fire at a handler captured before unregistration, simulating a
    /// callback already in flight when the session closed.
    pub fn fire_on(&self, handler: &Arc<dyn SessionEventHandler>) {
        handler.on_volume_changed(*self.volume.lock(), false);
        handler.on_session_disconnected(DisconnectReason::SessionDisconnected);
    }

    pub fn capture_handler(&self) -> Option<Arc<dyn SessionEventHandler>> {
        self.current_handler()
    }
}

impl AudioSession for FakeSession {
    fn volume(&self) -> f32 {
        *self.volume.lock()
    }

    fn set_volume(&self, volume: f32) -> Result<(), PlatformError> {
        *self.volume.lock() = volume;
        Ok(())
    }

    fn muted(&self) -> bool {
        self.muted.load(Ordering::SeqCst)
    }

    fn set_muted(&self, muted: bool) -> Result<(), PlatformError> {
        self.muted.store(muted, Ordering::SeqCst);
        Ok(())
    }

    fn register_event_client(&self, handler: Arc<dyn SessionEventHandler>) {
        *self.handler.lock() = Some(handler);
    }

    fn unregister_event_client(&self) {
        self.unregister_calls.fetch_add(1, Ordering::SeqCst);
        self.handler.lock().take();
    }

    fn process_id(&self) -> u32 {
        self.pid
    }

    fn icon_path(&self) -> Option<String> {
        self.icon_path.clone()
    }

    fn display_name(&self) -> Option<String> {
        self.name.clone()
    }

    fn session_identifier(&self) -> Option<String> {
        self.identifier.clone()
    }
}

#[derive(Default)]
pub struct FakeManager {
    sessions: Mutex<Vec<Arc<FakeSession>>>,
    created: Mutex<Option<Arc<dyn SessionCreatedHandler>>>,
}

impl FakeManager {
    pub fn new(sessions: Vec<Arc<FakeSession>>) -> Arc<Self> {
        Arc::new(Self {
            sessions: Mutex::new(sessions),
            created: Mutex::new(None),
        })
    }

    pub fn has_created_handler(&self) -> bool {
        self.created.lock().is_some()
    }

    /// A new app started playing: add to the live set and notify.
    pub fn spawn_session(&self, session: Arc<FakeSession>) {
        self.sessions.lock().push(session.clone());
        if let Some(handler) = self.created.lock().clone() {
            handler.on_session_created(session);
        }
    }

    /// Re-announce an already-live session (backends do repeat themselves).
    pub fn reannounce_session(&self, session: Arc<FakeSession>) {
        if let Some(handler) = self.created.lock().clone() {
            handler.on_session_created(session);
        }
    }

    /// The app went away: drop from the live set and disconnect.
    pub fn kill_session(&self, session: &Arc<FakeSession>) {
        self.sessions
            .lock()
            .retain(|s| !Arc::ptr_eq(s, session));
        session.fire_disconnected(DisconnectReason::SessionDisconnected);
    }

    /// Pids the backend currently reports as live.
    pub fn live_pids(&self) -> Vec<u32> {
        self.sessions.lock().iter().map(|s| s.process_id()).collect()
    }
}

impl SessionManager for FakeManager {
    fn enumerate_sessions(&self) -> Vec<Arc<dyn AudioSession>> {
        self.sessions
            .lock()
            .iter()
            .map(|s| s.clone() as Arc<dyn AudioSession>)
            .collect()
    }

    fn subscribe_session_created(&self, handler: Arc<dyn SessionCreatedHandler>) {
        *self.created.lock() = Some(handler);
    }

    fn unsubscribe_session_created(&self) {
        self.created.lock().take();
    }
}

pub struct FakeDevice {
    id: String,
    pub manager: Arc<FakeManager>,
}

impl FakeDevice {
    pub fn new(id: &str, manager: Arc<FakeManager>) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            manager,
        })
    }
}

impl Device for FakeDevice {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn session_manager(&self) -> Arc<dyn SessionManager> {
        self.manager.clone()
    }
}

#[derive(Default)]
pub struct FakeEnumerator {
    default: Mutex<Option<Arc<FakeDevice>>>,
    handler: Mutex<Option<Arc<dyn DeviceNotificationHandler>>>,
}

impl FakeEnumerator {
    pub fn new(default: Option<Arc<FakeDevice>>) -> Arc<Self> {
        Arc::new(Self {
            default: Mutex::new(default),
            handler: Mutex::new(None),
        })
    }

    pub fn set_default(&self, device: Option<Arc<FakeDevice>>) {
        *self.default.lock() = device;
    }

    pub fn has_notification_handler(&self) -> bool {
        self.handler.lock().is_some()
    }

    pub fn fire_default_device_changed(&self, flow: DataFlow, role: DeviceRole, device_id: &str) {
        if let Some(handler) = self.handler.lock().clone() {
            handler.on_default_device_changed(flow, role, device_id);
        }
    }

    pub fn fire_device_state_changed(&self, device_id: &str, state: DeviceState) {
        if let Some(handler) = self.handler.lock().clone() {
            handler.on_device_state_changed(device_id, state);
        }
    }
}

impl EndpointEnumerator for FakeEnumerator {
    fn default_render_device(&self, _role: DeviceRole) -> Option<Arc<dyn Device>> {
        self.default
            .lock()
            .clone()
            .map(|d| d as Arc<dyn Device>)
    }

    fn register_endpoint_notification(&self, handler: Arc<dyn DeviceNotificationHandler>) {
        *self.handler.lock() = Some(handler);
    }

    fn unregister_endpoint_notification(&self) {
        self.handler.lock().take();
    }
}
