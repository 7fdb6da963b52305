// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Trait seams for the OS audio subsystem.
//!
//! The core never talks to a concrete audio backend. A platform binding
//! (Core Audio, PipeWire, ...) implements the object traits here; the core
//! implements the handler traits and registers them. Callbacks may arrive
//! on arbitrary backend threads, so everything is `Send + Sync`.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("session control is no longer available")]
    SessionGone,
    #[error("device is no longer available")]
    DeviceGone,
    #[error("backend call failed: {0}")]
    Backend(String),
}

/// Direction of an audio endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataFlow {
    /// Playback endpoints (speakers, headphones).
    Render,
    /// Recording endpoints (microphones).
    Capture,
}

/// Endpoint role the OS routes audio by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceRole {
    /// Games, music, video. The role the mixer tracks.
    Multimedia,
    /// Voice chat, telephony.
    Communications,
    /// System sounds.
    Console,
}

/// Endpoint availability as reported by device notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceState {
    Active,
    Disabled,
    NotPresent,
    Unplugged,
}

/// Lifecycle state of an audio session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    Inactive,
    Active,
    /// The owning process released the session; it will not come back.
    Expired,
}

/// Why a session was disconnected from its device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisconnectReason {
    DeviceRemoved,
    ServerShutdown,
    FormatChanged,
    SessionLogoff,
    SessionDisconnected,
    ExclusiveModeOverride,
}

/// One application's audio stream on a device.
///
/// Volume is the backend's native linear scale (0.0 - 1.0). Handle
/// ownership is exclusive: the core registers at most one event client per
/// session and releases the session by dropping the last `Arc`.
pub trait AudioSession: Send + Sync {
    fn volume(&self) -> f32;
    fn set_volume(&self, volume: f32) -> Result<(), PlatformError>;
    fn muted(&self) -> bool;
    fn set_muted(&self, muted: bool) -> Result<(), PlatformError>;

    /// Subscribe to this session's change callbacks. At most one client.
    fn register_event_client(&self, handler: Arc<dyn SessionEventHandler>);
    /// Best-effort: must tolerate the session already being gone.
    fn unregister_event_client(&self);

    fn process_id(&self) -> u32;
    fn icon_path(&self) -> Option<String>;
    fn display_name(&self) -> Option<String>;
    fn session_identifier(&self) -> Option<String>;
}

/// Per-session change callbacks. Delivered on backend threads.
pub trait SessionEventHandler: Send + Sync {
    /// Aggregate volume or mute changed. Both values carried together.
    fn on_volume_changed(&self, volume: f32, muted: bool);
    /// A single channel changed. The core models one scalar volume, so
    /// implementations treat this as an aggregate volume change.
    fn on_channel_volume_changed(&self, channel_count: u32, changed_channel: u32);
    fn on_display_name_changed(&self, _display_name: &str) {}
    fn on_icon_path_changed(&self, _icon_path: &str) {}
    fn on_grouping_param_changed(&self) {}
    fn on_session_disconnected(&self, reason: DisconnectReason);
    fn on_state_changed(&self, state: SessionState);
}

/// Notified when the backend creates a new session on the device.
pub trait SessionCreatedHandler: Send + Sync {
    fn on_session_created(&self, session: Arc<dyn AudioSession>);
}

/// The device's session manager: enumeration plus session-created events.
pub trait SessionManager: Send + Sync {
    fn enumerate_sessions(&self) -> Vec<Arc<dyn AudioSession>>;
    fn subscribe_session_created(&self, handler: Arc<dyn SessionCreatedHandler>);
    fn unsubscribe_session_created(&self);
}

/// A render endpoint.
pub trait Device: Send + Sync {
    /// Opaque endpoint id, stable for the device's lifetime.
    fn id(&self) -> String;
    fn session_manager(&self) -> Arc<dyn SessionManager>;
}

/// Endpoint-level discovery and notifications.
pub trait EndpointEnumerator: Send + Sync {
    /// `None` when the OS currently has no active render endpoint for the
    /// role. That is a normal transient state, not an error.
    fn default_render_device(&self, role: DeviceRole) -> Option<Arc<dyn Device>>;

    /// Subscribe to endpoint notifications. At most one handler.
    fn register_endpoint_notification(&self, handler: Arc<dyn DeviceNotificationHandler>);
    /// Best-effort; must be idempotent.
    fn unregister_endpoint_notification(&self);
}

/// Endpoint notifications. Delivered on backend threads.
pub trait DeviceNotificationHandler: Send + Sync {
    fn on_device_state_changed(&self, device_id: &str, new_state: DeviceState);
    fn on_default_device_changed(&self, flow: DataFlow, role: DeviceRole, device_id: &str);
    fn on_device_added(&self, _device_id: &str) {}
    fn on_device_removed(&self, _device_id: &str) {}
    fn on_property_value_changed(&self, _device_id: &str) {}
}
