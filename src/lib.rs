// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! TinyMix - per-application volume mixer core.
//!
//! Tracks the audio sessions of the default render device: enumerates
//! them, follows per-session and per-device change notifications, and
//! reconciles everything into an observable collection of volume items a
//! UI layer can bind to. The OS audio subsystem sits behind the trait
//! seams in [`platform`]; backend callbacks are marshaled onto a single
//! dispatch context before touching shared state.

pub mod adjuster;
pub mod dispatch;
pub mod item;
pub mod metadata;
pub mod observe;
pub mod platform;

mod bridge;

pub use adjuster::{BindState, VolumeAdjuster};
pub use dispatch::{DispatchQueue, Dispatcher};
pub use item::{ItemEvent, VolumeItem};
pub use metadata::{Icon, MetadataResolver, NullResolver};
pub use observe::{CollectionEvent, Notifier, ObservableVec, SharedVec, SubscriptionId};
pub use platform::{
    AudioSession, DataFlow, Device, DeviceNotificationHandler, DeviceRole, DeviceState,
    DisconnectReason, EndpointEnumerator, PlatformError, SessionCreatedHandler,
    SessionEventHandler, SessionManager, SessionState,
};
