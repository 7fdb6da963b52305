// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The session registry: owns the device binding and the item collection.
//!
//! `initialize` and `teardown` are guarded by one atomic tri-state value.
//! The compare-and-swap runs on the caller's thread (possibly a backend
//! callback thread); the body that actually touches the collection is
//! queued onto the dispatch context. Bodies run FIFO there, so a lost CAS
//! is a silent no-op and winners never interleave. The OS firing
//! device-changed and device-removed back to back therefore collapses to
//! one clean rebind.

use crate::bridge::{DeviceEventBridge, SessionCreatedBridge, SessionEventBridge};
use crate::dispatch::Dispatcher;
use crate::item::VolumeItem;
use crate::metadata::MetadataResolver;
use crate::observe::{ObservableVec, SharedVec};
use crate::platform::{AudioSession, Device, DeviceRole, EndpointEnumerator, SessionManager};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// Registry binding state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindState {
    Unbound,
    Bound,
    /// An initialize or teardown holds the guard.
    Binding,
}

const UNBOUND: u8 = 0;
const BOUND: u8 = 1;
const BINDING: u8 = 2;

/// Shared core behind [`VolumeAdjuster`]; bridges hold it weakly.
pub(crate) struct AdjusterCore {
    state: AtomicU8,
    enumerator: Arc<dyn EndpointEnumerator>,
    resolver: Arc<dyn MetadataResolver>,
    dispatcher: Dispatcher,
    items: SharedVec<Arc<VolumeItem>>,
    device: Mutex<Option<Arc<dyn Device>>>,
    manager: Mutex<Option<Arc<dyn SessionManager>>>,
}

impl AdjusterCore {
    /// Bind to the current default render device. No-op when another
    /// initialize or teardown holds the guard, or when already bound.
    pub(crate) fn initialize(self: &Arc<Self>) {
        if self
            .state
            .compare_exchange(UNBOUND, BINDING, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            trace!("initialize skipped, guard lost");
            return;
        }
        // Advance the state before queueing: the body may run on another
        // thread the moment it is queued, and its corrective store for
        // the no-device case must be the last word.
        self.state.store(BOUND, Ordering::SeqCst);
        let core = self.clone();
        self.dispatcher.invoke(move || core.bind());
    }

    /// Release the device binding and every tracked session. Idempotent;
    /// tearing down while unbound is a no-op.
    pub(crate) fn teardown(self: &Arc<Self>) {
        if self
            .state
            .compare_exchange(BOUND, BINDING, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            trace!("teardown skipped, guard lost");
            return;
        }
        self.state.store(UNBOUND, Ordering::SeqCst);
        let core = self.clone();
        self.dispatcher.invoke(move || core.unbind());
    }

    /// Initialize body; runs on the dispatch context.
    fn bind(self: &Arc<Self>) {
        // Register before resolving so a device arriving later still
        // reaches us through default-device-changed.
        let device_bridge = Arc::new(DeviceEventBridge::new(Arc::downgrade(self)));
        self.enumerator.register_endpoint_notification(device_bridge);

        let Some(device) = self.enumerator.default_render_device(DeviceRole::Multimedia) else {
            // Normal transient state: the host may simply have no active
            // render endpoint right now.
            debug!("no default render device, staying unbound");
            self.state.store(UNBOUND, Ordering::SeqCst);
            return;
        };
        info!(device_id = %device.id(), "binding default render device");

        let manager = device.session_manager();
        self.detach_all();
        for session in manager.enumerate_sessions() {
            self.wrap_session(session);
        }

        let created_bridge = Arc::new(SessionCreatedBridge::new(
            Arc::downgrade(self),
            self.dispatcher.clone(),
        ));
        manager.subscribe_session_created(created_bridge);

        *self.device.lock() = Some(device);
        *self.manager.lock() = Some(manager);
        debug!(sessions = self.items.len(), "registry bound");
    }

    /// Teardown body; runs on the dispatch context.
    fn unbind(self: &Arc<Self>) {
        if let Some(manager) = self.manager.lock().take() {
            manager.unsubscribe_session_created();
        }
        self.detach_all();
        self.device.lock().take();
        self.enumerator.unregister_endpoint_notification();
        debug!("registry unbound");
    }

    /// Wrap one session into an item with a registered event bridge.
    /// Swallows anything odd about the session: the registry stays
    /// consistent minus that one entry.
    pub(crate) fn wrap_session(self: &Arc<Self>, session: Arc<dyn AudioSession>) {
        let duplicate = self.items.snapshot().iter().any(|existing| {
            existing
                .session()
                .is_some_and(|s| Arc::ptr_eq(&s, &session))
        });
        if duplicate {
            warn!(pid = session.process_id(), "session already tracked, skipping");
            return;
        }

        let item = VolumeItem::new();
        let bridge = Arc::new(SessionEventBridge::new(
            item.clone(),
            Arc::downgrade(self),
            self.dispatcher.clone(),
        ));
        session.register_event_client(bridge);
        item.bind_session(session, self.resolver.as_ref());
        self.items.push(item);
    }

    /// Unhook every item's event client and empty the collection.
    fn detach_all(&self) {
        for item in self.items.snapshot() {
            if let Some(session) = item.session() {
                session.unregister_event_client();
            }
            item.clear_session();
        }
        self.items.clear();
    }

    /// Called by a session bridge when its session ends. Removing an
    /// already-removed item is a no-op.
    pub(crate) fn remove_item(&self, item: &Arc<VolumeItem>) {
        self.items.remove_where(|existing| Arc::ptr_eq(existing, item));
    }

    /// Id of the device currently bound, if any. Safe to read from
    /// backend threads.
    pub(crate) fn current_device_id(&self) -> Option<String> {
        self.device.lock().as_ref().map(|d| d.id())
    }

    fn bind_state(&self) -> BindState {
        match self.state.load(Ordering::SeqCst) {
            BOUND => BindState::Bound,
            BINDING => BindState::Binding,
            _ => BindState::Unbound,
        }
    }
}

/// Authoritative owner of "which sessions exist on the default render
/// device". Consumers read [`VolumeAdjuster::items`] and drive individual
/// items; all reconciliation happens through the dispatch context.
pub struct VolumeAdjuster {
    core: Arc<AdjusterCore>,
}

impl VolumeAdjuster {
    /// Build the registry and queue its first bind. The collection fills
    /// in once the dispatch context runs.
    pub fn new(
        enumerator: Arc<dyn EndpointEnumerator>,
        resolver: Arc<dyn MetadataResolver>,
        dispatcher: Dispatcher,
    ) -> Self {
        let core = Arc::new(AdjusterCore {
            state: AtomicU8::new(UNBOUND),
            enumerator,
            resolver,
            dispatcher,
            items: Arc::new(ObservableVec::new()),
            device: Mutex::new(None),
            manager: Mutex::new(None),
        });
        core.initialize();
        Self { core }
    }

    pub fn initialize(&self) {
        self.core.initialize();
    }

    pub fn teardown(&self) {
        self.core.teardown();
    }

    /// The live observable collection, not a snapshot.
    pub fn items(&self) -> SharedVec<Arc<VolumeItem>> {
        self.core.items.clone()
    }

    pub fn state(&self) -> BindState {
        self.core.bind_state()
    }

    /// Final teardown at shutdown. Equivalent to [`Self::teardown`].
    pub fn dispose(&self) {
        self.core.teardown();
    }
}

impl Drop for VolumeAdjuster {
    fn drop(&mut self) {
        self.core.teardown();
    }
}
