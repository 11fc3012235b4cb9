//! Watch-channel connectivity monitor.
//!
//! The host shell feeds browser online/offline events into
//! [`WatchConnectivity::set_online`]; consumers poll or subscribe through
//! the core trait.

use praxis_core::connectivity::ConnectivityMonitor;
use tokio::sync::watch;

/// Connectivity state held in a `tokio::sync::watch` channel.
pub struct WatchConnectivity {
    sender: watch::Sender<bool>,
}

impl WatchConnectivity {
    /// Creates a monitor with the given initial state.
    pub fn new(online: bool) -> Self {
        let (sender, _) = watch::channel(online);
        Self { sender }
    }

    /// Records an online/offline transition from the host environment.
    pub fn set_online(&self, online: bool) {
        // send_replace never fails; the sender keeps the channel alive.
        self.sender.send_replace(online);
    }
}

impl ConnectivityMonitor for WatchConnectivity {
    fn is_online(&self) -> bool {
        *self.sender.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }
}
