//! Connectivity signal abstraction.
//!
//! The runtime environment reports whether the device is online and emits
//! transition events. Consumers poll [`ConnectivityMonitor::is_online`]
//! before remote work and watch [`ConnectivityMonitor::subscribe`] to react
//! to offline→online transitions (queue drains).

use tokio::sync::watch;

/// Read access to the online/offline state of the host environment.
pub trait ConnectivityMonitor: Send + Sync {
    /// Returns `true` if the device currently has connectivity.
    fn is_online(&self) -> bool;

    /// Returns a receiver that observes every online/offline transition.
    fn subscribe(&self) -> watch::Receiver<bool>;
}
