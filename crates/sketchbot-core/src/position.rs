//! Position store
//!
//! Last known arm position. Only two things write it: a successful device
//! query (wholesale replace) and an optimistic update right after a move is
//! issued. Observers get changes through a `watch` channel.

use sketchbot_device::{Axis, DevicePosition, Reply};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::dispatcher::CommandDispatcher;
use crate::error::{Error, Result};
use crate::notify::Category;

/// Last known device position; `None` until the device has answered once
pub struct PositionStore {
    current: watch::Sender<Option<DevicePosition>>,
}

impl Default for PositionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionStore {
    /// Create a store with an unknown position
    #[must_use]
    pub fn new() -> Self {
        let (current, _) = watch::channel(None);
        Self { current }
    }

    /// Last known position. May be outdated after a failed refresh.
    #[must_use]
    pub fn current(&self) -> Option<DevicePosition> {
        *self.current.borrow()
    }

    /// Observe position changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<DevicePosition>> {
        self.current.subscribe()
    }

    /// Set the position ahead of confirmation. The next successful refresh
    /// overwrites it.
    pub fn apply_optimistic(&mut self, position: DevicePosition) {
        debug!(%position, "Optimistic position");
        self.current.send_replace(Some(position));
    }

    /// Query the device and replace the stored position on success.
    ///
    /// Any non-success answer leaves the stored value untouched. A semantic
    /// non-success is shown as an info notice, a transport failure as an
    /// error.
    pub async fn refresh(&mut self, dispatcher: &CommandDispatcher) -> Option<DevicePosition> {
        match dispatcher.query_position().await {
            Ok(Reply::Success(position)) => {
                self.current.send_replace(Some(position));
                dispatcher.notify(Category::Info, format!("Position {position}"));
                Some(position)
            }
            Ok(Reply::Error(message)) | Ok(Reply::Other { message, .. }) => {
                dispatcher.notify(Category::Info, message);
                None
            }
            Err(e) => {
                warn!(error = %e, "Position refresh failed");
                dispatcher.notify(Category::Error, format!("Could not read position: {e}"));
                None
            }
        }
    }

    /// Replace one axis on top of the current position and move there.
    ///
    /// The move always carries the full position since the device API is
    /// stateless per request. Bounds are the input's job; nothing is
    /// re-validated here.
    pub async fn update_axis(
        &mut self,
        axis: Axis,
        value: i32,
        dispatcher: &CommandDispatcher,
    ) -> Result<DevicePosition> {
        let Some(base) = self.current() else {
            dispatcher.notify(Category::Error, Error::PositionUnknown.to_string());
            return Err(Error::PositionUnknown);
        };

        let target = base.with_axis(axis, value);
        self.apply_optimistic(target);
        dispatcher.send_move(target).await?;
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{Notification, NotificationBus};
    use sketchbot_device::mock::network_down;
    use sketchbot_device::{DeviceCall, MockDevice};
    use std::sync::Arc;

    fn setup() -> (MockDevice, CommandDispatcher, NotificationBus) {
        let device = MockDevice::new();
        let bus = NotificationBus::new(16);
        let dispatcher = CommandDispatcher::new(Arc::new(device.clone()), Arc::new(bus.clone()));
        (device, dispatcher, bus)
    }

    #[tokio::test]
    async fn test_refresh_replaces_and_reports() {
        let (device, dispatcher, bus) = setup();
        let mut rx = bus.subscribe();
        device.push_position(Ok(Reply::Success(DevicePosition::new(1, 2, 3, 0))));

        let mut store = PositionStore::new();
        assert_eq!(store.current(), None);
        store.refresh(&dispatcher).await;

        assert_eq!(store.current(), Some(DevicePosition::new(1, 2, 3, 0)));
        let note = rx.try_recv().unwrap();
        assert_eq!(note.category, Category::Info);
        for part in ["x: 1", "y: 2", "z: 3", "e: 0"] {
            assert!(note.message.contains(part), "missing {part} in {}", note.message);
        }
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_value() {
        let (device, dispatcher, bus) = setup();
        let mut rx = bus.subscribe();
        let mut store = PositionStore::new();
        store.apply_optimistic(DevicePosition::new(4, 4, 4, 4));

        device.push_position(Err(network_down()));
        assert_eq!(store.refresh(&dispatcher).await, None);
        assert_eq!(store.current(), Some(DevicePosition::new(4, 4, 4, 4)));
        assert_eq!(rx.try_recv().unwrap().category, Category::Error);

        device.push_position(Ok(Reply::text("No DexArm connected.")));
        store.refresh(&dispatcher).await;
        assert_eq!(store.current(), Some(DevicePosition::new(4, 4, 4, 4)));
        assert_eq!(
            rx.try_recv().unwrap(),
            Notification::new(Category::Info, "No DexArm connected.")
        );
    }

    #[tokio::test]
    async fn test_update_axis_moves_full_position() {
        let (device, dispatcher, _bus) = setup();
        let mut store = PositionStore::new();
        store.apply_optimistic(DevicePosition::new(0, 5, -3, 0));

        let target = store.update_axis(Axis::X, 10, &dispatcher).await.unwrap();

        assert_eq!(target, DevicePosition::new(10, 5, -3, 0));
        assert_eq!(store.current(), Some(target));
        assert_eq!(device.calls(), vec![DeviceCall::Move(target)]);
    }

    #[tokio::test]
    async fn test_update_axis_is_optimistic_before_move_resolves() {
        let mut store = PositionStore::new();
        store.apply_optimistic(DevicePosition::new(0, 5, -3, 0));
        let observer = store.subscribe();

        let seen = Arc::new(std::sync::Mutex::new(None));
        let sink = Arc::clone(&seen);
        let device = MockDevice::new().with_move_hook(move |_| {
            *sink.lock().unwrap() = *observer.borrow();
        });
        let dispatcher =
            CommandDispatcher::new(Arc::new(device), Arc::new(NotificationBus::default()));

        store.update_axis(Axis::X, 10, &dispatcher).await.unwrap();
        assert_eq!(*seen.lock().unwrap(), Some(DevicePosition::new(10, 5, -3, 0)));
    }

    #[tokio::test]
    async fn test_update_axis_failed_move_keeps_optimistic_value() {
        let (device, dispatcher, bus) = setup();
        let mut rx = bus.subscribe();
        let mut store = PositionStore::new();
        store.apply_optimistic(DevicePosition::new(0, 0, 0, 0));
        device.push_move(Err(network_down()));

        let result = store.update_axis(Axis::Z, -70, &dispatcher).await;
        assert!(matches!(result, Err(Error::Dispatch(_))));
        assert_eq!(store.current(), Some(DevicePosition::new(0, 0, -70, 0)));
        assert_eq!(rx.try_recv().unwrap().category, Category::Error);
        // no automatic refresh after a move
        assert_eq!(device.count(|c| *c == DeviceCall::Position), 0);
    }

    #[tokio::test]
    async fn test_update_axis_without_known_position() {
        let (device, dispatcher, bus) = setup();
        let mut rx = bus.subscribe();
        let mut store = PositionStore::new();

        let result = store.update_axis(Axis::Y, 3, &dispatcher).await;
        assert!(matches!(result, Err(Error::PositionUnknown)));
        assert!(device.calls().is_empty());
        assert_eq!(rx.try_recv().unwrap().category, Category::Error);
    }
}
