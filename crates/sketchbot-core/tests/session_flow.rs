//! End-to-end session behaviour against a recording mock device

use sketchbot_canvas::{MemoryCanvas, Point, Stroke};
use sketchbot_core::{
    Category, CommandDispatcher, Delivery, DrawingSession, Error, ImageState, Notification,
    NotificationBus, SessionConfig, TransmissionMode,
};
use sketchbot_device::{Axis, DeviceCall, DeviceCommand, DevicePosition, MockDevice, Reply};
use std::sync::Arc;
use tokio::sync::broadcast;

struct Harness {
    session: DrawingSession,
    device: MockDevice,
    notes: broadcast::Receiver<Notification>,
}

impl Harness {
    fn new(config: SessionConfig) -> Self {
        let device = MockDevice::new();
        let bus = NotificationBus::new(32);
        let notes = bus.subscribe();
        let dispatcher = CommandDispatcher::new(Arc::new(device.clone()), Arc::new(bus));
        let session = DrawingSession::new(config, dispatcher, Box::new(MemoryCanvas::default()));
        Self {
            session,
            device,
            notes,
        }
    }

    fn batched() -> Self {
        Self::new(SessionConfig::default().with_transmission_mode(TransmissionMode::Batched))
    }

    fn stroke(&mut self, x: f64) -> Stroke {
        self.session.pointer_down(Point::new(x, 0.0));
        self.session.pointer_move(Point::new(x, 10.0));
        self.session.pointer_move(Point::new(x + 5.0, 20.0));
        self.session.pointer_up().expect("completed stroke")
    }

    fn notes(&mut self) -> Vec<Notification> {
        std::iter::from_fn(|| self.notes.try_recv().ok()).collect()
    }
}

#[tokio::test]
async fn aggressive_sends_one_singleton_per_ink_stroke() {
    let mut h = Harness::new(SessionConfig::default().with_delivery(Delivery::Ordered));

    let first = h.stroke(1.0);
    let second = h.stroke(2.0);
    h.session.flush().await;

    assert_eq!(h.device.draw_payloads(), vec![vec![first], vec![second]]);
}

#[tokio::test]
async fn erase_strokes_never_reach_the_device() {
    let mut h = Harness::new(SessionConfig::default());
    h.stroke(1.0);
    h.session.set_erase_mode(true);
    h.stroke(2.0);
    h.session.set_erase_mode(false);
    h.stroke(3.0);
    h.session.send_drawing();
    h.session.flush().await;

    let payloads = h.device.draw_payloads();
    assert_eq!(payloads.len(), 3);
    assert!(payloads.iter().flatten().all(Stroke::is_ink));
    assert_eq!(h.session.canvas().strokes().len(), 3);
    assert_eq!(h.session.path().len(), 2);
}

#[tokio::test]
async fn batched_holds_until_explicit_send() {
    let mut h = Harness::batched();
    let a = h.stroke(1.0);
    h.session.toggle_erase_mode();
    h.stroke(2.0);
    h.session.toggle_erase_mode();
    let b = h.stroke(3.0);
    h.session.flush().await;
    assert!(h.device.draw_payloads().is_empty());

    assert!(h.session.send_drawing());
    h.session.flush().await;
    assert_eq!(h.device.draw_payloads(), vec![vec![a, b]]);
}

#[tokio::test]
async fn mode_toggle_never_sends_retroactively() {
    let mut h = Harness::batched();
    h.stroke(1.0);
    assert_eq!(h.session.toggle_transmission_mode(), TransmissionMode::Aggressive);
    h.session.flush().await;
    assert!(h.device.draw_payloads().is_empty());

    assert_eq!(h.session.toggle_transmission_mode(), TransmissionMode::Batched);
    assert_eq!(h.session.path().len(), 1);
}

#[tokio::test]
async fn empty_send_issues_no_call() {
    let mut h = Harness::batched();
    assert!(!h.session.send_drawing());
    h.session.flush().await;

    assert!(h.device.calls().is_empty());
    let notes = h.notes();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].category, Category::Info);
}

#[tokio::test]
async fn command_error_then_exactly_one_refresh() {
    let mut h = Harness::new(SessionConfig::default());
    h.device
        .push_command(Ok(Reply::Error("device offline".into())));

    let result = h.session.command(DeviceCommand::Home).await;
    assert!(result.is_err());

    assert_eq!(
        h.device.calls(),
        vec![DeviceCall::Command(DeviceCommand::Home), DeviceCall::Position]
    );
    let notes = h.notes();
    assert_eq!(notes[0], Notification::new(Category::Error, "device offline"));
}

#[tokio::test]
async fn every_command_refreshes_once() {
    let mut h = Harness::new(SessionConfig::default());
    for command in DeviceCommand::ALL {
        let _ = h.session.command(command).await;
    }
    assert_eq!(
        h.device.count(|c| *c == DeviceCall::Position),
        DeviceCommand::ALL.len()
    );
}

#[tokio::test]
async fn position_success_is_stored_and_announced() {
    let mut h = Harness::new(SessionConfig::default());
    h.device
        .push_position(Ok(Reply::Success(DevicePosition::new(1, 2, 3, 0))));

    h.session.refresh_position().await;

    assert_eq!(h.session.position(), Some(DevicePosition::new(1, 2, 3, 0)));
    let notes = h.notes();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].category, Category::Info);
    for value in ["1", "2", "3", "0"] {
        assert!(notes[0].message.contains(value));
    }
}

#[tokio::test]
async fn axis_update_moves_with_full_body() {
    let mut h = Harness::new(SessionConfig::default());
    h.device
        .push_position(Ok(Reply::Success(DevicePosition::new(0, 5, -3, 0))));
    h.session.refresh_position().await;
    let mut updates = h.session.position_updates();
    updates.borrow_and_update();

    let target = h.session.update_axis(Axis::X, 10).await.unwrap();

    assert_eq!(target, DevicePosition::new(10, 5, -3, 0));
    assert!(updates.has_changed().unwrap());
    assert_eq!(*updates.borrow(), Some(target));
    assert_eq!(h.device.calls().last(), Some(&DeviceCall::Move(target)));
}

#[tokio::test]
async fn axis_update_needs_a_known_position() {
    let mut h = Harness::new(SessionConfig::default());
    let result = h.session.update_axis(Axis::Z, -10).await;
    assert!(matches!(result, Err(Error::PositionUnknown)));
    assert!(h.device.calls().is_empty());
}

#[tokio::test]
async fn undo_redo_restores_path_order() {
    let mut h = Harness::batched();
    h.stroke(1.0);
    h.stroke(2.0);
    h.stroke(3.0);
    let before = h.session.path().transmittable();

    assert!(h.session.undo());
    assert!(h.session.undo());
    assert_eq!(h.session.path().len(), 1);
    assert!(h.session.redo());
    assert!(h.session.redo());

    assert_eq!(h.session.path().transmittable(), before);
}

#[tokio::test]
async fn save_lifecycle() {
    let mut h = Harness::batched();

    // unreachable before an image is loaded
    assert!(!h.session.image_state().save_enabled());
    assert!(matches!(
        h.session.open_save_confirmation(),
        Err(Error::GuardViolation(_))
    ));
    assert!(matches!(
        h.session.confirm_save().await,
        Err(Error::GuardViolation(_))
    ));

    h.stroke(1.0);
    h.device.push_image(Ok(Reply::Success("portrait.png".into())));
    h.session.fetch_image().await.unwrap();
    assert!(h.session.path().is_empty());
    assert!(h.session.canvas().strokes().is_empty());
    assert!(h.session.image_state().save_enabled());

    h.stroke(2.0);
    h.session.open_save_confirmation().unwrap();
    assert!(h.session.image_state().confirm_gate_open());

    h.device.push_save(Ok(Reply::Error("disk full".into())));
    assert!(h.session.confirm_save().await.is_err());
    assert!(!h.session.image_state().confirm_gate_open());
    assert_eq!(h.session.image_state(), &ImageState::NoImage);
}

#[tokio::test]
async fn failed_sends_are_reported_without_retry() {
    let mut h = Harness::new(SessionConfig::default().with_delivery(Delivery::Ordered));
    h.device
        .push_draw(Err(sketchbot_device::mock::network_down()));

    h.stroke(1.0);
    h.session.flush().await;

    assert_eq!(h.device.draw_payloads().len(), 1);
    let errors: Vec<_> = h
        .notes()
        .into_iter()
        .filter(|n| n.category == Category::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(h.session.in_flight(), 0);
}
