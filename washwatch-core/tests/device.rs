//! End-to-end tests: the whole device on a simulated clock with fake
//! lamps, heap gauge and broker.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use washwatch_core::config::DeviceConfig;
use washwatch_core::runtime::Device;
use washwatch_core::signal::WasherSensors;
use washwatch_core::state::{AlarmStatus, CycleState, Mode, WASHER_CYCLE_COMPLETE};
use washwatch_core::sync::{SyncError, SyncPhase};
use washwatch_core::traits::{
    AnalogInput, HeapGauge, InboundMessage, Network, PubSubClient, QoS, TransportError,
};

const UPDATE: &str = "$aws/things/washwatch/shadow/update";
const DELTA: &str = "$aws/things/washwatch/shadow/update/delta";

struct Lamp(Rc<Cell<u16>>);

impl AnalogInput for Lamp {
    fn read(&mut self) -> u16 {
        self.0.get()
    }
}

struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

struct FixedHeap(usize);

impl HeapGauge for FixedHeap {
    fn free_bytes(&mut self) -> usize {
        self.0
    }
}

#[derive(Default)]
struct Broker {
    clients: usize,
    published: Vec<(String, String)>,
    inbox: VecDeque<InboundMessage>,
    fail_credentials: Option<TransportError>,
    fail_poll: Option<TransportError>,
}

struct FakeNetwork(Rc<RefCell<Broker>>);

struct FakeClient(Rc<RefCell<Broker>>);

impl Network for FakeNetwork {
    type Client = FakeClient;

    fn join(&mut self) -> Result<(), TransportError> {
        Ok(())
    }

    fn load_credentials(&mut self) -> Result<(), TransportError> {
        self.0.borrow_mut().fail_credentials.take().map_or(Ok(()), Err)
    }

    fn create_client(&mut self, client_id: &str) -> Result<FakeClient, TransportError> {
        assert_eq!(client_id, "washwatch");
        self.0.borrow_mut().clients += 1;
        Ok(FakeClient(self.0.clone()))
    }
}

impl PubSubClient for FakeClient {
    fn connect(&mut self) -> Result<(), TransportError> {
        Ok(())
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), TransportError> {
        assert_eq!(topic, DELTA);
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &[u8], qos: QoS) -> Result<(), TransportError> {
        assert_eq!(qos, QoS::AtMostOnce);
        let payload = String::from_utf8(payload.to_vec()).expect("payload is UTF-8");
        self.0
            .borrow_mut()
            .published
            .push((topic.to_string(), payload));
        Ok(())
    }

    fn poll_once(&mut self) -> Result<Option<InboundMessage>, TransportError> {
        let mut broker = self.0.borrow_mut();
        if let Some(e) = broker.fail_poll.take() {
            return Err(e);
        }
        Ok(broker.inbox.pop_front())
    }
}

/// Washer front panel: three light levels
#[derive(Clone)]
struct Panel {
    complete: Rc<Cell<u16>>,
    blank: Rc<Cell<u16>>,
    lid: Rc<Cell<u16>>,
}

impl Panel {
    fn new() -> Self {
        Self {
            complete: Rc::new(Cell::new(900)),
            blank: Rc::new(Cell::new(1000)),
            lid: Rc::new(Cell::new(900)),
        }
    }

    fn lid_locked(&self) {
        self.complete.set(900);
        self.lid.set(9000);
    }

    fn cycle_complete(&self) {
        self.complete.set(2500);
        self.lid.set(900);
    }

    fn dark(&self) {
        self.complete.set(900);
        self.lid.set(900);
    }
}

struct Rig {
    device: Device<Lamp, NoDelay, FixedHeap, FakeNetwork>,
    panel: Panel,
    broker: Rc<RefCell<Broker>>,
    now_ms: u64,
}

impl Rig {
    fn new() -> Self {
        Self::with_broker(Broker::default())
    }

    fn with_broker(broker: Broker) -> Self {
        let config = DeviceConfig::embedded().unwrap();
        let panel = Panel::new();
        let sensors = WasherSensors::new(
            Lamp(panel.complete.clone()),
            Lamp(panel.blank.clone()),
            Lamp(panel.lid.clone()),
            &config.sensor,
        );
        let broker = Rc::new(RefCell::new(broker));
        let device = Device::new(
            &config,
            sensors,
            NoDelay,
            FixedHeap(48_000),
            FakeNetwork(broker.clone()),
        )
        .unwrap();

        Self {
            device,
            panel,
            broker,
            now_ms: 0,
        }
    }

    /// Poll at every deadline up to and including `end_ms`
    fn run_until(&mut self, end_ms: u64) {
        while self.now_ms <= end_ms {
            self.now_ms = self.device.poll(self.now_ms).unwrap();
        }
    }

    fn run_for(&mut self, duration_ms: u64) {
        let end = self.now_ms + duration_ms;
        self.run_until(end);
    }

    fn published(&self) -> Vec<String> {
        self.broker
            .borrow()
            .published
            .iter()
            .map(|(_, payload)| payload.clone())
            .collect()
    }

    fn last_published(&self) -> String {
        self.published().pop().unwrap_or_default()
    }

    fn deliver(&self, payload: &str) {
        self.broker.borrow_mut().inbox.push_back(InboundMessage {
            topic: DELTA.to_string(),
            payload: payload.as_bytes().to_vec(),
        });
    }
}

#[test]
fn test_boot_publishes_full_document() {
    let mut rig = Rig::new();
    rig.run_until(0);

    assert!(rig.device.status().overall_connected());
    assert_eq!(rig.device.status().phase_label(), "Connected");

    let broker = rig.broker.borrow();
    assert_eq!(broker.published.len(), 1);
    let (topic, payload) = &broker.published[0];
    assert_eq!(topic, UPDATE);
    for key in [
        r#""mode":"Manual""#,
        r#""washer_state":"Idle""#,
        r#""dryer_remaining":"""#,
        r#""alarm":{"messages":[],"state":"Idle"}"#,
        r#""now":0.0"#,
    ] {
        assert!(payload.contains(key), "{key} missing from {payload}");
    }
}

#[test]
fn test_washer_cycle_end_to_end() {
    let mut rig = Rig::new();
    rig.device.store_mut().set_mode(Mode::Auto);
    rig.run_until(0);

    rig.panel.lid_locked();
    rig.run_for(5000);
    assert_eq!(rig.device.store().auto().washer_state(), CycleState::Running);
    assert!(rig.device.store().is_awake(rig.now_ms));
    assert!(rig.last_published().contains(r#""washer_state":"Running""#));

    rig.run_until(1_200_000);
    rig.panel.cycle_complete();
    // Lid lamp is held for the retention window, then the cycle completes
    rig.run_for(5000);

    let store = rig.device.store();
    assert_eq!(store.auto().washer_state(), CycleState::Done);
    assert_eq!(store.alarm().status(), AlarmStatus::Alarm);
    assert!(store.alarm().has_message(WASHER_CYCLE_COMPLETE));
    let finished = store.auto().finished_at_ms().unwrap();
    assert!((1_200_000..=1_203_000).contains(&finished));

    rig.run_for(4000);
    let last = rig.last_published();
    assert!(last.contains(r#""messages":["Washer cycle complete"]"#), "{last}");

    rig.panel.dark();
    rig.run_for(5000);
    assert_eq!(rig.device.store().auto().washer_state(), CycleState::Idle);
}

#[test]
fn test_remote_cancel_is_acknowledged() {
    let mut rig = Rig::new();
    rig.device
        .store_mut()
        .alarm_mut()
        .alarm(Some("Dryer timer done"));
    rig.run_until(0);

    rig.deliver(r#"{"state":{"alarm":{"state":"Idle"}},"version":12}"#);
    rig.run_for(8000);

    assert_eq!(rig.device.store().alarm().status(), AlarmStatus::Idle);
    let acks: Vec<String> = rig
        .published()
        .into_iter()
        .filter(|p| p.contains(r#""desired":{"alarm":null}"#))
        .collect();
    assert_eq!(acks.len(), 1);
    assert!(acks[0].contains(r#""state":"Idle""#));
}

#[test]
fn test_remote_snooze_then_expiry() {
    let mut rig = Rig::new();
    rig.device.store_mut().alarm_mut().alarm(Some("Washer timer done"));
    rig.run_until(0);

    rig.deliver(r#"{"state":{"alarm":{"state":"Snooze","snooze_until":60.0}}}"#);
    rig.run_for(4000);
    assert_eq!(rig.device.store().alarm().status(), AlarmStatus::Snooze);
    assert_eq!(rig.device.store().alarm().snooze_until_ms(), Some(60_000));

    rig.run_until(70_000);
    let alarm = rig.device.store().alarm();
    assert_eq!(alarm.status(), AlarmStatus::Alarm);
    assert!(alarm.has_message("Washer timer done"));
}

#[test]
fn test_manual_timer_end_to_end() {
    let mut rig = Rig::new();
    rig.run_until(0);

    let start = rig.now_ms;
    rig.device.store_mut().manual_mut().start_washer(start);
    rig.run_for(1000);
    let remaining = rig.device.store().manual().washer_remaining(rig.now_ms);
    assert!(remaining.starts_with("59m"), "{remaining}");

    rig.run_until(start + 3_600_000 + 2000);
    let store = rig.device.store();
    assert_eq!(store.manual().washer_state(), CycleState::Done);
    assert!(store.alarm().has_message("Washer timer done"));
    assert!(store.is_awake(rig.now_ms));
}

#[test]
fn test_reconnect_after_connection_loss() {
    let mut rig = Rig::new();
    rig.run_until(0);

    rig.broker.borrow_mut().fail_poll = Some(TransportError::ConnectionLost);
    rig.run_until(4000);
    assert!(matches!(rig.device.sync().phase(), SyncPhase::Backoff { .. }));
    assert!(!rig.device.status().overall_connected());
    let before = rig.published().len();

    rig.run_until(20_000);
    assert_eq!(rig.device.sync().phase(), SyncPhase::Online);
    assert_eq!(rig.broker.borrow().clients, 2);

    // New session starts with a full document
    let published = rig.published();
    assert_eq!(published.len(), before + 1);
    assert!(published[before].contains(r#""manual":{"#));
}

#[test]
fn test_terminal_error_reaches_caller() {
    let mut rig = Rig::with_broker(Broker {
        fail_credentials: Some(TransportError::Credentials),
        ..Broker::default()
    });

    assert_eq!(
        rig.device.poll(0),
        Err(SyncError::Transport(TransportError::Credentials))
    );
}

#[test]
fn test_memory_watermark_sampled() {
    let mut rig = Rig::new();
    rig.run_for(1000);
    assert_eq!(rig.device.store().memory().max_free(), Some(48_000));
}

#[test]
fn test_poll_returns_next_deadline() {
    let mut rig = Rig::new();
    assert_eq!(rig.device.poll(0), Ok(100));
    assert_eq!(rig.device.poll(100), Ok(200));
}
