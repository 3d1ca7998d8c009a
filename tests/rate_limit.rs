use std::cell::Cell;
use std::collections::VecDeque;

use max6675_reader::{
    Error, Measurement, MillisClock, MonotonicClock, RateLimitPolicy, Sensor, SensorConfig, SensorState,
    Transport,
};

const MS: i64 = 1_000;

#[derive(Default)]
struct FakeClock {
    now: Cell<i64>,
}

impl FakeClock {
    fn advance_ms(&self, ms: i64) {
        self.now.set(self.now.get() + ms * MS);
    }
}

impl MonotonicClock for FakeClock {
    fn now_micros(&self) -> i64 {
        self.now.get()
    }
}

#[derive(Debug, PartialEq)]
struct BusDown;

#[derive(Default)]
struct ScriptedBus {
    words: VecDeque<Result<u16, BusDown>>,
    transactions: usize,
}

impl ScriptedBus {
    fn with(words: impl IntoIterator<Item = Result<u16, BusDown>>) -> Self {
        Self {
            words: words.into_iter().collect(),
            transactions: 0,
        }
    }
}

impl Transport for ScriptedBus {
    type Error = BusDown;

    fn transact(&mut self) -> Result<u16, BusDown> {
        self.transactions += 1;
        self.words.pop_front().expect("unexpected transaction")
    }
}

// 100.0 C and 101.0 C
const W100: u16 = 400 << 3;
const W101: u16 = 404 << 3;
const OPEN: u16 = W100 | 0x0004;

#[test]
fn enforce_min_interval_rejects_then_allows() {
    let clock = FakeClock::default();
    let mut bus = ScriptedBus::with([Ok(W100), Ok(W101)]);
    let config = SensorConfig::unlimited()
        .with_min_interval_ms(250)
        .with_policy(RateLimitPolicy::EnforceMinInterval);
    let mut sensor = Sensor::new(&mut bus, &clock, config).unwrap();

    assert_eq!(sensor.read().unwrap().measurement, Measurement::Celsius(100.0));

    clock.advance_ms(249);
    assert!(matches!(sensor.read(), Err(Error::TooSoon { remaining_ms: 1 })));

    clock.advance_ms(1);
    let reading = sensor.read().unwrap();
    assert!(reading.is_fresh);
    assert_eq!(reading.measurement, Measurement::Celsius(101.0));

    drop(sensor);
    assert_eq!(bus.transactions, 2);
}

#[test]
fn return_cached_serves_stale_value_without_bus() {
    let clock = FakeClock::default();
    let mut bus = ScriptedBus::with([Ok(W100), Ok(W101)]);
    let config = SensorConfig::conversion_paced(RateLimitPolicy::ReturnCached);
    let mut sensor = Sensor::new(&mut bus, &clock, config).unwrap();

    assert!(sensor.read().unwrap().is_fresh);

    clock.advance_ms(100);
    let cached = sensor.read().unwrap();
    assert!(!cached.is_fresh);
    assert_eq!(cached.measurement, Measurement::Celsius(100.0));

    clock.advance_ms(150);
    let fresh = sensor.read().unwrap();
    assert!(fresh.is_fresh);
    assert_eq!(fresh.measurement, Measurement::Celsius(101.0));

    drop(sensor);
    assert_eq!(bus.transactions, 2);
}

#[test]
fn first_read_is_never_rate_limited() {
    let clock = FakeClock::default();
    let mut bus = ScriptedBus::with([Ok(W100)]);
    let config = SensorConfig::conversion_paced(RateLimitPolicy::EnforceMinInterval);
    let mut sensor = Sensor::new(&mut bus, &clock, config).unwrap();

    assert!(sensor.read().unwrap().is_fresh);
}

#[test]
fn open_thermocouple_invalidates_cache() {
    let clock = FakeClock::default();
    let mut bus = ScriptedBus::with([Ok(W100), Ok(OPEN), Ok(OPEN)]);
    let mut sensor = Sensor::new(&mut bus, &clock, SensorConfig::unlimited()).unwrap();
    sensor.read().unwrap();
    assert_eq!(sensor.state(), SensorState::HasReading);

    let open = sensor.read().unwrap();
    assert_eq!(open.measurement, Measurement::OpenThermocouple);
    assert!(open.is_fresh);
    assert_eq!(sensor.state(), SensorState::HasNoReading);
    assert_eq!(sensor.last_celsius(), None);
    assert_eq!(sensor.last_raw(), Some(OPEN));
}

#[test]
fn cached_policy_does_not_resurrect_value_after_open() {
    let clock = FakeClock::default();
    let mut bus = ScriptedBus::with([Ok(W100), Ok(OPEN), Ok(OPEN)]);
    let config = SensorConfig::conversion_paced(RateLimitPolicy::ReturnCached);
    let mut sensor = Sensor::new(&mut bus, &clock, config).unwrap();

    sensor.read().unwrap();
    // the interval has elapsed, so the device is asked again and reports open
    clock.advance_ms(250);
    assert_eq!(sensor.read().unwrap().measurement, Measurement::OpenThermocouple);

    clock.advance_ms(10);
    let after = sensor.read().unwrap();
    assert_eq!(after.measurement, Measurement::OpenThermocouple);
    assert!(after.is_fresh);

    drop(sensor);
    assert_eq!(bus.transactions, 3);
}

#[test]
fn open_then_recovery_repopulates_cache() {
    let clock = FakeClock::default();
    let mut bus = ScriptedBus::with([Ok(OPEN), Ok(W101)]);
    let config = SensorConfig::conversion_paced(RateLimitPolicy::EnforceMinInterval);
    let mut sensor = Sensor::new(&mut bus, &clock, config).unwrap();

    assert_eq!(sensor.read().unwrap().measurement, Measurement::OpenThermocouple);
    // no cached reading, so no rate limit applies
    assert_eq!(sensor.read().unwrap().measurement, Measurement::Celsius(101.0));
    assert_eq!(sensor.state(), SensorState::HasReading);
}

#[test]
fn transport_failure_leaves_cache_untouched() {
    let clock = FakeClock::default();
    let mut bus = ScriptedBus::with([Ok(W100), Err(BusDown)]);
    let mut sensor = Sensor::new(&mut bus, &clock, SensorConfig::unlimited()).unwrap();
    sensor.read().unwrap();
    let before = (sensor.last_celsius(), sensor.last_update_us(), sensor.last_raw());

    clock.advance_ms(1_000);
    let err = sensor.read().unwrap_err();
    assert_eq!(err, Error::Transport(BusDown));
    assert!(err.is_transport_failure());

    assert_eq!(sensor.state(), SensorState::HasReading);
    assert_eq!((sensor.last_celsius(), sensor.last_update_us(), sensor.last_raw()), before);
}

#[test]
fn rejected_frames_leave_cache_untouched() {
    let clock = FakeClock::default();
    let mut bus = ScriptedBus::with([Ok(W100), Ok(0x0000), Ok(0xFFFF), Ok(W100 | 0x0001), Ok(W101)]);
    let mut sensor = Sensor::new(&mut bus, &clock, SensorConfig::unlimited()).unwrap();
    sensor.read().unwrap();

    for _ in 0..3 {
        clock.advance_ms(300);
        let err = sensor.read().unwrap_err();
        assert!(matches!(err, Error::Frame { .. }));
        assert!(err.is_transport_failure());
        assert_eq!(sensor.last_celsius(), Some(100.0));
        assert_eq!(sensor.last_update_us(), Some(0));
    }

    clock.advance_ms(300);
    assert_eq!(sensor.read().unwrap().measurement, Measurement::Celsius(101.0));
    assert_eq!(sensor.last_update_us(), Some(1_200 * MS));
}

#[test]
fn tick_clock_keeps_refreshing_past_32_bit_milliseconds() {
    let clock = MillisClock::new();
    let mut bus = ScriptedBus::with((0..11).map(|_| Ok(W100)));
    let config = SensorConfig::conversion_paced(RateLimitPolicy::ReturnCached);
    let mut sensor = Sensor::new(&mut bus, &clock, config).unwrap();

    clock.advance(u32::MAX - 50);
    assert!(sensor.read().unwrap().is_fresh);

    // 100 ms ticks across the 2^32 ms boundary, a fresh read every 300 ms
    let mut fresh = 0;
    for _ in 0..30 {
        clock.advance(100);
        if sensor.read().unwrap().is_fresh {
            fresh += 1;
        }
    }
    assert_eq!(fresh, 10);

    drop(sensor);
    assert_eq!(bus.transactions, 11);
}
