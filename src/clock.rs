use core::cell::Cell;

/// Monotonic time source in microseconds. Must never go backwards.
pub trait MonotonicClock {
    fn now_micros(&self) -> i64;
}

impl<C: MonotonicClock + ?Sized> MonotonicClock for &C {
    fn now_micros(&self) -> i64 {
        (**self).now_micros()
    }
}

/// Millisecond clock advanced by a periodic tick.
///
/// Counts in 64 bits, so it does not wrap within any realistic uptime. Not
/// `Sync`: advance it from the same context that reads the sensor.
#[derive(Debug, Default)]
pub struct MillisClock {
    ms: Cell<u64>,
}

impl MillisClock {
    pub const fn new() -> Self {
        Self { ms: Cell::new(0) }
    }

    pub fn advance(&self, ms: u32) {
        self.ms.set(self.ms.get().saturating_add(u64::from(ms)));
    }

    pub fn millis(&self) -> u64 {
        self.ms.get()
    }
}

impl MonotonicClock for MillisClock {
    fn now_micros(&self) -> i64 {
        i64::try_from(self.ms.get().saturating_mul(1000)).unwrap_or(i64::MAX)
    }
}
