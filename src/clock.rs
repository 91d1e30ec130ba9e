use chrono::NaiveDateTime;

/// Source of "now" for request handling. The schedule functions never read
/// the clock themselves.
pub trait Clock: Sync + Send {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time of the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
