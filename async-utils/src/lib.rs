//! Rate-limiting gates for interactive callers, plus a tokio driver.

mod debounce;
mod driver;
mod throttle;

pub use debounce::Debounce;
pub use debounce::DebounceMode;
pub use driver::spawn_throttled;
pub use throttle::Throttle;
