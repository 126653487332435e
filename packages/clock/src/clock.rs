//! Working and stopped clocks behind a common [`Time`] trait.
use std::sync::RwLock;
use std::time::Duration;

use peerhub_primitives::DurationSinceUnixEpoch;

/// A clock that can tell the current time as a duration since the Unix Epoch.
pub trait Time: Sized {
    fn now() -> DurationSinceUnixEpoch;

    #[must_use]
    fn now_add(add_time: &Duration) -> Option<DurationSinceUnixEpoch> {
        Self::now().checked_add(*add_time)
    }

    #[must_use]
    fn now_sub(sub_time: &Duration) -> Option<DurationSinceUnixEpoch> {
        Self::now().checked_sub(*sub_time)
    }
}

/// Production clock backed by the operating system time.
#[derive(Debug)]
pub struct Working;

impl Time for Working {
    fn now() -> DurationSinceUnixEpoch {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("system time is after the Unix Epoch")
    }
}

/// Test clock that only advances when told to.
///
/// It defaults to the Unix Epoch and is process-local: tests that depend on a
/// specific instant set it explicitly via [`StoppedTime`].
#[derive(Debug)]
pub struct Stopped;

lazy_static! {
    static ref FIXED_TIME: RwLock<DurationSinceUnixEpoch> = RwLock::new(Duration::ZERO);
}

impl Time for Stopped {
    fn now() -> DurationSinceUnixEpoch {
        *FIXED_TIME.read().expect("stopped clock lock is never poisoned")
    }
}

/// Extra operations only the stopped clock supports.
pub trait StoppedTime: Time {
    fn local_set(unix_time: &DurationSinceUnixEpoch);

    fn local_set_to_unix_epoch() {
        Self::local_set(&Duration::ZERO);
    }

    fn local_add(duration: &Duration);
}

impl StoppedTime for Stopped {
    fn local_set(unix_time: &DurationSinceUnixEpoch) {
        *FIXED_TIME.write().expect("stopped clock lock is never poisoned") = *unix_time;
    }

    fn local_add(duration: &Duration) {
        let mut fixed_time = FIXED_TIME.write().expect("stopped clock lock is never poisoned");
        *fixed_time = fixed_time.checked_add(*duration).expect("stopped clock does not overflow");
    }
}
