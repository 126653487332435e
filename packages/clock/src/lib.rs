//! Time related functions and types.
//!
//! It's usually a good idea to control where the time comes from in an
//! application so that it can be mocked for testing and controlled in
//! production. Clocks use [`DurationSinceUnixEpoch`], a `std::time::Duration`
//! since the Unix Epoch, which does not depend on the system time zone.
//!
//! Every crate that needs the time declares its own `CurrentClock` alias:
//! [`clock::Working`] in production and [`clock::Stopped`] under `cfg(test)`,
//! so tests can pin the clock to a known instant.
pub mod clock;

#[macro_use]
extern crate lazy_static;

/// Working version, for production.
#[cfg(not(test))]
#[allow(dead_code)]
pub(crate) type CurrentClock = clock::Working;

/// Stopped version, for testing.
#[cfg(test)]
#[allow(dead_code)]
pub(crate) type CurrentClock = clock::Stopped;
