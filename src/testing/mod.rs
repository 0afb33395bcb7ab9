//! Hardware doubles for exercising the control stack without a board.
//!
//! [`FakeChip`] stands in for a GPIO character device and records every
//! request, write, and release in one shared event log. [`ScriptedSensor`]
//! replays a fixed list of readings. [`StubClock`] advances time
//! deterministically and can fire a cancellation token from inside a delay,
//! which is how tests land a termination request on a specific checkpoint.

mod fake_gpio;
mod scripted_sensor;
mod stub_clock;

pub use fake_gpio::{FakeChip, FakeLine, LineEvent};
pub use scripted_sensor::ScriptedSensor;
pub use stub_clock::StubClock;
