//! Controller input: driver boundary, event model, and the debounced mapper that turns stick
//! and trigger positions into platform transforms.

mod driver;
mod event;
#[cfg(feature = "gamepad")]
mod gamepad;
mod mapper;

use std::time::Duration;

pub use driver::{ControllerDriver, DriverPoll, Extras, LineDriver};
pub use event::{Button, ControllerEvent, MotionAxis, STICK_CENTER, StatusKind, Stick, Trigger};
#[cfg(feature = "gamepad")]
pub use gamepad::GilrsDriver;
pub use mapper::{
    Applied, InputMapper, InputState, Normalize, ResponseCurve, TRIGGER_SCALE, expo, expo_inverse,
};

use crate::foundation::clock::Clock;
use crate::foundation::error::{StewieError, StewieResult};
use crate::runtime::Runtime;
use crate::sink::TransformSink;

/// Back-off between polls of a driver that had nothing to report.
pub const IDLE_POLL: Duration = Duration::from_millis(4);

/// Feed driver events through `mapper` until the driver closes.
///
/// Each poll is one tick: the whole batch is folded first, then at most one transform is
/// emitted. Driver errors are logged, never fatal; an I/O failure on the event source ends
/// the run like a closed source would.
#[tracing::instrument(level = "debug", skip_all)]
pub fn run_mapper<C, S, D>(
    rt: &mut Runtime<C, S>,
    driver: &mut D,
    mapper: &mut InputMapper,
) -> StewieResult<()>
where
    C: Clock,
    S: TransformSink,
    D: ControllerDriver + ?Sized,
{
    loop {
        rt.check_cancelled()?;
        let batch = match driver.poll() {
            Ok(DriverPoll::Events(batch)) => batch,
            Ok(DriverPoll::Idle) => {
                rt.sleep(IDLE_POLL);
                continue;
            }
            Ok(DriverPoll::Closed) => return Ok(()),
            Err(StewieError::Io(err)) => {
                tracing::warn!(%err, "controller event source failed");
                return Ok(());
            }
            Err(err) => {
                tracing::warn!(%err, "controller driver error");
                rt.sleep(IDLE_POLL);
                continue;
            }
        };

        for event in &batch {
            match mapper.apply(event) {
                Applied::Updated => {}
                Applied::Connected => rt.emit_line("connected")?,
                Applied::Error(msg) => tracing::warn!(error = %msg, "controller error"),
                Applied::Ignored => tracing::debug!(event = %event.name(), "unmapped event"),
            }
        }
        if let Some(transform) = mapper.flush() {
            rt.emit(&transform)?;
        }
    }
}

fn json_number(v: f64) -> serde_json::Value {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        serde_json::Value::from(v as i64)
    } else {
        serde_json::Value::from(v)
    }
}

/// Diagnostic rendering of one event: `<id> <action>: <json payload>`.
pub fn dump_line(event: &ControllerEvent) -> String {
    let payload = match event {
        ControllerEvent::Connected => return "connected".to_owned(),
        ControllerEvent::Error(msg) => serde_json::Value::from(msg.as_str()),
        ControllerEvent::Button { .. } => serde_json::Value::Null,
        ControllerEvent::Move { x, y, .. } => {
            serde_json::json!({ "x": json_number(*x), "y": json_number(*y) })
        }
        ControllerEvent::Analog { value, .. } | ControllerEvent::Motion { value, .. } => {
            json_number(*value)
        }
        ControllerEvent::Status { value, .. } => serde_json::Value::from(value.as_str()),
    };
    let name = event.name();
    let (id, action) = name.split_once(':').unwrap_or((name.as_str(), ""));
    format!("{id} {action}: {payload}")
}

/// Print every event and forward the analog triggers to the rumble motors.
#[tracing::instrument(level = "debug", skip_all)]
pub fn run_dump<C, S, D>(rt: &mut Runtime<C, S>, driver: &mut D) -> StewieResult<()>
where
    C: Clock,
    S: TransformSink,
    D: ControllerDriver + ?Sized,
{
    loop {
        rt.check_cancelled()?;
        let batch = match driver.poll() {
            Ok(DriverPoll::Events(batch)) => batch,
            Ok(DriverPoll::Idle) => {
                rt.sleep(IDLE_POLL);
                continue;
            }
            Ok(DriverPoll::Closed) => return Ok(()),
            Err(StewieError::Io(err)) => {
                tracing::warn!(%err, "controller event source failed");
                return Ok(());
            }
            Err(err) => {
                tracing::warn!(%err, "controller driver error");
                rt.sleep(IDLE_POLL);
                continue;
            }
        };

        for event in &batch {
            if let ControllerEvent::Error(msg) = event {
                tracing::warn!(error = %msg, "controller error");
                continue;
            }
            rt.emit_line(&dump_line(event))?;

            let rumble = |v: f64| Some(v.clamp(0.0, 255.0) as u8);
            let extras = match event {
                ControllerEvent::Analog {
                    trigger: Trigger::L2,
                    value,
                } => Extras {
                    rumble_left: rumble(*value),
                    ..Extras::default()
                },
                ControllerEvent::Analog {
                    trigger: Trigger::R2,
                    value,
                } => Extras {
                    rumble_right: rumble(*value),
                    ..Extras::default()
                },
                _ => continue,
            };
            if let Err(err) = driver.set_extras(extras) {
                tracing::warn!(%err, "failed to set controller extras");
            }
        }
    }
}
