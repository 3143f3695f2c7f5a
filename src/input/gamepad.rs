use std::collections::HashMap;

use gilrs::{Axis, Button as PadButton, EventType, Gilrs};

use crate::foundation::error::{StewieError, StewieResult};
use crate::input::driver::{ControllerDriver, DriverPoll, Extras};
use crate::input::event::{Button, ControllerEvent, STICK_CENTER, Stick, Trigger};

/// Physical gamepad through `gilrs`, translated onto the DualShock event names.
pub struct GilrsDriver {
    gilrs: Gilrs,
    sticks: HashMap<Stick, (f64, f64)>,
}

impl GilrsDriver {
    pub fn new() -> StewieResult<Self> {
        let gilrs = Gilrs::new().map_err(|e| StewieError::driver(e.to_string()))?;
        Ok(Self {
            gilrs,
            sticks: HashMap::new(),
        })
    }

    fn stick_move(&mut self, stick: Stick, x: Option<f32>, y: Option<f32>) -> ControllerEvent {
        // gilrs reports -1..=1 with Y up; the DualShock scale is 0..=255 with Y down.
        let entry = self
            .sticks
            .entry(stick)
            .or_insert((STICK_CENTER, STICK_CENTER));
        if let Some(x) = x {
            entry.0 = STICK_CENTER + f64::from(x) * STICK_CENTER;
        }
        if let Some(y) = y {
            entry.1 = STICK_CENTER - f64::from(y) * STICK_CENTER;
        }
        ControllerEvent::Move {
            stick,
            x: entry.0,
            y: entry.1,
        }
    }

    fn translate(&mut self, event: EventType) -> Option<ControllerEvent> {
        match event {
            EventType::Connected => Some(ControllerEvent::Connected),
            EventType::Disconnected => Some(ControllerEvent::Error("gamepad disconnected".into())),
            EventType::AxisChanged(axis, v, _) => match axis {
                Axis::LeftStickX => Some(self.stick_move(Stick::Left, Some(v), None)),
                Axis::LeftStickY => Some(self.stick_move(Stick::Left, None, Some(v))),
                Axis::RightStickX => Some(self.stick_move(Stick::Right, Some(v), None)),
                Axis::RightStickY => Some(self.stick_move(Stick::Right, None, Some(v))),
                _ => None,
            },
            EventType::ButtonChanged(button, v, _) => {
                let trigger = match button {
                    PadButton::LeftTrigger => Trigger::L1,
                    PadButton::LeftTrigger2 => Trigger::L2,
                    PadButton::RightTrigger => Trigger::R1,
                    PadButton::RightTrigger2 => Trigger::R2,
                    _ => return None,
                };
                Some(ControllerEvent::Analog {
                    trigger,
                    value: f64::from(v) * 255.0,
                })
            }
            EventType::ButtonPressed(button, _) => map_button(button).map(|button| {
                ControllerEvent::Button {
                    button,
                    pressed: true,
                }
            }),
            EventType::ButtonReleased(button, _) => map_button(button).map(|button| {
                ControllerEvent::Button {
                    button,
                    pressed: false,
                }
            }),
            _ => None,
        }
    }
}

fn map_button(button: PadButton) -> Option<Button> {
    Some(match button {
        PadButton::South => Button::X,
        PadButton::East => Button::Circle,
        PadButton::North => Button::Triangle,
        PadButton::West => Button::Square,
        PadButton::LeftTrigger => Button::L1,
        PadButton::LeftTrigger2 => Button::L2,
        PadButton::RightTrigger => Button::R1,
        PadButton::RightTrigger2 => Button::R2,
        PadButton::Select => Button::Select,
        PadButton::Start => Button::Start,
        PadButton::Mode => Button::PsxButton,
        PadButton::LeftThumb => Button::LeftAnalogBump,
        PadButton::RightThumb => Button::RightAnalogBump,
        PadButton::DPadUp => Button::DpadUp,
        PadButton::DPadDown => Button::DpadDown,
        PadButton::DPadLeft => Button::DpadLeft,
        PadButton::DPadRight => Button::DpadRight,
        _ => return None,
    })
}

impl ControllerDriver for GilrsDriver {
    fn poll(&mut self) -> StewieResult<DriverPoll> {
        let mut batch = Vec::new();
        while let Some(ev) = self.gilrs.next_event() {
            if let Some(mapped) = self.translate(ev.event) {
                batch.push(mapped);
            }
        }
        Ok(if batch.is_empty() {
            DriverPoll::Idle
        } else {
            DriverPoll::Events(batch)
        })
    }

    fn set_extras(&mut self, extras: Extras) -> StewieResult<()> {
        // gilrs has no LED control and rumble needs a force-feedback effect per pad.
        tracing::debug!(?extras, "extras are not forwarded to gilrs pads");
        Ok(())
    }
}
