use std::fmt;
use std::str::FromStr;

use crate::foundation::error::{StewieError, StewieResult};

/// Centre of a stick axis on the 0..=255 scale.
pub const STICK_CENTER: f64 = 128.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stick {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Trigger {
    L1,
    L2,
    R1,
    R2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MotionAxis {
    RightLeft,
    ForwardBackward,
    UpDown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatusKind {
    Battery,
    Connection,
    Charging,
}

macro_rules! named {
    ($ty:ident { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($ty::$variant => $name),+
                }
            }
        }

        impl FromStr for $ty {
            type Err = StewieError;

            fn from_str(s: &str) -> StewieResult<Self> {
                match s {
                    $($name => Ok($ty::$variant),)+
                    other => Err(StewieError::parse(format!(
                        concat!("unknown ", stringify!($ty), " '{}'"),
                        other
                    ))),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

named!(Stick { Left => "left", Right => "right" });
named!(Trigger { L1 => "l1", L2 => "l2", R1 => "r1", R2 => "r2" });
named!(MotionAxis {
    RightLeft => "rightLeft",
    ForwardBackward => "forwardBackward",
    UpDown => "upDown",
});
named!(StatusKind {
    Battery => "battery",
    Connection => "connection",
    Charging => "charging",
});

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Button {
    L1,
    L2,
    R1,
    R2,
    LeftAnalogBump,
    RightAnalogBump,
    Select,
    Start,
    PsxButton,
    Square,
    Triangle,
    Circle,
    X,
    DpadLeft,
    DpadRight,
    DpadUp,
    DpadDown,
}

named!(Button {
    L1 => "l1",
    L2 => "l2",
    R1 => "r1",
    R2 => "r2",
    LeftAnalogBump => "leftAnalogBump",
    RightAnalogBump => "rightAnalogBump",
    Select => "select",
    Start => "start",
    PsxButton => "psxButton",
    Square => "square",
    Triangle => "triangle",
    Circle => "circle",
    X => "x",
    DpadLeft => "dpadLeft",
    DpadRight => "dpadRight",
    DpadUp => "dpadUp",
    DpadDown => "dpadDown",
});

/// One named event from the controller driver.
///
/// Analog payloads use the driver's raw 0..=255 scale.
#[derive(Clone, Debug, PartialEq)]
pub enum ControllerEvent {
    Connected,
    Error(String),
    Button { button: Button, pressed: bool },
    Move { stick: Stick, x: f64, y: f64 },
    Analog { trigger: Trigger, value: f64 },
    Motion { axis: MotionAxis, value: f64 },
    Status { kind: StatusKind, value: String },
}

impl ControllerEvent {
    /// Event name the way the driver spells it, e.g. `left:move`.
    pub fn name(&self) -> String {
        match self {
            Self::Connected => "connected".to_owned(),
            Self::Error(_) => "error".to_owned(),
            Self::Button { button, pressed } => {
                format!("{button}:{}", if *pressed { "press" } else { "release" })
            }
            Self::Move { stick, .. } => format!("{stick}:move"),
            Self::Analog { trigger, .. } => format!("{trigger}:analog"),
            Self::Motion { axis, .. } => format!("{axis}:motion"),
            Self::Status { kind, .. } => format!("{kind}:change"),
        }
    }
}

fn number(field: Option<&str>, event: &str) -> StewieResult<f64> {
    let raw = field.ok_or_else(|| StewieError::parse(format!("'{event}' needs a value")))?;
    raw.parse::<f64>()
        .map_err(|_| StewieError::parse(format!("'{event}': '{raw}' is not a number")))
}

/// Parses the line protocol: `<id>:<action> [payload..]`, plus bare `connected` and
/// `error <message>`.
impl FromStr for ControllerEvent {
    type Err = StewieError;

    fn from_str(line: &str) -> StewieResult<Self> {
        let line = line.trim();
        let (head, rest) = line
            .split_once(char::is_whitespace)
            .map(|(h, r)| (h, r.trim()))
            .unwrap_or((line, ""));
        let mut fields = rest.split_whitespace();

        match head {
            "" => return Err(StewieError::parse("empty event line")),
            "connected" => return Ok(Self::Connected),
            "error" => return Ok(Self::Error(rest.to_owned())),
            _ => {}
        }

        let (id, action) = head
            .split_once(':')
            .ok_or_else(|| StewieError::parse(format!("'{head}' is not <id>:<action>")))?;

        match action {
            "press" | "release" => Ok(Self::Button {
                button: id.parse()?,
                pressed: action == "press",
            }),
            "move" => Ok(Self::Move {
                stick: id.parse()?,
                x: number(fields.next(), head)?,
                y: number(fields.next(), head)?,
            }),
            "analog" => Ok(Self::Analog {
                trigger: id.parse()?,
                value: number(fields.next(), head)?,
            }),
            "motion" => Ok(Self::Motion {
                axis: id.parse()?,
                value: number(fields.next(), head)?,
            }),
            "change" => Ok(Self::Status {
                kind: id.parse()?,
                value: rest.to_owned(),
            }),
            other => Err(StewieError::parse(format!("unknown action '{other}'"))),
        }
    }
}
