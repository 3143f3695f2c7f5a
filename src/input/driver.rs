use std::io::{BufRead, BufReader, Read};

use crate::foundation::error::StewieResult;
use crate::input::event::ControllerEvent;

/// Rumble and LED output state. `None` leaves a channel untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Extras {
    pub rumble_left: Option<u8>,
    pub rumble_right: Option<u8>,
    pub led: Option<u8>,
}

impl Extras {
    /// Motors off, a single steady LED.
    pub fn quiet() -> Self {
        Self {
            rumble_left: Some(0),
            rumble_right: Some(0),
            led: Some(1),
        }
    }
}

/// Result of one driver poll.
#[derive(Clone, Debug, PartialEq)]
pub enum DriverPoll {
    /// Events that arrived together; they belong to the same tick.
    Events(Vec<ControllerEvent>),
    /// Nothing pending right now.
    Idle,
    /// The event source is gone.
    Closed,
}

/// Boundary to the physical controller driver.
pub trait ControllerDriver {
    fn poll(&mut self) -> StewieResult<DriverPoll>;
    fn set_extras(&mut self, extras: Extras) -> StewieResult<()>;
}

impl<D: ControllerDriver + ?Sized> ControllerDriver for Box<D> {
    fn poll(&mut self) -> StewieResult<DriverPoll> {
        (**self).poll()
    }

    fn set_extras(&mut self, extras: Extras) -> StewieResult<()> {
        (**self).set_extras(extras)
    }
}

/// Reads the textual event protocol, one event per line.
///
/// Lines that arrive in the same read form one batch; a blank line closes the batch early,
/// which lets recorded event files mark tick boundaries.
///
/// Lines that are not valid UTF-8 or do not parse are logged and skipped; only end of input
/// closes the driver.
#[derive(Debug)]
pub struct LineDriver<R> {
    reader: BufReader<R>,
    extras: Option<Extras>,
}

impl<R: Read> LineDriver<R> {
    pub fn new(source: R) -> Self {
        Self {
            reader: BufReader::new(source),
            extras: None,
        }
    }

    /// The most recent `set_extras` request. A text stream has no motors to drive.
    pub fn extras(&self) -> Option<Extras> {
        self.extras
    }

    fn has_buffered_line(&self) -> bool {
        self.reader.buffer().contains(&b'\n')
    }
}

impl<R: Read> ControllerDriver for LineDriver<R> {
    fn poll(&mut self) -> StewieResult<DriverPoll> {
        let mut batch = Vec::new();
        let mut raw = Vec::new();
        loop {
            raw.clear();
            if self.reader.read_until(b'\n', &mut raw)? == 0 {
                return Ok(if batch.is_empty() {
                    DriverPoll::Closed
                } else {
                    DriverPoll::Events(batch)
                });
            }

            let Ok(line) = std::str::from_utf8(&raw) else {
                tracing::warn!(bytes = raw.len(), "skipping event line that is not UTF-8");
                if !batch.is_empty() && !self.has_buffered_line() {
                    return Ok(DriverPoll::Events(batch));
                }
                continue;
            };
            let text = line.trim();
            if text.is_empty() {
                if !batch.is_empty() {
                    return Ok(DriverPoll::Events(batch));
                }
                continue;
            }
            match text.parse::<ControllerEvent>() {
                Ok(ev) => batch.push(ev),
                Err(err) => tracing::warn!(line = text, %err, "skipping event line"),
            }

            if !batch.is_empty() && !self.has_buffered_line() {
                return Ok(DriverPoll::Events(batch));
            }
        }
    }

    fn set_extras(&mut self, extras: Extras) -> StewieResult<()> {
        tracing::debug!(?extras, "controller extras");
        self.extras = Some(extras);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::event::{Stick, Trigger};

    #[test]
    fn blank_lines_split_batches() {
        let input = "l1:analog 10\nleft:move 128 0\n\nr2:analog 4\n";
        let mut driver = LineDriver::new(input.as_bytes());

        let DriverPoll::Events(first) = driver.poll().unwrap() else {
            panic!("expected events");
        };
        assert_eq!(
            first,
            [
                ControllerEvent::Analog {
                    trigger: Trigger::L1,
                    value: 10.0
                },
                ControllerEvent::Move {
                    stick: Stick::Left,
                    x: 128.0,
                    y: 0.0
                },
            ]
        );

        let DriverPoll::Events(second) = driver.poll().unwrap() else {
            panic!("expected events");
        };
        assert_eq!(second.len(), 1);
        assert_eq!(driver.poll().unwrap(), DriverPoll::Closed);
    }

    #[test]
    fn bad_lines_are_skipped() {
        let mut driver = LineDriver::new("what\nconnected\n".as_bytes());
        assert_eq!(
            driver.poll().unwrap(),
            DriverPoll::Events(vec![ControllerEvent::Connected])
        );
    }

    #[test]
    fn keeps_only_the_latest_extras() {
        let mut driver = LineDriver::new(std::io::empty());
        assert_eq!(driver.extras(), None);
        driver.set_extras(Extras::quiet()).unwrap();
        let rumble = Extras {
            rumble_left: Some(9),
            ..Extras::default()
        };
        driver.set_extras(rumble).unwrap();
        assert_eq!(driver.extras(), Some(rumble));
        assert_eq!(driver.poll().unwrap(), DriverPoll::Closed);
    }

    #[test]
    fn undecodable_lines_are_skipped_without_closing() {
        let input: &[u8] = b"l1:analog 10\n\n\xff\xfe\n\nl2:analog 20\n";
        let mut driver = LineDriver::new(input);

        let DriverPoll::Events(first) = driver.poll().unwrap() else {
            panic!("expected events");
        };
        assert_eq!(first.len(), 1);
        assert_eq!(
            driver.poll().unwrap(),
            DriverPoll::Events(vec![ControllerEvent::Analog {
                trigger: Trigger::L2,
                value: 20.0
            }])
        );
        assert_eq!(driver.poll().unwrap(), DriverPoll::Closed);
    }
}
