use stewie::input::{
    ControllerDriver, DriverPoll, Extras, InputMapper, LineDriver, Normalize, ResponseCurve,
    run_dump, run_mapper,
};
use stewie::{InMemorySink, ManualClock, Runtime, StewieResult};

fn runtime() -> Runtime<ManualClock, InMemorySink> {
    Runtime::new(ManualClock::new(), InMemorySink::new())
}

/// Keeps every extras request the loop makes.
struct Recording<D> {
    inner: D,
    extras: Vec<Extras>,
}

impl<D: ControllerDriver> ControllerDriver for Recording<D> {
    fn poll(&mut self) -> StewieResult<DriverPoll> {
        self.inner.poll()
    }

    fn set_extras(&mut self, extras: Extras) -> StewieResult<()> {
        self.extras.push(extras);
        self.inner.set_extras(extras)
    }
}

fn linear() -> InputMapper {
    InputMapper::new(Normalize::Linear {
        angle_scale: 1.0,
        distance_scale: 1.0,
    })
}

#[test]
fn one_line_per_batch_with_the_combined_state() {
    let events = "l1:analog 10\nleft:move 128 255\n\nr1:analog 20\n";
    let mut driver = LineDriver::new(events.as_bytes());
    let mut mapper = linear();
    let mut rt = runtime();

    run_mapper(&mut rt, &mut driver, &mut mapper).unwrap();

    assert_eq!(rt.sink().lines(), ["0.99 0 5 0 0 0", "0.99 0 5 0 0 10"]);
}

#[test]
fn connected_is_reported_and_errors_do_not_stop_the_loop() {
    let events = "connected\n\nerror usb stall\n\nl2:analog 10\n";
    let mut driver = LineDriver::new(events.as_bytes());
    let mut mapper = linear();
    let mut rt = runtime();

    run_mapper(&mut rt, &mut driver, &mut mapper).unwrap();

    assert_eq!(rt.sink().lines(), ["connected", "0 0 -5 0 0 0"]);
}

#[test]
fn reset_button_returns_to_neutral() {
    let events = "left:move 0 0\nr2:analog 100\n\nx:press\n";
    let mut driver = LineDriver::new(events.as_bytes());
    let mut mapper = InputMapper::new(Normalize::ClampDirection {
        max_angle: 3.0,
        max_distance: 0.5,
    })
    .with_curve(ResponseCurve::Expo);
    let mut rt = runtime();

    run_mapper(&mut rt, &mut driver, &mut mapper).unwrap();

    let lines = rt.sink().lines();
    assert_eq!(lines.len(), 2);
    // left stick fully up-left: pitch and roll both -1, rescaled to a 3 degree tilt.
    assert_eq!(lines[0], "-2.12 -2.12 0 0 0 -0.5");
    assert_eq!(lines[1], "0 0 0 0 0 0");
}

#[test]
fn dump_prints_events_and_drives_rumble() {
    let events = "connected\nl2:analog 200\nleft:move 12 250\nr2:analog 3\nsquare:release\n";
    let mut driver = Recording {
        inner: LineDriver::new(events.as_bytes()),
        extras: Vec::new(),
    };
    let mut rt = runtime();

    run_dump(&mut rt, &mut driver).unwrap();

    assert_eq!(
        rt.sink().lines(),
        [
            "connected",
            "l2 analog: 200",
            r#"left move: {"x":12,"y":250}"#,
            "r2 analog: 3",
            "square release: null",
        ]
    );
    assert_eq!(
        driver.extras,
        [
            Extras {
                rumble_left: Some(200),
                ..Extras::default()
            },
            Extras {
                rumble_right: Some(3),
                ..Extras::default()
            },
        ]
    );
    assert_eq!(
        driver.inner.extras(),
        Some(Extras {
            rumble_right: Some(3),
            ..Extras::default()
        })
    );
}

#[test]
fn full_trigger_under_expo_stays_finite() {
    let mut driver = LineDriver::new("l1:analog 255\n".as_bytes());
    let mut mapper = InputMapper::new(Normalize::ClampDirection {
        max_angle: 3.0,
        max_distance: 0.5,
    })
    .with_curve(ResponseCurve::Expo);
    let mut rt = runtime();

    run_mapper(&mut rt, &mut driver, &mut mapper).unwrap();

    assert_eq!(rt.sink().lines(), ["0 0 3 0 0 0"]);
}

#[test]
fn undecodable_event_lines_do_not_end_the_session() {
    let events: &[u8] = b"l1:analog 10\n\n\xff\xfe\n\nl2:analog 20\n";
    let mut driver = LineDriver::new(events);
    let mut mapper = linear();
    let mut rt = runtime();

    run_mapper(&mut rt, &mut driver, &mut mapper).unwrap();

    assert_eq!(rt.sink().lines(), ["0 0 5 0 0 0", "0 0 -10 0 0 0"]);
}
