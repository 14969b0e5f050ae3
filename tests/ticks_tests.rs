use chrono::{Duration, TimeZone, Utc};
use composable_axis::AxisError;
use composable_axis::core::{
    DateTimeTickLocator, LinearTickLocator, LogTickLocator, Tick, TickLocator, TickSpacing,
};

fn linear_ticks(
    locator: LinearTickLocator,
    min: f64,
    max: f64,
    width: f64,
    spacing: TickSpacing,
) -> (Vec<Tick<f64>>, Vec<Tick<f64>>) {
    let mut major = Vec::new();
    let mut minor = Vec::new();
    locator
        .get_ticks(min, max, width, spacing, &mut major, &mut minor)
        .expect("ticks");
    (major, minor)
}

#[test]
fn identical_inputs_produce_identical_ticks() {
    let first = linear_ticks(LinearTickLocator::new(), -3.7, 12.2, 640.0, TickSpacing::default());
    let second = linear_ticks(LinearTickLocator::new(), -3.7, 12.2, 640.0, TickSpacing::default());
    assert_eq!(first, second);
    assert!(!first.0.is_empty());
}

#[test]
fn bounds_order_does_not_matter() {
    let forward = linear_ticks(LinearTickLocator::new(), 0.5, 9.5, 400.0, TickSpacing::default());
    let reversed = linear_ticks(LinearTickLocator::new(), 9.5, 0.5, 400.0, TickSpacing::default());
    assert_eq!(forward, reversed);
}

#[test]
fn fixed_step_places_majors_and_minors() {
    let locator = LinearTickLocator::with_step(0.25).expect("valid step");
    let (major, minor) = linear_ticks(locator, 0.0, 1.0, 100.0, TickSpacing::default());
    let values: Vec<f64> = major.iter().map(|t| t.value).collect();
    assert_eq!(values, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    // Four minors inside each of the four major intervals.
    assert_eq!(minor.len(), 16);
    assert!(minor.iter().all(|t| t.value > 0.0 && t.value < 1.0));
}

#[test]
fn minors_can_be_disabled() {
    let spacing = TickSpacing {
        minor_per_major: 1,
        ..TickSpacing::default()
    };
    let (major, minor) = linear_ticks(LinearTickLocator::new(), 0.0, 100.0, 400.0, spacing);
    assert!(!major.is_empty());
    assert!(minor.is_empty());
}

#[test]
fn degenerate_inputs() {
    let (major, minor) = linear_ticks(LinearTickLocator::new(), 0.0, 10.0, 0.0, TickSpacing::default());
    assert!(major.is_empty() && minor.is_empty());

    let (major, _) = linear_ticks(LinearTickLocator::new(), 3.0, 3.0, 200.0, TickSpacing::default());
    assert_eq!(major.len(), 1);
    assert_eq!(major[0].value, 3.0);
    assert_eq!(major[0].label.as_deref(), Some("3"));

    let mut major = Vec::new();
    let mut minor = Vec::new();
    assert!(matches!(
        LinearTickLocator::new().get_ticks(
            f64::NAN,
            1.0,
            200.0,
            TickSpacing::default(),
            &mut major,
            &mut minor
        ),
        Err(AxisError::InvalidData(_))
    ));
    let bad_spacing = TickSpacing {
        major_spacing_px: 0.0,
        ..TickSpacing::default()
    };
    assert!(
        LinearTickLocator::new()
            .get_ticks(0.0, 1.0, 200.0, bad_spacing, &mut major, &mut minor)
            .is_err()
    );
}

#[test]
fn log_ticks_stride_over_many_decades() {
    let mut major = Vec::new();
    let mut minor = Vec::new();
    // 160 px leaves room for two majors across thirteen decades.
    LogTickLocator
        .get_ticks(1.0, 1e12, 160.0, TickSpacing::default(), &mut major, &mut minor)
        .expect("ticks");
    let values: Vec<f64> = major.iter().map(|t| t.value).collect();
    assert_eq!(values, vec![1.0, 1e7]);
    assert_eq!(major[1].label.as_deref(), Some("1e7"));
    assert_eq!(minor.len(), 11);
}

#[test]
fn log_ticks_skip_non_positive_ranges() {
    let mut major = Vec::new();
    let mut minor = Vec::new();
    LogTickLocator
        .get_ticks(-5.0, 0.0, 400.0, TickSpacing::default(), &mut major, &mut minor)
        .expect("ticks");
    assert!(major.is_empty() && minor.is_empty());
}

#[test]
fn time_steps_climb_the_ladder_then_days() {
    assert_eq!(DateTimeTickLocator::step_for(45.0).expect("valid"), 60.0);
    assert_eq!(DateTimeTickLocator::step_for(3_600.0).expect("valid"), 3_600.0);
    assert_eq!(DateTimeTickLocator::step_for(100_000.0).expect("valid"), 172_800.0);
    assert!(matches!(
        DateTimeTickLocator::step_for(0.0),
        Err(AxisError::InvalidTickStep(_))
    ));
}

#[test]
fn day_ticks_use_date_labels() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().expect("valid time");
    let end = start + Duration::days(60);
    let mut major = Vec::new();
    let mut minor = Vec::new();
    DateTimeTickLocator
        .get_ticks(start, end, 400.0, TickSpacing::default(), &mut major, &mut minor)
        .expect("ticks");

    assert!(!major.is_empty());
    assert!(major.iter().all(|t| t.value >= start && t.value <= end));
    assert!(
        major
            .windows(2)
            .all(|pair| pair[1].value - pair[0].value == Duration::days(20))
    );
    let label = major[0].label.as_deref().expect("labelled");
    assert_eq!(label.len(), "2024-01-01".len());
    assert!(label.starts_with("2024-"));
}
