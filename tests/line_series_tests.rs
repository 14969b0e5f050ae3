use approx::assert_relative_eq;
use composable_axis::AxisError;
use composable_axis::core::{
    AcceptAll, Axis, LineGeometry, LineSeries, LinearTransformation, LogTransformation,
    ScreenPoint, Viewport, WindowingMode, XySamplers, finite,
};

type PairAccess =
    XySamplers<AcceptAll, fn(&(f64, f64)) -> Option<f64>, fn(&(f64, f64)) -> Option<f64>>;

fn series(samples: Vec<(f64, f64)>) -> LineSeries<(f64, f64), PairAccess> {
    let access: PairAccess = XySamplers::new(
        AcceptAll,
        |s: &(f64, f64)| finite(s.0),
        |s: &(f64, f64)| finite(s.1),
    );
    LineSeries::with_samples(access, samples)
}

#[test]
fn log_axis_data_pass_keeps_smallest_positive_value() {
    let series = series(vec![(0.0, -1.0), (1.0, 1.0), (2.0, 10.0), (3.0, 100.0)]);
    let viewport = Viewport::new(300, 100);
    let mut x = Axis::new(LinearTransformation);
    x.configure_horizontal(viewport).expect("valid viewport");
    let mut y = Axis::new(LogTransformation::default());
    y.configure_vertical(viewport).expect("valid viewport");

    series.include_into(&mut x, &mut y);
    assert_eq!(x.data_range().try_get_min_max(), Some((0.0, 3.0)));
    assert_eq!(y.data_range().try_get_min_max(), Some((1.0, 100.0)));

    y.refresh_view();
    assert_relative_eq!(y.actual_minimum().expect("published"), 1.0, epsilon = 1e-9);
    assert_relative_eq!(y.actual_maximum().expect("published"), 100.0, epsilon = 1e-9);
}

#[test]
fn log_axis_render_skips_out_of_domain_samples() {
    let mut series = series(vec![(0.0, -1.0), (1.0, 1.0), (2.0, 10.0), (3.0, 100.0)]);
    let viewport = Viewport::new(300, 100);
    let mut x = Axis::new(LinearTransformation);
    x.configure_horizontal(viewport).expect("valid viewport");
    let mut y = Axis::new(LogTransformation::default());
    y.configure_vertical(viewport).expect("valid viewport");
    series.include_into(&mut x, &mut y);
    x.refresh_view();
    y.refresh_view();

    let mut geometry = LineGeometry::new();
    assert!(series.render(&x, &y, &mut geometry).expect("render"));
    let runs: Vec<&[ScreenPoint]> = geometry.runs().collect();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].len(), 3);
    assert_relative_eq!(runs[0][0].y, 100.0, epsilon = 1e-9);
    assert_relative_eq!(runs[0][1].y, 50.0, epsilon = 1e-9);
    assert_relative_eq!(runs[0][2].y, 0.0, epsilon = 1e-9);
}

#[test]
fn decimated_runs_stay_connected_to_broken_segments() {
    let mut series = series(vec![
        (0.0, 5.0),
        (0.01, 1.0),
        (0.02, 9.0),
        (0.03, 4.0),
        (0.035, 4.5),
        (0.04, f64::NAN),
        (0.05, 6.0),
        (0.06, 2.0),
        (10.0, 3.0),
    ]);
    series.set_decimation(true);
    let viewport = Viewport::new(100, 100);
    let mut x = Axis::new(LinearTransformation);
    x.configure_horizontal(viewport).expect("valid viewport");
    let mut y = Axis::new(LinearTransformation);
    y.configure_vertical(viewport).expect("valid viewport");
    series.include_into(&mut x, &mut y);
    x.refresh_view();
    y.refresh_view();

    let mut geometry = LineGeometry::new();
    assert!(series.render(&x, &y, &mut geometry).expect("render"));
    let runs: Vec<&[ScreenPoint]> = geometry.runs().collect();
    assert_eq!(runs.len(), 2);
    // Entry, highest, lowest and exit of the first pixel column.
    assert_eq!(runs[0].len(), 4);

    let bridges = geometry.broken();
    assert_eq!(bridges.len(), 1);
    let run_end = runs[0][runs[0].len() - 1];
    let next_start = runs[1][0];
    assert_eq!((bridges[0].x1, bridges[0].y1), (run_end.x, run_end.y));
    assert_eq!((bridges[0].x2, bridges[0].y2), (next_start.x, next_start.y));
}

#[test]
fn required_windowing_reports_unsearchable_series() {
    let mut series = series(vec![(0.0, 0.0), (2.0, 1.0), (1.0, 0.0), (3.0, 2.0)]);
    let viewport = Viewport::new(100, 100);
    let mut x = Axis::new(LinearTransformation);
    x.configure_horizontal(viewport).expect("valid viewport");
    let mut y = Axis::new(LinearTransformation);
    y.configure_vertical(viewport).expect("valid viewport");
    series.include_into(&mut x, &mut y);
    x.refresh_view();
    y.refresh_view();

    let mut geometry = LineGeometry::new();
    assert!(series.render(&x, &y, &mut geometry).expect("auto falls back"));
    assert_eq!(geometry.points().len(), 4);

    geometry.clear();
    series.set_windowing(WindowingMode::Required);
    assert!(matches!(
        series.render(&x, &y, &mut geometry),
        Err(AxisError::NotMonotonic(_))
    ));
    assert!(geometry.is_empty());
}
