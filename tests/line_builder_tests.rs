use approx::assert_relative_eq;
use composable_axis::core::{
    AcceptAll, Axis, ClipRect, LineBuilder, LineCursor, LineGeometry, LineSeries,
    LinearTransformation, ScreenPoint, Viewport, WindowRange, XySampleAccess, XySamplers,
    analyze, find_window, finite,
};

#[derive(Debug, Clone, Copy)]
struct Sample {
    x: f64,
    y: f64,
}

/// Accessor over [`Sample`] that hides samples with `y` below a threshold.
#[derive(Debug, Clone, Copy)]
struct AboveThreshold(f64);

impl XySampleAccess<Sample> for AboveThreshold {
    type X = f64;
    type Y = f64;

    fn filter(&self, _sample: &Sample) -> bool {
        true
    }

    fn try_x(&self, sample: &Sample) -> Option<f64> {
        finite(sample.x)
    }

    fn try_y(&self, sample: &Sample) -> Option<f64> {
        finite(sample.y)
    }

    fn filter_y(&self, value: &f64) -> bool {
        *value >= self.0
    }
}

type SampleAccess = XySamplers<AcceptAll, fn(&Sample) -> Option<f64>, fn(&Sample) -> Option<f64>>;

fn sample_access() -> SampleAccess {
    XySamplers::new(AcceptAll, |s: &Sample| finite(s.x), |s: &Sample| finite(s.y))
}

fn squares() -> Vec<Sample> {
    (0..5)
        .map(|i| {
            let x = f64::from(i);
            Sample { x, y: x * x }
        })
        .collect()
}

fn axes_for(
    samples: &[Sample],
    viewport: Viewport,
) -> (Axis<LinearTransformation>, Axis<LinearTransformation>) {
    let mut x = Axis::new(LinearTransformation);
    x.configure_horizontal(viewport).expect("valid viewport");
    let mut y = Axis::new(LinearTransformation);
    y.configure_vertical(viewport).expect("valid viewport");
    for sample in samples {
        x.include(sample.x);
        y.include(sample.y);
    }
    x.refresh_view();
    y.refresh_view();
    (x, y)
}

fn drain<A>(
    samples: &[Sample],
    access: &A,
    x: &Axis<LinearTransformation>,
    y: &Axis<LinearTransformation>,
) -> (Vec<Vec<ScreenPoint>>, usize)
where
    A: XySampleAccess<Sample, X = f64, Y = f64>,
{
    let (x0, x1) = x.clip_screen_bounds().expect("published");
    let (y0, y1) = y.clip_screen_bounds().expect("published");
    let builder = LineBuilder::new(
        samples,
        access,
        x.screen_transformation().expect("published"),
        y.screen_transformation().expect("published"),
        ClipRect::new(x0.get(), x1.get(), y0.get(), y1.get()),
    );
    let mut cursor = builder.cursor();
    let mut continuous = Vec::new();
    let mut broken = Vec::new();
    let mut runs = Vec::new();
    loop {
        let more = builder.next_run(&mut cursor, &mut continuous, &mut broken);
        if !continuous.is_empty() {
            runs.push(std::mem::take(&mut continuous));
        }
        if !more {
            break;
        }
    }
    (runs, broken.len())
}

#[test]
fn squares_window_and_render_fully() {
    let samples = squares();
    let xs: Vec<f64> = samples.iter().map(|s| s.x).collect();
    let m = analyze(&xs, &AcceptAll, &|v: &f64| finite(*v)).monotonicity();
    let window = find_window(&xs, m, &AcceptAll, &|v: &f64| finite(*v), (1.0, 3.0))
        .expect("monotone")
        .expect("non-empty");
    for index in 1..=3 {
        assert!(window.contains(index));
    }

    let (x, y) = axes_for(&samples, Viewport::new(100, 100));
    let access = sample_access();
    let (runs, broken) = drain(&samples, &access, &x, &y);
    assert_eq!(runs.len(), 1);
    assert_eq!(broken, 0);

    let run = &runs[0];
    assert_eq!(run.len(), 5);
    for (index, point) in run.iter().enumerate() {
        let expected_x = 25.0 * index as f64;
        let expected_y = 100.0 - 100.0 * (index * index) as f64 / 16.0;
        assert_relative_eq!(point.x, expected_x, epsilon = 1e-9);
        assert_relative_eq!(point.y, expected_y, epsilon = 1e-9);
    }
}

#[test]
fn repeated_calls_emit_every_valid_point_in_order() {
    let samples: Vec<Sample> = (0..1_000)
        .map(|i| Sample {
            x: f64::from(i),
            y: (f64::from(i) * 0.01).sin(),
        })
        .collect();
    let (x, y) = axes_for(&samples, Viewport::new(640, 480));
    let access = sample_access();
    let (runs, _) = drain(&samples, &access, &x, &y);

    let flattened: Vec<ScreenPoint> = runs.into_iter().flatten().collect();
    assert_eq!(flattened.len(), samples.len());
    assert!(flattened.windows(2).all(|pair| pair[0].x < pair[1].x));
}

#[test]
fn value_filter_breaks_runs_and_bridges_gaps() {
    let samples = vec![
        Sample { x: 0.0, y: 5.0 },
        Sample { x: 1.0, y: 6.0 },
        Sample { x: 2.0, y: -1.0 },
        Sample { x: 3.0, y: 7.0 },
        Sample { x: 4.0, y: 8.0 },
    ];
    let (x, y) = axes_for(&samples, Viewport::new(100, 100));
    let (runs, broken) = drain(&samples, &AboveThreshold(0.0), &x, &y);
    assert_eq!(runs.iter().map(Vec::len).collect::<Vec<_>>(), vec![2, 2]);
    assert_eq!(broken, 1);
}

#[test]
fn cursor_can_be_limited_to_a_window() {
    let samples = squares();
    let (x, y) = axes_for(&samples, Viewport::new(100, 100));
    let access = sample_access();
    let builder = LineBuilder::new(
        &samples,
        &access,
        x.screen_transformation().expect("published"),
        y.screen_transformation().expect("published"),
        ClipRect::unbounded(),
    );
    let mut cursor = LineCursor::for_window(WindowRange { start: 1, end: 3 });
    let mut continuous = Vec::new();
    let mut broken = Vec::new();
    assert!(!builder.next_run(&mut cursor, &mut continuous, &mut broken));
    assert_eq!(continuous.len(), 3);
    assert_eq!(cursor.index(), 4);
}

#[test]
fn series_decimation_caps_points_per_column() {
    let samples: Vec<Sample> = (0..10_000)
        .map(|i| Sample {
            x: f64::from(i),
            y: f64::from(i % 17),
        })
        .collect();
    let access = sample_access();
    let mut series = LineSeries::with_samples(access, samples);
    series.set_decimation(true);

    let mut x = Axis::new(LinearTransformation);
    x.configure_horizontal(Viewport::new(200, 100)).expect("valid viewport");
    let mut y = Axis::new(LinearTransformation);
    y.configure_vertical(Viewport::new(200, 100)).expect("valid viewport");
    series.include_into(&mut x, &mut y);
    x.refresh_view();
    y.refresh_view();

    let mut geometry = LineGeometry::new();
    assert!(series.render(&x, &y, &mut geometry).expect("render"));
    assert_eq!(geometry.runs().count(), 1);
    // 200 px wide plus the right edge column, four points each at most.
    assert!(geometry.points().len() <= 4 * 201);
    assert!(geometry.points().len() >= 200);
}
