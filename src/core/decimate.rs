//! Per-pixel-column decimation of emitted runs.

use crate::core::values::ScreenPoint;

/// Point of a run tagged with its position, so picks can be re-sorted.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Pick {
    index: usize,
    point: ScreenPoint,
}

/// Entry, lowest, highest, and exit point of one pixel column.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ColumnEnvelope {
    column: i64,
    first: Pick,
    min: Pick,
    max: Pick,
    last: Pick,
}

impl ColumnEnvelope {
    fn new(column: i64, pick: Pick) -> Self {
        Self {
            column,
            first: pick,
            min: pick,
            max: pick,
            last: pick,
        }
    }

    fn push(&mut self, pick: Pick) {
        if pick.point.y < self.min.point.y {
            self.min = pick;
        }
        if pick.point.y > self.max.point.y {
            self.max = pick;
        }
        self.last = pick;
    }

    /// Emits the distinct picks in run order so the polyline does not fold back.
    fn push_ordered(&self, out: &mut Vec<ScreenPoint>) {
        let mut picks = [self.first, self.min, self.max, self.last];
        picks.sort_unstable_by_key(|pick| pick.index);
        let mut previous = None;
        for pick in picks {
            if previous != Some(pick.index) {
                out.push(pick.point);
                previous = Some(pick.index);
            }
        }
    }
}

#[inline]
fn column_of(x: f64) -> i64 {
    // Saturating float-to-int cast; points are finite by construction.
    x.floor() as i64
}

/// Appends a reduced copy of `run` to `out`, keeping at most four points per
/// pixel column: the first, lowest, highest, and last.
///
/// The first and last point of the run always survive, so bridging segments
/// recorded by the line builder still meet the drawn line. A run that
/// revisits a column later starts a new envelope, so the output keeps the
/// input order. Returns the number of points appended.
pub fn decimate_run(run: &[ScreenPoint], out: &mut Vec<ScreenPoint>) -> usize {
    let before = out.len();
    let mut picks = run
        .iter()
        .copied()
        .enumerate()
        .map(|(index, point)| Pick { index, point });
    let Some(first) = picks.next() else {
        return 0;
    };

    let mut envelope = ColumnEnvelope::new(column_of(first.point.x), first);
    for pick in picks {
        let column = column_of(pick.point.x);
        if column == envelope.column {
            envelope.push(pick);
        } else {
            envelope.push_ordered(out);
            envelope = ColumnEnvelope::new(column, pick);
        }
    }
    envelope.push_ordered(out);
    out.len() - before
}
