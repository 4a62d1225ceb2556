//! Nearest-candidate search shared by every stage

use shared_types::Span;

/// Which side of the anchor a candidate must lie on, and how distance is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Candidate starts at or after the anchor's end; distance `c.start - a.end`
    After,
    /// Candidate ends at or before the anchor's start; distance `a.start - c.end`
    Before,
    /// Candidate starts strictly before the anchor starts; distance `a.start - c.start`
    StartsBefore,
    /// Any candidate; distance `|c.start - a.start|`
    Around,
}

impl Direction {
    fn distance(self, anchor: Span, candidate: Span) -> Option<usize> {
        match self {
            Direction::After => candidate.start.checked_sub(anchor.end),
            Direction::Before => anchor.start.checked_sub(candidate.end),
            Direction::StartsBefore => {
                (candidate.start < anchor.start).then(|| anchor.start - candidate.start)
            }
            Direction::Around => Some(anchor.start.abs_diff(candidate.start)),
        }
    }
}

/// Find the candidate closest to `anchor`.
///
/// Candidates are `(index, span)` pairs and are expected in ascending start
/// order. A candidate qualifies when it lies on the requested side of the
/// anchor, its distance is strictly below `max_distance` (if any), and
/// `predicate` accepts its index. On equal distance the earlier candidate wins.
pub fn find_nearest<I, P>(
    anchor: Span,
    candidates: I,
    direction: Direction,
    max_distance: Option<usize>,
    mut predicate: P,
) -> Option<usize>
where
    I: IntoIterator<Item = (usize, Span)>,
    P: FnMut(usize) -> bool,
{
    let mut best: Option<(usize, usize)> = None;

    for (idx, span) in candidates {
        let Some(distance) = direction.distance(anchor, span) else {
            continue;
        };
        if max_distance.is_some_and(|max| distance >= max) {
            continue;
        }
        if best.is_some_and(|(_, best_distance)| distance >= best_distance) {
            continue;
        }
        if predicate(idx) {
            best = Some((idx, distance));
        }
    }

    best.map(|(idx, _)| idx)
}
