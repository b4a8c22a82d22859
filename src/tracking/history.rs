use opencv::core::Point;
use std::collections::VecDeque;

/// Bounded most-recent-first record of ball positions
///
/// `None` entries mark frames without a usable position; they stay in the
/// sequence so the trail breaks instead of bridging the gap.
#[derive(Debug, Clone)]
pub struct TrajectoryHistory {
    capacity: usize,
    points: VecDeque<Option<Point>>,
}

impl TrajectoryHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            points: VecDeque::with_capacity(capacity + 1),
        }
    }

    /// Insert at the front, evicting the oldest entry past capacity
    pub fn push(&mut self, position: Option<Point>) {
        self.points.push_front(position);
        self.points.truncate(self.capacity);
    }

    /// Most recent entry, `None` if empty or the last frame had no position
    pub fn latest(&self) -> Option<Point> {
        self.points.front().copied().flatten()
    }

    pub fn get(&self, index: usize) -> Option<Point> {
        self.points.get(index).copied().flatten()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Option<Point>> {
        self.points.iter()
    }

    /// Pairs of temporally adjacent entries that are both present,
    /// as `(index, newer, older)` where `index` is the older entry's recency
    pub fn segments(&self) -> impl Iterator<Item = (usize, Point, Point)> + '_ {
        (1..self.points.len()).filter_map(move |i| match (self.points[i - 1], self.points[i]) {
            (Some(newer), Some(older)) => Some((i, newer, older)),
            _ => None,
        })
    }
}
