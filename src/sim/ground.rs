//! Ground recycling
//!
//! A fixed number of equally wide segments sit edge to edge. When the leftmost
//! one has scrolled completely past the left screen edge (plus a margin) it is
//! moved to the back of the line, flush against the rightmost segment.

use std::collections::VecDeque;

use super::actor::ActorId;

#[derive(Debug, Clone)]
pub struct GroundStrip {
    /// Ordered left to right
    segments: VecDeque<ActorId>,
    width: f32,
    /// How far past x = 0 a segment's right edge may go before it is recycled
    offset: f32,
}

impl GroundStrip {
    pub fn new(width: f32, offset: f32) -> Self {
        Self {
            segments: VecDeque::new(),
            width,
            offset,
        }
    }

    /// Center x of the `index`-th segment when laid out from scratch.
    /// The first segment's left edge starts at `-offset`.
    pub fn initial_center_x(&self, index: usize) -> f32 {
        -self.offset + self.width * (index as f32 + 0.5)
    }

    /// Append a segment at the right end of the line
    pub fn push(&mut self, id: ActorId) {
        self.segments.push_back(id);
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Segment ids, left to right
    pub fn ids(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.segments.iter().copied()
    }

    /// Work out which segments must move.
    ///
    /// `center_x` reports a segment's current center. Returns `(segment, new
    /// center x)` for every segment that was sent to the back, in order; the
    /// internal ordering is already updated.
    pub fn recycle(&mut self, center_x: impl Fn(ActorId) -> Option<f32>) -> Vec<(ActorId, f32)> {
        let mut moves = Vec::new();
        let Some(mut back_x) = self.segments.back().and_then(|&id| center_x(id)) else {
            return moves;
        };

        // Each segment moves at most once per call; positions reported by
        // `center_x` are stale for segments already moved.
        for _ in 0..self.segments.len() {
            let Some(&front) = self.segments.front() else {
                break;
            };
            let Some(front_x) = center_x(front) else {
                break;
            };
            if front_x + self.width / 2.0 >= -self.offset {
                break;
            }
            back_x += self.width;
            self.segments.rotate_left(1);
            moves.push((front, back_x));
        }
        moves
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    struct Model {
        strip: GroundStrip,
        x: HashMap<ActorId, f32>,
    }

    impl Model {
        fn new(count: u32, width: f32, offset: f32) -> Self {
            let mut strip = GroundStrip::new(width, offset);
            let mut x = HashMap::new();
            for i in 0..count {
                let id = ActorId(i);
                x.insert(id, strip.initial_center_x(i as usize));
                strip.push(id);
            }
            Self { strip, x }
        }

        fn scroll(&mut self, dx: f32) {
            for v in self.x.values_mut() {
                *v -= dx;
            }
            let x = &self.x;
            let moves = self.strip.recycle(|id| x.get(&id).copied());
            for (id, cx) in moves {
                self.x.insert(id, cx);
            }
        }

        fn spans(&self) -> Vec<(f32, f32)> {
            let hw = self.strip.width() / 2.0;
            self.strip
                .ids()
                .map(|id| (self.x[&id] - hw, self.x[&id] + hw))
                .collect()
        }
    }

    #[test]
    fn test_initial_layout_is_contiguous() {
        let m = Model::new(4, 2.0, 1.0);
        let spans = m.spans();
        assert_eq!(spans[0].0, -1.0);
        for w in spans.windows(2) {
            assert!((w[0].1 - w[1].0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_offscreen_segment_moves_to_back() {
        let mut m = Model::new(4, 2.0, 1.0);
        // first segment spans [-1, 1]; push its right edge past -1
        m.scroll(2.5);
        let ids: Vec<_> = m.strip.ids().collect();
        assert_eq!(ids, vec![ActorId(1), ActorId(2), ActorId(3), ActorId(0)]);
        let spans = m.spans();
        assert!((spans[3].0 - spans[2].1).abs() < 1e-5);
    }

    #[test]
    fn test_segment_inside_margin_stays() {
        let mut m = Model::new(3, 2.0, 1.0);
        m.scroll(1.5);
        assert_eq!(m.strip.ids().next(), Some(ActorId(0)));
        assert!(m.strip.recycle(|_| None).is_empty());
    }

    #[test]
    fn test_large_jump_recycles_several() {
        let mut m = Model::new(5, 1.0, 0.0);
        m.scroll(3.2);
        assert_eq!(m.strip.ids().next(), Some(ActorId(3)));
        assert_eq!(m.strip.len(), 5);
    }

    proptest! {
        #[test]
        fn test_strip_stays_contiguous_and_covers_view(
            steps in prop::collection::vec(0.0f32..0.6, 1..400),
        ) {
            let (count, width, offset, view) = (7u32, 4.0f32, 1.0f32, 16.0f32);
            let mut m = Model::new(count, width, offset);
            for dx in steps {
                m.scroll(dx);
                let spans = m.spans();
                prop_assert_eq!(spans.len(), count as usize);
                for w in spans.windows(2) {
                    prop_assert!((w[0].1 - w[1].0).abs() < 1e-3);
                }
                prop_assert!(spans[0].0 <= 0.0);
                prop_assert!(spans[spans.len() - 1].1 >= view + offset);
            }
        }
    }
}
