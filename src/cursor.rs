use crate::space::{EMPTY, Point, Space};
use crate::stack::Cell;

const SEMICOLON: Cell = b';' as Cell;

/// The one fatal library condition: the cursor could not make progress
/// while skipping markers, so the program can never execute another
/// instruction. Carries the last cursor position for diagnostics.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Stuck {
    pub pos: Point,
}

/// A walking position over a [`Space`]. Movement wraps Lahey-style: a step
/// that leaves the bounding box re-enters from the far edge along the same
/// line.
#[derive(Clone, Copy, Debug)]
pub struct Cursor {
    pos: Point,
}

impl Cursor {
    pub fn new(pos: Point) -> Self {
        Cursor { pos }
    }

    pub fn pos(&self) -> Point {
        self.pos
    }

    pub fn set_pos(&mut self, pos: Point) {
        self.pos = pos;
    }

    pub fn get(&self, space: &Space) -> Cell {
        space.get(self.pos)
    }

    /// Move one `delta` step, wrapping at the bounding box.
    pub fn advance(&mut self, space: &Space, delta: Point) {
        if delta.is_zero() {
            return;
        }
        let next = self.pos + delta;
        if space.in_bounds(next) {
            self.pos = next;
            return;
        }
        // Wrap: back up along -delta until just before leaving the box on
        // the far side. The step cap only matters for degenerate deltas
        // whose wrapping arithmetic cycles inside the box.
        let mut p = self.pos;
        let mut cap = space.dimension_bound();
        while cap > 0 && space.in_bounds(p - delta) {
            p = p - delta;
            cap -= 1;
        }
        self.pos = p;
    }

    /// Advance over spaces and `;`-delimited comment regions, stopping on
    /// the first executable cell. Fails if that can never happen.
    pub fn skip_markers(&mut self, space: &Space, delta: Point) -> Result<(), Stuck> {
        let start = self.pos;
        let mut in_comment = false;
        let mut steps: u64 = 0;
        let limit = space.area_bound().saturating_mul(2).saturating_add(2);
        loop {
            let c = self.get(space);
            if in_comment {
                if c == SEMICOLON {
                    in_comment = false;
                }
            } else if c == SEMICOLON {
                in_comment = true;
            } else if c != EMPTY {
                return Ok(());
            }
            self.advance(space, delta);
            steps += 1;
            // Deterministic walk: returning to the start state means the
            // whole ring is markers. The step limit is a backstop.
            if (self.pos == start && !in_comment) || steps > limit {
                return Err(Stuck { pos: self.pos });
            }
        }
    }

    /// String-mode skip: when sitting on a space, advance to the last space
    /// of the run so the run reads as a single space. Fails if the whole
    /// ring is spaces.
    pub fn skip_to_last_space(&mut self, space: &Space, delta: Point) -> Result<(), Stuck> {
        if self.get(space) != EMPTY {
            return Ok(());
        }
        let start = self.pos;
        let mut steps: u64 = 0;
        let limit = space.area_bound().saturating_mul(2).saturating_add(2);
        loop {
            let mut probe = *self;
            probe.advance(space, delta);
            if probe.get(space) != EMPTY {
                return Ok(());
            }
            *self = probe;
            steps += 1;
            if self.pos == start || steps > limit {
                return Err(Stuck { pos: self.pos });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EAST: Point = Point { x: 1, y: 0 };

    fn space_from(src: &str) -> Space {
        let mut space = Space::new();
        space.load(src.as_bytes(), Point::ORIGIN);
        space
    }

    #[test]
    fn advance_steps_and_wraps() {
        let space = space_from("abc");
        let mut cur = Cursor::new(Point::ORIGIN);
        cur.advance(&space, EAST);
        assert_eq!(cur.pos(), Point::new(1, 0));
        cur.advance(&space, EAST);
        cur.advance(&space, EAST);
        // Off the east edge: wrap to column 0.
        assert_eq!(cur.pos(), Point::ORIGIN);
    }

    #[test]
    fn advance_wraps_westward() {
        let space = space_from("abc");
        let mut cur = Cursor::new(Point::ORIGIN);
        cur.advance(&space, Point::new(-1, 0));
        assert_eq!(cur.pos(), Point::new(2, 0));
    }

    #[test]
    fn advance_with_long_jump_wraps() {
        let space = space_from("abcde");
        let mut cur = Cursor::new(Point::ORIGIN);
        cur.advance(&space, Point::new(7, 0));
        // A single 7-step hop off the edge backtracks to the far side.
        assert_eq!(cur.pos(), Point::ORIGIN);
    }

    #[test]
    fn skip_markers_stops_on_instruction() {
        let space = space_from("   @");
        let mut cur = Cursor::new(Point::ORIGIN);
        cur.skip_markers(&space, EAST).unwrap();
        assert_eq!(cur.pos(), Point::new(3, 0));
        assert_eq!(cur.get(&space), b'@' as Cell);
    }

    #[test]
    fn skip_markers_noop_on_instruction() {
        let space = space_from("@");
        let mut cur = Cursor::new(Point::ORIGIN);
        cur.skip_markers(&space, EAST).unwrap();
        assert_eq!(cur.pos(), Point::ORIGIN);
    }

    #[test]
    fn skip_markers_jumps_comments() {
        let space = space_from(";xx;  @");
        let mut cur = Cursor::new(Point::ORIGIN);
        cur.skip_markers(&space, EAST).unwrap();
        assert_eq!(cur.pos(), Point::new(6, 0));
    }

    #[test]
    fn skip_markers_detects_all_space_ring() {
        // Clear the second row so the walked ring wraps through nothing
        // but spaces while the bounding box still covers it.
        let mut space = space_from("xx\n p");
        space.put(Point::new(1, 1), EMPTY);
        let mut cur = Cursor::new(Point::new(0, 1));
        let err = cur.skip_markers(&space, EAST).unwrap_err();
        assert_eq!(err.pos.y, 1);
    }

    #[test]
    fn skip_markers_detects_unterminated_comment() {
        let space = space_from(";  ");
        let mut cur = Cursor::new(Point::ORIGIN);
        assert!(cur.skip_markers(&space, EAST).is_err());
    }

    #[test]
    fn skip_to_last_space_collapses_runs() {
        let space = space_from("\"a   b\"");
        let mut cur = Cursor::new(Point::new(2, 0));
        cur.skip_to_last_space(&space, EAST).unwrap();
        // Lands on the last space so one space is read, then the advance
        // reaches 'b'.
        assert_eq!(cur.pos(), Point::new(4, 0));
        assert_eq!(cur.get(&space), EMPTY);
    }

    #[test]
    fn skip_to_last_space_noop_off_spaces() {
        let space = space_from("ab");
        let mut cur = Cursor::new(Point::ORIGIN);
        cur.skip_to_last_space(&space, EAST).unwrap();
        assert_eq!(cur.pos(), Point::ORIGIN);
    }
}
