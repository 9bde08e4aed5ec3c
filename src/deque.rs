use std::collections::VecDeque;

use crate::stack::{Cell, Mode, Run};

/// Initial capacity of a fresh deque's single chunk.
const DEFAULT_CHUNK_SIZE: usize = 64;

/// Capacity of chunks allocated for tailward growth.
const NEW_TAIL_SIZE: usize = 8192;

/// One backing segment of a [`Deque`].
///
/// `buf` is always fully initialized; the live cells are `buf[tail..head]`.
/// `head` is one past the topmost value, in `(0, capacity]`; `tail` is the
/// index of the bottommost value, in `[0, capacity)`. Both can sit at the
/// same end when the chunk is empty.
struct Chunk {
    buf: Vec<Cell>,
    head: usize,
    tail: usize,
}

impl Chunk {
    fn with_capacity(cap: usize) -> Self {
        Chunk {
            buf: vec![0; cap.max(1)],
            head: 0,
            tail: 0,
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.head - self.tail
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.head <= self.tail
    }

    #[inline]
    fn live(&self) -> &[Cell] {
        &self.buf[self.tail..self.head]
    }
}

/// Chunked double-ended cell container: the deque form a frame takes once
/// the MODE fingerprint selects it.
///
/// Chunks are owned segments in order, front = tailmost, back = headmost.
/// The headmost chunk grows in place by amortized doubling; tailward growth
/// allocates chunks of `NEW_TAIL_SIZE`. One retired tail chunk is cached so
/// that push/pop churn of a single cell at a chunk boundary never
/// reallocates.
///
/// Boundary chunks are dropped as soon as they empty (the lone remaining
/// chunk excepted), so a non-empty deque always has live cells in both its
/// front and back chunk.
pub struct Deque {
    chunks: VecDeque<Chunk>,
    spare_tail: Option<Chunk>,
    mode: Mode,
}

impl Deque {
    pub fn new(mode: Mode) -> Self {
        Deque::with_chunk_capacity(DEFAULT_CHUNK_SIZE, mode)
    }

    /// A deque whose first chunk holds `cap` cells. Smaller capacities make
    /// chunk-boundary behavior cheap to exercise.
    pub fn with_chunk_capacity(cap: usize, mode: Mode) -> Self {
        let mut chunks = VecDeque::new();
        chunks.push_back(Chunk::with_capacity(cap));
        Deque {
            chunks,
            spare_tail: None,
            mode,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.chunks.iter().map(Chunk::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.len() == 1 && self.chunks[0].is_empty()
    }

    pub fn push(&mut self, c: Cell) {
        if self.mode.invert {
            self.push_tail(c);
        } else {
            self.push_head(c);
        }
    }

    pub fn pop(&mut self) -> Cell {
        if self.is_empty() {
            return 0;
        }
        if self.mode.queue {
            self.pop_tail()
        } else {
            self.pop_head()
        }
    }

    pub fn top(&self) -> Cell {
        if self.is_empty() {
            return 0;
        }
        if self.mode.queue {
            let c = self.chunks.front().unwrap();
            c.buf[c.tail]
        } else {
            let c = self.chunks.back().unwrap();
            c.buf[c.head - 1]
        }
    }

    pub fn pop_n(&mut self, n: usize) {
        if self.mode.queue {
            self.pop_tail_n(n);
        } else {
            self.pop_head_n(n);
        }
    }

    /// Drop back down to one chunk; the cached spare survives.
    pub fn clear(&mut self) {
        self.chunks.truncate(1);
        let only = self.chunks.front_mut().unwrap();
        only.head = 0;
        only.tail = 0;
    }

    /// Append `n` zero-initialized slots at the push end and return them.
    /// In invert mode the slots sit at the tail, so their order is reversed
    /// relative to non-inverted appends.
    pub fn reserve(&mut self, n: usize) -> &mut [Cell] {
        if self.mode.invert {
            self.reserve_tail(n)
        } else {
            self.reserve_head(n)
        }
    }

    /// Visit the top `n` cells bottom-to-top — or, in queue mode, the
    /// bottom `n` cells with any shortfall reported last. See [`Run`].
    pub fn map_first_n<F: FnMut(Run<'_>)>(&self, n: usize, mut f: F) {
        if self.mode.queue {
            self.map_first_n_tail(n, &mut f);
        } else {
            self.map_first_n_head(n, &mut f);
        }
    }

    /// The `i`th cell from the bottom — from the top in queue mode.
    /// `i` must be in range.
    pub fn at(&self, i: usize) -> Cell {
        let mut i = if self.mode.queue { self.len() - 1 - i } else { i };
        for chunk in &self.chunks {
            if i < chunk.len() {
                return chunk.buf[chunk.tail + i];
            }
            i -= chunk.len();
        }
        panic!("deque index out of range");
    }

    pub fn set_at(&mut self, i: usize, c: Cell) {
        let mut i = if self.mode.queue { self.len() - 1 - i } else { i };
        for chunk in &mut self.chunks {
            if i < chunk.len() {
                chunk.buf[chunk.tail + i] = c;
                return;
            }
            i -= chunk.len();
        }
        panic!("deque index out of range");
    }

    /// Cells bottom-to-top in physical order.
    pub fn iter(&self) -> impl Iterator<Item = Cell> + '_ {
        self.chunks.iter().flat_map(|c| c.live().iter().copied())
    }

    /// Cells top-to-bottom in physical order (queue mode is ignored).
    pub fn iter_top_to_bottom(&self) -> impl Iterator<Item = Cell> + '_ {
        self.chunks
            .iter()
            .rev()
            .flat_map(|c| c.live().iter().rev().copied())
    }

    fn push_head(&mut self, c: Cell) {
        let chunk = self.chunks.back_mut().unwrap();
        if chunk.head == chunk.buf.len() {
            let grown = (2 * chunk.buf.len()).max(chunk.head + 1);
            chunk.buf.resize(grown, 0);
        }
        chunk.buf[chunk.head] = c;
        chunk.head += 1;
    }

    fn push_tail(&mut self, c: Cell) {
        let single = self.chunks.len() == 1;
        let front = self.chunks.front_mut().unwrap();
        if front.tail == 0 {
            if single && front.is_empty() {
                // Recenter within the lone chunk instead of allocating.
                let mid = (front.buf.len() / 2).max(1);
                front.head = mid;
                front.tail = mid;
            } else {
                self.new_tail_chunk(1);
            }
        }
        let front = self.chunks.front_mut().unwrap();
        front.tail -= 1;
        front.buf[front.tail] = c;
    }

    fn pop_head(&mut self) -> Cell {
        let (c, emptied) = {
            let chunk = self.chunks.back_mut().unwrap();
            chunk.head -= 1;
            (chunk.buf[chunk.head], chunk.head <= chunk.tail)
        };
        if emptied {
            self.drop_head_chunk();
        }
        c
    }

    fn pop_tail(&mut self) -> Cell {
        let (c, emptied) = {
            let chunk = self.chunks.front_mut().unwrap();
            let c = chunk.buf[chunk.tail];
            chunk.tail += 1;
            (c, chunk.tail >= chunk.head)
        };
        if emptied {
            self.drop_tail_chunk();
        }
        c
    }

    fn pop_head_n(&mut self, mut n: usize) {
        loop {
            let len = self.chunks.back().unwrap().len();
            if n < len {
                self.chunks.back_mut().unwrap().head -= n;
                return;
            }
            n -= len;
            if !self.drop_head_chunk() || n == 0 {
                return;
            }
        }
    }

    fn pop_tail_n(&mut self, mut n: usize) {
        loop {
            let len = self.chunks.front().unwrap().len();
            if n < len {
                self.chunks.front_mut().unwrap().tail += n;
                return;
            }
            n -= len;
            if !self.drop_tail_chunk() || n == 0 {
                return;
            }
        }
    }

    fn reserve_head(&mut self, n: usize) -> &mut [Cell] {
        let chunk = self.chunks.back_mut().unwrap();
        if chunk.buf.len() < chunk.head + n {
            chunk.buf.resize(chunk.head + n, 0);
        }
        let start = chunk.head;
        chunk.head += n;
        let slots = &mut chunk.buf[start..chunk.head];
        slots.fill(0);
        slots
    }

    fn reserve_tail(&mut self, n: usize) -> &mut [Cell] {
        let single = self.chunks.len() == 1;
        if self.chunks.front().unwrap().tail >= n {
            let front = self.chunks.front_mut().unwrap();
            front.tail -= n;
            let slots = &mut front.buf[front.tail..front.tail + n];
            slots.fill(0);
            return slots;
        }
        {
            let front = self.chunks.front().unwrap();
            if single && front.is_empty() && n <= front.buf.len() {
                // Recenter the lone chunk around the request.
                let front = self.chunks.front_mut().unwrap();
                front.head = n.max(front.buf.len() / 2);
                front.tail = front.head - n;
                let slots = &mut front.buf[front.tail..front.head];
                slots.fill(0);
                return slots;
            }
        }
        self.new_tail_chunk(n);
        let front = self.chunks.front_mut().unwrap();
        front.tail -= n;
        let slots = &mut front.buf[front.tail..front.tail + n];
        slots.fill(0);
        slots
    }

    fn map_first_n_head<F: FnMut(Run<'_>)>(&self, n: usize, f: &mut F) {
        let head_chunk = self.chunks.back().unwrap();
        if n <= head_chunk.len() {
            f(Run::Cells(
                &head_chunk.buf[head_chunk.head - n..head_chunk.head],
            ));
            return;
        }
        // The request spills below the head chunk: find the bottommost
        // chunk it reaches, then walk upward from there.
        let mut rem = n - head_chunk.len();
        let mut idx = self.chunks.len() - 1;
        while idx > 0 && rem > self.chunks[idx - 1].len() {
            rem -= self.chunks[idx - 1].len();
            idx -= 1;
        }
        if idx == 0 {
            f(Run::Shortfall(rem));
        } else {
            let partial = &self.chunks[idx - 1];
            f(Run::Cells(&partial.buf[partial.head - rem..partial.head]));
        }
        for chunk in self.chunks.iter().skip(idx) {
            f(Run::Cells(chunk.live()));
        }
    }

    fn map_first_n_tail<F: FnMut(Run<'_>)>(&self, n: usize, f: &mut F) {
        let mut rem = n;
        for chunk in &self.chunks {
            if rem <= chunk.len() {
                f(Run::Cells(&chunk.buf[chunk.tail..chunk.tail + rem]));
                return;
            }
            f(Run::Cells(chunk.live()));
            rem -= chunk.len();
        }
        f(Run::Shortfall(rem));
    }

    /// Make room for a tailward push of at least `min_size` cells, reusing
    /// the cached spare chunk when one is available.
    fn new_tail_chunk(&mut self, min_size: usize) {
        let front = self.chunks.front_mut().unwrap();
        if front.is_empty() {
            // Only reachable when the lone chunk is too small for the
            // request: regrow it in place, positioned at the far end.
            if front.buf.len() < min_size {
                front.buf.resize(min_size, 0);
            }
            front.head = front.buf.len();
            front.tail = front.buf.len();
            return;
        }
        let mut chunk = match self.spare_tail.take() {
            Some(mut spare) => {
                if spare.buf.len() < min_size {
                    spare.buf.resize(min_size, 0);
                }
                spare
            }
            None => Chunk::with_capacity(min_size.max(NEW_TAIL_SIZE)),
        };
        chunk.head = chunk.buf.len();
        chunk.tail = chunk.buf.len();
        self.chunks.push_front(chunk);
    }

    /// Returns false when only the lone chunk remained, which is reset
    /// instead of dropped.
    fn drop_head_chunk(&mut self) -> bool {
        if self.chunks.len() == 1 {
            let only = self.chunks.front_mut().unwrap();
            only.head = 0;
            only.tail = 0;
            return false;
        }
        self.chunks.pop_back();
        true
    }

    /// As `drop_head_chunk`, but the retired chunk replaces the cached
    /// spare so boundary churn can reuse it.
    fn drop_tail_chunk(&mut self) -> bool {
        if self.chunks.len() == 1 {
            let only = self.chunks.front_mut().unwrap();
            only.head = only.buf.len();
            only.tail = only.buf.len();
            return false;
        }
        let mut retired = self.chunks.pop_front().unwrap();
        retired.head = retired.buf.len();
        retired.tail = retired.buf.len();
        self.spare_tail = Some(retired);
        true
    }

    #[cfg(test)]
    fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    #[cfg(test)]
    fn has_spare(&self) -> bool {
        self.spare_tail.is_some()
    }
}
