/// Cyclic frame counter over a frame set of fixed size.
///
/// An empty set is allowed: the counter then stays at 0 and reports no frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameCycle {
    pub frame: usize,
    len: usize,
}

impl FrameCycle {
    pub fn new(len: usize) -> Self {
        Self { frame: 0, len }
    }

    pub fn reset(&mut self) {
        self.frame = 0;
    }

    pub fn advance(&mut self) {
        if self.len == 0 {
            return;
        }
        self.frame = (self.frame + 1) % self.len;
    }

    pub fn current(&self) -> Option<usize> {
        (self.len > 0).then_some(self.frame)
    }

    pub fn last(&self) -> Option<usize> {
        self.len.checked_sub(1)
    }
}
