//! Monotonic 0-100 progress reporting over segments.

/// Turns completed-segment counts into percentages for a caller hook.
///
/// Values never decrease. Segment completion tops out at 99; 100 is emitted
/// only by [`ProgressReporter::finish`], once the result is assembled.
pub struct ProgressReporter<'a> {
    callback: &'a mut dyn FnMut(u8),
    total: usize,
    completed: usize,
    last: u8,
}

impl<'a> ProgressReporter<'a> {
    /// Create a reporter and emit 0.
    pub fn start(callback: &'a mut dyn FnMut(u8)) -> Self {
        let mut reporter = Self {
            callback,
            total: 0,
            completed: 0,
            last: 0,
        };
        reporter.emit(0);
        reporter
    }

    pub fn set_total(&mut self, total: usize) {
        self.total = total;
    }

    pub fn segment_done(&mut self) {
        self.completed += 1;
        if self.total == 0 {
            return;
        }
        let percent = (self.completed.min(self.total) * 100 / self.total).min(99) as u8;
        self.emit(percent);
    }

    pub fn finish(mut self) {
        self.emit(100);
    }

    fn emit(&mut self, percent: u8) {
        let percent = percent.max(self.last);
        self.last = percent;
        (self.callback)(percent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_sequence() {
        let mut seen = Vec::new();
        let mut hook = |p: u8| seen.push(p);
        let mut reporter = ProgressReporter::start(&mut hook);
        reporter.set_total(4);
        for _ in 0..4 {
            reporter.segment_done();
        }
        reporter.finish();

        assert_eq!(seen, vec![0, 25, 50, 75, 99, 100]);
    }

    #[test]
    fn test_progress_without_segments() {
        let mut seen = Vec::new();
        let mut hook = |p: u8| seen.push(p);
        ProgressReporter::start(&mut hook).finish();
        assert_eq!(seen, vec![0, 100]);
    }
}
