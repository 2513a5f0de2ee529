//! Percent-based progress reporting shared by parsing and encoding.

/// Forwards percentages in `[0, 100]` to an optional caller sink, never letting the reported
/// value go backwards.
pub struct ProgressTracker<'a> {
    sink: Option<&'a mut dyn FnMut(f64)>,
    last: f64,
}

impl<'a> ProgressTracker<'a> {
    pub fn new(sink: Option<&'a mut dyn FnMut(f64)>) -> Self {
        Self { sink, last: 0.0 }
    }

    pub fn silent() -> Self {
        Self::new(None)
    }

    /// Report `pct`, clamped to `[0, 100]`. Values below the last report are raised to it.
    pub fn report(&mut self, pct: f64) {
        let pct = if pct.is_nan() { self.last } else { pct.clamp(0.0, 100.0) };
        let pct = pct.max(self.last);
        self.last = pct;
        if let Some(sink) = self.sink.as_mut() {
            sink(pct);
        }
    }

    /// Report `fraction` of the way through the band `[lo, hi]`.
    pub fn report_within(&mut self, lo: f64, hi: f64, fraction: f64) {
        let f = crate::foundation::math::clamp01(fraction);
        self.report(lo + (hi - lo) * f);
    }

    pub fn last(&self) -> f64 {
        self.last
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/progress.rs"]
mod tests;
