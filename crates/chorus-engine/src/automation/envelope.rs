//! Closed-form gain ramps for the engine's expression language.
//!
//! One [`EnvelopeExpression`] covers one pair of consecutive breakpoints on
//! one channel. Inside its interval the level moves linearly in dB from the
//! start value to the end value; outside it the expression evaluates to a
//! unity multiplier, so chaining every expression of a channel as successive
//! gain stages yields the whole curve.

use chorus_spec::is_silent_db;
use serde::Serialize;

/// A gain ramp between two `(time, dB)` breakpoints.
///
/// Values are stored already prepared for the engine: silence replaced by a
/// finite floor, dB rounded to whole units, times rounded to 0.1 s.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnvelopeExpression {
    pub start_secs: f64,
    pub end_secs: f64,
    pub start_db: f64,
    pub end_db: f64,
    /// Whether the interval includes its end time. Only the last ramp of a
    /// channel does, so adjacent ramps never both apply at a shared boundary.
    pub closed_end: bool,
}

impl EnvelopeExpression {
    /// Prepares a ramp from raw breakpoint values.
    ///
    /// `floor_db` is substituted for silent endpoints and also bounds any
    /// quieter value.
    pub fn new(
        t1: f64,
        t2: f64,
        v1: f64,
        v2: f64,
        floor_db: f64,
        closed_end: bool,
    ) -> Self {
        let start_secs = round_time(t1);
        Self {
            start_secs,
            end_secs: round_time(t2).max(start_secs),
            start_db: prepare_db(v1, floor_db),
            end_db: prepare_db(v2, floor_db),
            closed_end,
        }
    }

    /// Length of the interval in seconds.
    pub fn span_secs(&self) -> f64 {
        self.end_secs - self.start_secs
    }

    /// True if `t` falls inside the interval.
    pub fn contains(&self, t: f64) -> bool {
        if self.closed_end {
            t >= self.start_secs && t <= self.end_secs
        } else {
            t >= self.start_secs && t < self.end_secs
        }
    }

    /// The interpolated level at `t`, clamped to the interval.
    ///
    /// Returns `start_db` at `start_secs` and `end_db` at `end_secs`.
    pub fn interpolate_db(&self, t: f64) -> f64 {
        let span = self.span_secs();
        if span <= 0.0 {
            return self.end_db;
        }
        let t = t.clamp(self.start_secs, self.end_secs);
        if t >= self.end_secs {
            return self.end_db;
        }
        self.start_db + (self.end_db - self.start_db) * (t - self.start_secs) / span
    }

    /// The level at `t`, or `None` outside the interval.
    pub fn gain_db_at(&self, t: f64) -> Option<f64> {
        self.contains(t).then(|| self.interpolate_db(t))
    }

    /// The linear multiplier the rendered expression yields at `t`.
    pub fn multiplier_at(&self, t: f64) -> f64 {
        self.gain_db_at(t).map(db_to_linear).unwrap_or(1.0)
    }

    /// Renders the expression for a per-frame `volume` filter.
    ///
    /// ```
    /// use chorus_engine::automation::EnvelopeExpression;
    ///
    /// let ramp = EnvelopeExpression::new(4.5, 5.0, -6.0, f64::NEG_INFINITY, -120.0, false);
    /// assert_eq!(
    ///     ramp.render(),
    ///     "if(gte(t,4.5)*lt(t,5.0),pow(10,((-6)+(-114)*(t-4.5)/(0.5))/20),1)"
    /// );
    /// ```
    pub fn render(&self) -> String {
        let upper = if self.closed_end { "lte" } else { "lt" };
        let condition = format!(
            "gte(t,{:.1})*{}(t,{:.1})",
            self.start_secs, upper, self.end_secs
        );
        let delta = self.end_db - self.start_db;
        let span = self.span_secs();
        let level = if delta == 0.0 || span <= 0.0 {
            format!("({})", format_db(self.end_db))
        } else {
            format!(
                "(({})+({})*(t-{:.1})/({:.1}))",
                format_db(self.start_db),
                format_db(delta),
                self.start_secs,
                span
            )
        };
        format!("if({},pow(10,{}/20),1)", condition, level)
    }
}

/// Converts a dB level to a linear amplitude multiplier.
pub fn db_to_linear(db: f64) -> f64 {
    10f64.powf(db / 20.0)
}

fn prepare_db(value: f64, floor_db: f64) -> f64 {
    let value = if is_silent_db(value) { floor_db } else { value };
    // Adding 0.0 turns -0 into 0 so it never renders as "-0".
    value.max(floor_db).round() + 0.0
}

fn round_time(t: f64) -> f64 {
    (t * 10.0).round() / 10.0
}

fn format_db(db: f64) -> String {
    format!("{:.0}", db + 0.0)
}
