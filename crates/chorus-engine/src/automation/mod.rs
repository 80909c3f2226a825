//! Gain-automation curves built from a duration/gain schedule.
//!
//! Each segment's level is held flat until `fade` seconds before the next
//! boundary, then ramps to the next level by the boundary itself. The first
//! and last levels appear once; every interior level appears twice. A track
//! built from `n` segments therefore has `2n` breakpoints per channel.
//!
//! ```text
//! level  g0 ─────────╮             ╭──── g2 ───────┤
//!                    ╰── g1 ───────╯
//! time   0      b1-f  b1      b2-f  b2            b3
//! ```

mod envelope;

pub use envelope::{db_to_linear, EnvelopeExpression};

use chorus_spec::validation::validate_non_negative;
use chorus_spec::{GainPoint, ScheduleError, Segment};
use serde::Serialize;

/// A gain vector pinned to a time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakpoint {
    pub time_secs: f64,
    pub gain: GainPoint,
}

/// Time-ordered breakpoints for every output channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutomationTrack {
    breakpoints: Vec<Breakpoint>,
    channel_count: usize,
}

impl AutomationTrack {
    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.breakpoints
    }

    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// Time of the last breakpoint.
    pub fn duration_secs(&self) -> f64 {
        self.breakpoints.last().map(|b| b.time_secs).unwrap_or(0.0)
    }

    /// `(time, dB)` pairs for one channel.
    pub fn channel(&self, channel: usize) -> Vec<(f64, f64)> {
        self.breakpoints
            .iter()
            .filter_map(|b| b.gain.get(channel).map(|db| (b.time_secs, db)))
            .collect()
    }

    /// One expression per consecutive breakpoint pair on `channel`.
    pub fn envelopes(&self, channel: usize, floor_db: f64) -> Vec<EnvelopeExpression> {
        let points = self.channel(channel);
        let last_pair = points.len().saturating_sub(2);
        points
            .windows(2)
            .enumerate()
            .map(|(i, pair)| {
                let (t1, v1) = pair[0];
                let (t2, v2) = pair[1];
                EnvelopeExpression::new(t1, t2, v1, v2, floor_db, i == last_pair)
            })
            .collect()
    }
}

/// Compiles a schedule into a crossfaded automation track.
///
/// Each interior boundary gets an extra breakpoint at `boundary - fade`
/// holding the old level. That fade start is clamped to the previous
/// boundary so ramps never overlap and never begin before time 0.
pub fn compile_automation(
    segments: &[Segment],
    gains: &[GainPoint],
    fade_secs: f64,
) -> Result<AutomationTrack, ScheduleError> {
    validate_non_negative("fade_secs", fade_secs)?;
    if segments.is_empty() {
        return Err(ScheduleError::EmptySchedule);
    }
    if segments.len() != gains.len() {
        return Err(ScheduleError::LengthMismatch {
            segments: segments.len(),
            gains: gains.len(),
        });
    }
    let channel_count = gains[0].channel_count();
    for (index, gain) in gains.iter().enumerate() {
        if gain.channel_count() != channel_count || channel_count == 0 {
            return Err(ScheduleError::ChannelMismatch {
                index,
                expected: channel_count.max(1),
                actual: gain.channel_count(),
            });
        }
    }
    for segment in segments {
        validate_non_negative("segment length", segment.length_secs)?;
    }

    let n = segments.len();
    let mut breakpoints = Vec::with_capacity(2 * n);
    breakpoints.push(Breakpoint {
        time_secs: 0.0,
        gain: gains[0].clone(),
    });

    let mut previous_boundary = 0.0;
    let mut boundary = 0.0;
    for (i, segment) in segments.iter().enumerate() {
        boundary += segment.length_secs;
        if i + 1 < n {
            let fade_start = (boundary - fade_secs).max(previous_boundary);
            breakpoints.push(Breakpoint {
                time_secs: fade_start,
                gain: gains[i].clone(),
            });
            breakpoints.push(Breakpoint {
                time_secs: boundary,
                gain: gains[i + 1].clone(),
            });
        } else {
            breakpoints.push(Breakpoint {
                time_secs: boundary,
                gain: gains[i].clone(),
            });
        }
        previous_boundary = boundary;
    }

    Ok(AutomationTrack {
        breakpoints,
        channel_count,
    })
}
