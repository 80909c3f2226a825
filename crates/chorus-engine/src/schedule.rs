//! Randomized duration, volume and pitch schedules.
//!
//! All generators take the random source as an argument and validate their
//! bounds first, so a bad bound surfaces as a [`ScheduleError`] before any
//! job is built.

use chorus_spec::validation::{validate_ordered, validate_positive, validate_unit_interval};
use chorus_spec::{ChorusConfig, GainPoint, ScheduleError, Segment};
use rand::Rng;
use serde::Serialize;
use tracing::debug;

/// Segments and their gain levels for one asset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schedule {
    pub segments: Vec<Segment>,
    pub gains: Vec<GainPoint>,
}

/// Generates the duration and gain schedule for an asset of `duration_secs`.
pub fn generate_schedule<R: Rng + ?Sized>(
    rng: &mut R,
    duration_secs: f64,
    config: &ChorusConfig,
) -> Result<Schedule, ScheduleError> {
    let segments = generate_durations(
        rng,
        duration_secs,
        config.min_segment_secs,
        config.max_segment_secs,
    )?;
    let gains = generate_gains(
        rng,
        segments.len(),
        usize::from(config.channels),
        config.quietest_db,
        config.loudest_db,
        config.silence_probability,
    )?;
    Ok(Schedule { segments, gains })
}

/// Splits `total_secs` into uniformly drawn segments of `[min_secs, max_secs]`.
///
/// Draws accumulate until the running total exceeds `total_secs`; the last
/// segment is then shortened by the overshoot so the sequence sums to
/// `total_secs`. A last segment that ends up exactly zero long is dropped.
pub fn generate_durations<R: Rng + ?Sized>(
    rng: &mut R,
    total_secs: f64,
    min_secs: f64,
    max_secs: f64,
) -> Result<Vec<Segment>, ScheduleError> {
    validate_positive("total_secs", total_secs)?;
    validate_positive("min_segment_secs", min_secs)?;
    validate_ordered(("min_segment_secs", min_secs), ("max_segment_secs", max_secs))?;

    let mut segments = Vec::new();
    let mut running = 0.0;
    let mut before_last = 0.0;
    while running <= total_secs {
        let length = rng.gen_range(min_secs..=max_secs);
        segments.push(Segment::new(length));
        before_last = running;
        running += length;
    }

    let overshoot = running - total_secs;
    // Shorten by the overshoot, computed against the pre-draw total to keep
    // the sum exact. The loop only draws while the total is not exceeded, so
    // `before_last <= total_secs` and the last segment is never negative,
    // however large a single draw is relative to `min_secs`.
    let remaining = total_secs - before_last;
    debug_assert!(remaining >= 0.0);

    if remaining > 0.0 || segments.len() == 1 {
        if let Some(last) = segments.last_mut() {
            last.length_secs = remaining;
        }
    } else {
        segments.pop();
    }

    debug!(
        total_secs,
        overshoot,
        count = segments.len(),
        "generated duration schedule"
    );
    Ok(segments)
}

/// Draws `count` gain points of `channel_count` channels each.
///
/// Every channel is uniform in `[quietest_db, loudest_db]`. Independently,
/// with probability `silence_probability`, the whole point is muted; channels
/// are never silenced one at a time.
pub fn generate_gains<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    channel_count: usize,
    quietest_db: f64,
    loudest_db: f64,
    silence_probability: f64,
) -> Result<Vec<GainPoint>, ScheduleError> {
    validate_ordered(("quietest_db", quietest_db), ("loudest_db", loudest_db))?;
    validate_unit_interval("silence_probability", silence_probability)?;
    validate_positive("channels", channel_count as f64)?;

    let gains = (0..count)
        .map(|_| {
            let values: Vec<f64> = (0..channel_count)
                .map(|_| rng.gen_range(quietest_db..=loudest_db))
                .collect();
            if rng.gen_bool(silence_probability) {
                GainPoint::silent(channel_count)
            } else {
                GainPoint::new(values)
            }
        })
        .collect();
    Ok(gains)
}

/// Draws `count` playback-rate ratios in `[lowest_ratio, highest_ratio]`.
///
/// Multiplying a ratio by the reference sample rate gives the rate the audio
/// is reinterpreted at, which shifts pitch and duration together.
pub fn generate_pitch_factors<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    lowest_ratio: f64,
    highest_ratio: f64,
) -> Result<Vec<f64>, ScheduleError> {
    validate_positive("lowest_pitch_ratio", lowest_ratio)?;
    validate_ordered(
        ("lowest_pitch_ratio", lowest_ratio),
        ("highest_pitch_ratio", highest_ratio),
    )?;

    Ok((0..count)
        .map(|_| rng.gen_range(lowest_ratio..=highest_ratio))
        .collect())
}

/// Converts a pitch factor into an integer playback rate.
pub fn pitch_rate(factor: f64, reference_rate: u32) -> u32 {
    (factor * f64::from(reference_rate)).round().max(1.0) as u32
}
