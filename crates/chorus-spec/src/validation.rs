//! Numeric bound checks shared by configuration and schedule generation.
//!
//! Every check returns a [`ScheduleError`] so a bad bound is rejected before
//! any job is built.

use crate::error::ScheduleError;

/// Validate that a value is finite.
pub fn validate_finite(name: &'static str, value: f64) -> Result<(), ScheduleError> {
    if !value.is_finite() {
        return Err(ScheduleError::NotFinite { name, value });
    }
    Ok(())
}

/// Validate that a value is finite and strictly positive.
///
/// # Example
/// ```
/// use chorus_spec::validation::validate_positive;
///
/// assert!(validate_positive("fade_secs", 0.5).is_ok());
/// assert!(validate_positive("fade_secs", 0.0).is_err());
/// ```
pub fn validate_positive(name: &'static str, value: f64) -> Result<(), ScheduleError> {
    validate_finite(name, value)?;
    if value <= 0.0 {
        return Err(ScheduleError::NotPositive { name, value });
    }
    Ok(())
}

/// Validate that a value is finite and not negative.
pub fn validate_non_negative(name: &'static str, value: f64) -> Result<(), ScheduleError> {
    validate_finite(name, value)?;
    if value < 0.0 {
        return Err(ScheduleError::OutOfRange {
            name,
            value,
            min: 0.0,
            max: f64::INFINITY,
        });
    }
    Ok(())
}

/// Validate that a value lies in `[min, max]`.
pub fn validate_range(
    name: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), ScheduleError> {
    validate_finite(name, value)?;
    if !(min..=max).contains(&value) {
        return Err(ScheduleError::OutOfRange {
            name,
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Validate that a value is a probability in `[0, 1]`.
pub fn validate_unit_interval(name: &'static str, value: f64) -> Result<(), ScheduleError> {
    validate_range(name, value, 0.0, 1.0)
}

/// Validate that `lower <= upper`, both finite.
///
/// # Example
/// ```
/// use chorus_spec::validation::validate_ordered;
///
/// assert!(validate_ordered(("min", 2.0), ("max", 5.0)).is_ok());
/// assert!(validate_ordered(("min", 5.0), ("max", 2.0)).is_err());
/// ```
pub fn validate_ordered(
    lower: (&'static str, f64),
    upper: (&'static str, f64),
) -> Result<(), ScheduleError> {
    validate_finite(lower.0, lower.1)?;
    validate_finite(upper.0, upper.1)?;
    if lower.1 > upper.1 {
        return Err(ScheduleError::InvertedBounds {
            lower_name: lower.0,
            lower: lower.1,
            upper_name: upper.0,
            upper: upper.1,
        });
    }
    Ok(())
}
