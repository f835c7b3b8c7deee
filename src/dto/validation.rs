//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that every group can hold at least one project.
///
/// # Examples
///
/// ```ignore
/// validate_group_sizes(&[30, 12]) // Ok
/// validate_group_sizes(&[30, 0])  // Err - empty group
/// ```
pub fn validate_group_sizes(sizes: &[i64]) -> Result<(), ValidationError> {
    if let Some((index, size)) = sizes.iter().enumerate().find(|(_, size)| **size < 1) {
        let mut err = ValidationError::new("group_size_range");
        err.message = Some(
            format!("Group {} must hold at least one project (got {size})", index + 1).into(),
        );
        return Err(err);
    }

    Ok(())
}

/// Validates that a proportion is a finite number in `[0, 1]`.
///
/// Range checks alone let NaN through since every comparison with it is false.
pub fn validate_proportion(value: &f64) -> Result<(), ValidationError> {
    if value.is_finite() && (0.0..=1.0).contains(value) {
        return Ok(());
    }

    let mut err = ValidationError::new("proportion_range");
    err.message = Some(format!("Proportion must be between 0 and 1 (got {value})").into());
    Err(err)
}

/// Validates that track names are non-blank and unique.
pub fn validate_tracks(tracks: &[String]) -> Result<(), ValidationError> {
    if tracks.iter().any(|track| track.trim().is_empty()) {
        let mut err = ValidationError::new("track_blank");
        err.message = Some("Track names must not be blank".into());
        return Err(err);
    }

    for (index, track) in tracks.iter().enumerate() {
        if tracks[..index].contains(track) {
            let mut err = ValidationError::new("track_duplicate");
            err.message = Some(format!("Track `{track}` is listed more than once").into());
            return Err(err);
        }
    }

    Ok(())
}
