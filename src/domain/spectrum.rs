//! Angle spectrum: where the children of a branch point to.

use tracing::trace;

use crate::domain::error::{DomainError, DomainResult};

/// Generate the angles for the children of a branch.
///
/// The `num_children` angles are evenly spaced over the closed interval
/// `[parent_angle - w/2, parent_angle + w/2]` with `w = (num_children - 1) * delta_angle`,
/// so neighbouring angles are exactly `delta_angle` apart and the set is symmetric
/// around `parent_angle`.
///
/// - `num_children == 0` yields an empty spectrum
/// - `num_children == 1` yields exactly `[parent_angle]`
/// - a negative `delta_angle` yields a descending spectrum
///
/// # Errors
/// `DomainError::InvalidArgument` if `num_children < 0`.
pub fn angle_spectrum(
    parent_angle: f64,
    delta_angle: f64,
    num_children: i32,
) -> DomainResult<Vec<f64>> {
    let count = checked_count(num_children)?;
    let spectrum = spread(parent_angle, delta_angle, count);
    trace!(parent_angle, delta_angle, count, "angle spectrum");
    Ok(spectrum)
}

/// Validate a signed child count coming from the outside world.
pub(crate) fn checked_count(num_children: i32) -> DomainResult<usize> {
    usize::try_from(num_children).map_err(|_| DomainError::InvalidArgument {
        name: "num_children",
        value: i64::from(num_children),
    })
}

/// Linear spacing over the spectrum interval, endpoints included.
pub(crate) fn spread(parent_angle: f64, delta_angle: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![parent_angle],
        _ => {
            let half_range = (count - 1) as f64 * delta_angle / 2.0;
            let first = parent_angle - half_range;
            let last = parent_angle + half_range;
            let step = (last - first) / (count - 1) as f64;
            let mut angles: Vec<f64> = (0..count).map(|i| first + i as f64 * step).collect();
            // pin the endpoint, accumulated rounding must not move it
            angles[count - 1] = last;
            angles
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spread_pins_both_endpoints() {
        let angles = spread(0.25, 0.5, 5);
        assert_eq!(angles, vec![-0.75, -0.25, 0.25, 0.75, 1.25]);
    }

    #[test]
    fn checked_count_rejects_negative() {
        assert_eq!(
            checked_count(-1),
            Err(DomainError::InvalidArgument {
                name: "num_children",
                value: -1
            })
        );
        assert_eq!(checked_count(4), Ok(4));
    }
}
