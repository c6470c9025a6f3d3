//! Localization-quality predicate.
//!
//! Pure and stateless: safe to call from any context without synchronization.

use crate::pose::PoseSample;

/// Decide whether the device pose is accurate enough to be trusted.
///
/// True iff `is_tracking` and every accuracy metric (horizontal, vertical, yaw)
/// is strictly below `threshold`. A metric exactly at the threshold fails.
pub fn is_localized(pose: &PoseSample, is_tracking: bool, threshold: f64) -> bool {
    is_tracking
        && pose.horizontal_accuracy < threshold
        && pose.vertical_accuracy < threshold
        && pose.yaw_accuracy < threshold
}
