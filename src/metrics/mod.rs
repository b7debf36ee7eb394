//! Segmentation scores over flattened (ground truth, prediction) masks.
//!
//! All three use a smoothing term of 1 so empty masks score 1 rather than
//! dividing by zero.

use crate::utils::{Result, UNetError};

const SMOOTH: f32 = 1.0;
const THRESHOLD: f32 = 0.5;

fn check_lengths(y_true: &[f32], y_pred: &[f32]) -> Result<()> {
    if y_true.len() != y_pred.len() {
        return Err(UNetError::shape_mismatch(
            "metric inputs",
            &[y_true.len()],
            &[y_pred.len()],
        ));
    }
    Ok(())
}

/// Jaccard index, `(|t·p| + s) / (|t| + |p| - |t·p| + s)`.
pub fn iou(y_true: &[f32], y_pred: &[f32]) -> Result<f32> {
    check_lengths(y_true, y_pred)?;

    let intersection: f32 = y_true.iter().zip(y_pred).map(|(t, p)| (t * p).abs()).sum();
    let sum: f32 = y_true.iter().zip(y_pred).map(|(t, p)| t.abs() + p.abs()).sum();

    Ok((intersection + SMOOTH) / (sum - intersection + SMOOTH))
}

/// `iou` after binarising predictions at 0.5.
pub fn iou_thresholded(y_true: &[f32], y_pred: &[f32]) -> Result<f32> {
    let binarised: Vec<f32> = y_pred.iter().map(|&p| threshold_binarize(p, THRESHOLD)).collect();
    iou(y_true, &binarised)
}

/// Sørensen-Dice coefficient, `(2·Σ(t·p) + s) / (Σt + Σp + s)`.
pub fn dice_coef(y_true: &[f32], y_pred: &[f32]) -> Result<f32> {
    check_lengths(y_true, y_pred)?;

    let intersection: f32 = y_true.iter().zip(y_pred).map(|(t, p)| t * p).sum();
    let sum_true: f32 = y_true.iter().sum();
    let sum_pred: f32 = y_pred.iter().sum();

    Ok((2.0 * intersection + SMOOTH) / (sum_true + sum_pred + SMOOTH))
}

fn threshold_binarize(value: f32, threshold: f32) -> f32 {
    (value - threshold + 0.5).clamp(0.0, 1.0).round()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn perfect_overlap_scores_one() {
        let mask = [1.0, 1.0, 0.0, 0.0];
        assert!(close(iou(&mask, &mask).unwrap(), 1.0));
        assert!(close(dice_coef(&mask, &mask).unwrap(), 1.0));
    }

    #[test]
    fn disjoint_masks_score_low() {
        let t = [1.0, 1.0, 0.0, 0.0];
        let p = [0.0, 0.0, 1.0, 1.0];
        // (0 + 1) / (4 - 0 + 1)
        assert!(close(iou(&t, &p).unwrap(), 0.2));
        // (0 + 1) / (2 + 2 + 1)
        assert!(close(dice_coef(&t, &p).unwrap(), 0.2));
    }

    #[test]
    fn empty_masks_score_one() {
        let empty = [0.0; 8];
        assert!(close(iou(&empty, &empty).unwrap(), 1.0));
        assert!(close(dice_coef(&empty, &empty).unwrap(), 1.0));
    }

    #[test]
    fn thresholding_snaps_soft_predictions() {
        let t = [1.0, 0.0, 1.0, 0.0];
        let p = [0.9, 0.2, 0.6, 0.4];
        assert!(close(iou_thresholded(&t, &p).unwrap(), 1.0));
        assert!(iou(&t, &p).unwrap() < 1.0);
    }

    #[test]
    fn length_mismatch_is_an_error() {
        assert!(matches!(
            iou(&[1.0, 0.0], &[1.0]),
            Err(UNetError::ShapeMismatch { .. })
        ));
        assert!(dice_coef(&[1.0], &[]).is_err());
    }
}
