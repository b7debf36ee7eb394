use serde::{Deserialize, Serialize};

use crate::{metrics, utils::Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Optimizer {
    Adam,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Loss {
    BinaryCrossEntropy,
}

/// Scoring functions attached to a compiled model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Metric {
    Iou,
    DiceCoef,
    IouThresholded,
}

impl Metric {
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Iou => "iou",
            Metric::DiceCoef => "dice_coef",
            Metric::IouThresholded => "iou_thresholded",
        }
    }

    pub fn score(&self, y_true: &[f32], y_pred: &[f32]) -> Result<f32> {
        match self {
            Metric::Iou => metrics::iou(y_true, y_pred),
            Metric::DiceCoef => metrics::dice_coef(y_true, y_pred),
            Metric::IouThresholded => metrics::iou_thresholded(y_true, y_pred),
        }
    }
}

impl Optimizer {
    pub fn name(&self) -> &'static str {
        match self {
            Optimizer::Adam => "Adam",
        }
    }
}

impl Loss {
    pub fn name(&self) -> &'static str {
        match self {
            Loss::BinaryCrossEntropy => "binary_crossentropy",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompileConfig {
    pub optimizer: Optimizer,
    pub loss: Loss,
    pub metrics: Vec<Metric>,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            optimizer: Optimizer::Adam,
            loss: Loss::BinaryCrossEntropy,
            metrics: vec![Metric::Iou, Metric::DiceCoef, Metric::IouThresholded],
        }
    }
}
