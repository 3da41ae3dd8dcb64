use serde::{Deserialize, Serialize};

/// Ripeness class assigned to a single detected object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    #[serde(alias = "green")]
    Immature,
    #[serde(alias = "breaker", alias = "turning")]
    Ripening,
    #[serde(alias = "red", alias = "ripe")]
    Mature,
    Flower,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Immature => "Immature",
            Stage::Ripening => "Ripening",
            Stage::Mature => "Mature",
            Stage::Flower => "Flower",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "immature" | "green" => Some(Stage::Immature),
            "ripening" | "breaker" | "turning" => Some(Stage::Ripening),
            "mature" | "red" | "ripe" => Some(Stage::Mature),
            "flower" => Some(Stage::Flower),
            _ => None,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whole-plant summary label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GrowthStage {
    #[default]
    Immature,
    Ripening,
    Mature,
}

impl GrowthStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrowthStage::Immature => "Immature",
            GrowthStage::Ripening => "Ripening",
            GrowthStage::Mature => "Mature",
        }
    }
}

impl std::fmt::Display for GrowthStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionBox {
    /// [x1, y1, x2, y2] as image percentages
    #[serde(rename = "box")]
    pub bbox: [f64; 4],
    pub stage: Stage,
}

impl DetectionBox {
    pub fn new(bbox: [f64; 4], stage: Stage) -> Self {
        Self { bbox, stage }
    }

    pub fn area(&self) -> f64 {
        let [x1, y1, x2, y2] = self.bbox;
        (x2 - x1) * (y2 - y1)
    }
}

/// Per-stage counts as reported upstream. Signed because the model output is
/// not trusted to be well formed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCounts {
    #[serde(default)]
    pub immature: i64,
    #[serde(default)]
    pub ripening: i64,
    #[serde(default)]
    pub mature: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flower: Option<i64>,
}

/// Non-negative fruit counts the forecast engine works from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FruitCounts {
    pub immature: u64,
    pub ripening: u64,
    pub mature: u64,
    pub flower: u64,
}

impl FruitCounts {
    /// Fruit only; flowers are not fruit yet
    pub fn total_fruit(&self) -> u64 {
        self.immature
            .saturating_add(self.ripening)
            .saturating_add(self.mature)
    }
}

impl StageCounts {
    pub fn new(immature: i64, ripening: i64, mature: i64) -> Self {
        Self {
            immature,
            ripening,
            mature,
            flower: None,
        }
    }

    pub fn with_flower(mut self, flower: i64) -> Self {
        self.flower = Some(flower);
        self
    }

    pub fn increment(&mut self, stage: Stage) {
        match stage {
            Stage::Immature => self.immature += 1,
            Stage::Ripening => self.ripening += 1,
            Stage::Mature => self.mature += 1,
            Stage::Flower => *self.flower.get_or_insert(0) += 1,
        }
    }

    pub fn fruit_total(&self) -> i64 {
        self.immature
            .saturating_add(self.ripening)
            .saturating_add(self.mature)
    }

    /// Clamp negative counts to zero, describing every correction made.
    pub fn sanitized(&self) -> (FruitCounts, Vec<String>) {
        let mut notes = Vec::new();
        let mut clamp = |label: &str, value: i64| -> u64 {
            if value < 0 {
                notes.push(format!(
                    "Detection reported a negative {} count ({}); treated as 0.",
                    label, value
                ));
                0
            } else {
                value as u64
            }
        };

        let counts = FruitCounts {
            immature: clamp("immature", self.immature),
            ripening: clamp("ripening", self.ripening),
            mature: clamp("mature", self.mature),
            flower: clamp("flower", self.flower.unwrap_or(0)),
        };

        (counts, notes)
    }
}

/// Snapshot from one analyzed plant image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    #[serde(default)]
    pub plant_id: i64,
    #[serde(default)]
    pub detections: i64,
    #[serde(default)]
    pub boxes: Vec<DetectionBox>,
    #[serde(default)]
    pub stage_counts: StageCounts,
    #[serde(default)]
    pub growth_stage: GrowthStage,
    #[serde(default)]
    pub avg_bbox_area: f64,
    /// `None` when the model did not report a confidence
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl DetectionResult {
    /// Build from per-object boxes, deriving counts and summary values.
    pub fn from_boxes(
        plant_id: i64,
        boxes: Vec<DetectionBox>,
        confidence: Option<f64>,
        image_url: impl Into<String>,
    ) -> Self {
        let mut stage_counts = StageCounts::default();
        for b in &boxes {
            stage_counts.increment(b.stage);
        }

        let detections = boxes.len() as i64;
        let growth_stage = if stage_counts.mature as f64 > detections as f64 / 2.0 {
            GrowthStage::Mature
        } else if stage_counts.ripening as f64 > detections as f64 / 3.0 {
            GrowthStage::Ripening
        } else {
            GrowthStage::Immature
        };

        let avg_bbox_area = if boxes.is_empty() {
            0.0
        } else {
            boxes.iter().map(DetectionBox::area).sum::<f64>() / boxes.len() as f64
        };

        Self {
            plant_id,
            detections,
            boxes,
            stage_counts,
            growth_stage,
            avg_bbox_area,
            confidence: confidence.filter(|c| c.is_finite()).map(|c| c.clamp(0.0, 1.0)),
            image_url: image_url.into(),
            summary: None,
        }
    }

    /// Build from the count-only analysis variant (no boxes, no confidence).
    pub fn from_counts(
        plant_id: i64,
        stage_counts: StageCounts,
        summary: Option<String>,
        image_url: impl Into<String>,
    ) -> Self {
        let growth_stage = if stage_counts.mature > stage_counts.immature {
            GrowthStage::Mature
        } else {
            GrowthStage::Ripening
        };

        Self {
            plant_id,
            detections: stage_counts.fruit_total(),
            boxes: Vec::new(),
            stage_counts,
            growth_stage,
            avg_bbox_area: 0.0,
            confidence: None,
            image_url: image_url.into(),
            summary,
        }
    }

    /// Fixed sample plant used when the detection model is switched off.
    pub fn demo(plant_id: i64, image_url: impl Into<String>) -> Self {
        let boxes = vec![
            DetectionBox::new([12.0, 18.0, 24.0, 30.0], Stage::Immature),
            DetectionBox::new([30.0, 22.0, 41.0, 33.0], Stage::Immature),
            DetectionBox::new([48.0, 15.0, 58.0, 26.0], Stage::Immature),
            DetectionBox::new([62.0, 40.0, 73.0, 52.0], Stage::Immature),
            DetectionBox::new([20.0, 55.0, 31.0, 66.0], Stage::Immature),
            DetectionBox::new([35.0, 48.0, 47.0, 60.0], Stage::Ripening),
            DetectionBox::new([52.0, 60.0, 64.0, 72.0], Stage::Ripening),
            DetectionBox::new([70.0, 20.0, 81.0, 31.0], Stage::Ripening),
            DetectionBox::new([15.0, 70.0, 27.0, 82.0], Stage::Ripening),
            DetectionBox::new([40.0, 72.0, 53.0, 85.0], Stage::Mature),
            DetectionBox::new([60.0, 78.0, 72.0, 90.0], Stage::Mature),
            DetectionBox::new([76.0, 58.0, 88.0, 70.0], Stage::Mature),
        ];
        Self::from_boxes(plant_id, boxes, None, image_url)
    }

    pub fn confidence_is_known(&self) -> bool {
        self.confidence.is_some()
    }
}
