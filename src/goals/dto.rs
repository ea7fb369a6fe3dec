use serde::{Deserialize, Serialize};

use crate::nutrition::Macros;

/// Daily targets. Always sent and replaced as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Goals {
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

impl Default for Goals {
    fn default() -> Self {
        Preset::Maintenance.goals()
    }
}

impl Goals {
    pub fn as_macros(&self) -> Macros {
        Macros::new(self.calories, self.protein_g, self.carbs_g, self.fat_g)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    WeightLoss,
    Maintenance,
    WeightGain,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::WeightLoss, Preset::Maintenance, Preset::WeightGain];

    pub fn goals(self) -> Goals {
        let (calories, protein_g, carbs_g, fat_g) = match self {
            Preset::WeightLoss => (1500.0, 120.0, 150.0, 60.0),
            Preset::Maintenance => (2000.0, 150.0, 200.0, 80.0),
            Preset::WeightGain => (2500.0, 180.0, 250.0, 100.0),
        };
        Goals {
            calories,
            protein_g,
            carbs_g,
            fat_g,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Preset::WeightLoss => "weight loss",
            Preset::Maintenance => "maintenance",
            Preset::WeightGain => "weight gain",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace(['-', '_'], " ").as_str() {
            "loss" | "weight loss" | "cut" => Some(Preset::WeightLoss),
            "maintenance" | "maintain" => Some(Preset::Maintenance),
            "gain" | "weight gain" | "bulk" => Some(Preset::WeightGain),
            _ => None,
        }
    }
}

/// Server-computed totals for one day. Read-only on this side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub cal: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fat: f64,
}

impl DailySummary {
    pub fn macros(&self) -> Macros {
        Macros::new(self.cal, self.protein, self.carbs, self.fat)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacroProgress {
    pub current: f64,
    pub target: f64,
    /// Capped at 100.
    pub percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dashboard {
    pub calories: MacroProgress,
    pub protein: MacroProgress,
    pub carbs: MacroProgress,
    pub fat: MacroProgress,
}
