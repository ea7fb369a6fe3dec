use std::iter::Sum;
use std::ops::{Add, Mul};

use serde::{Deserialize, Serialize};

/// Calories plus the three tracked macronutrients, in kcal and grams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Macros {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl Macros {
    pub fn new(calories: f64, protein: f64, carbs: f64, fat: f64) -> Self {
        Self {
            calories,
            protein,
            carbs,
            fat,
        }
    }
}

impl Add for Macros {
    type Output = Macros;

    fn add(self, rhs: Macros) -> Macros {
        Macros {
            calories: self.calories + rhs.calories,
            protein: self.protein + rhs.protein,
            carbs: self.carbs + rhs.carbs,
            fat: self.fat + rhs.fat,
        }
    }
}

impl Mul<f64> for Macros {
    type Output = Macros;

    fn mul(self, qty: f64) -> Macros {
        Macros {
            calories: self.calories * qty,
            protein: self.protein * qty,
            carbs: self.carbs * qty,
            fat: self.fat * qty,
        }
    }
}

impl Sum for Macros {
    fn sum<I: Iterator<Item = Macros>>(iter: I) -> Macros {
        iter.fold(Macros::default(), Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaled_sum_matches_per_field_arithmetic() {
        let total: Macros = [
            Macros::new(100.0, 6.0, 1.0, 5.0) * 2.0,
            Macros::new(50.0, 2.0, 10.0, 0.5) * 1.0,
        ]
        .into_iter()
        .sum();
        assert_eq!(total, Macros::new(250.0, 14.0, 12.0, 10.5));
    }

    #[test]
    fn empty_sum_is_zero() {
        let total: Macros = std::iter::empty().sum();
        assert_eq!(total, Macros::default());
    }
}
