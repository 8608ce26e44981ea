//! Required Minimum Distribution divisor tables.
//!
//! Tax-deferred accounts use the uniform lifetime table keyed by the owner's
//! age at year end, starting at 70. Inherited accounts use the single life
//! expectancy table keyed by the owner's age in the year after inheritance.

use serde::{Deserialize, Serialize};

const UNIFORM_LIFETIME_DIVISORS: [f64; 46] = [
    27.4, 26.5, 25.6, 24.7, 23.8, 22.9, 22.0, 21.2, 20.3, 19.5,
    18.7, 17.9, 17.1, 16.3, 15.5, 14.8, 14.1, 13.4, 12.7, 12.0,
    11.4, 10.8, 10.2, 9.6, 9.1, 8.6, 8.1, 7.6, 7.1, 6.7,
    6.3, 5.9, 5.5, 5.2, 4.9, 4.5, 4.2, 3.9, 3.7, 3.4,
    3.1, 2.9, 2.6, 2.4, 2.1, 1.9,
];

const SINGLE_LIFE_DIVISORS: [f64; 112] = [
    82.4, 81.6, 80.6, 79.7, 78.7, 77.7, 76.7, 75.8, 74.8, 73.8,
    72.8, 71.8, 70.8, 69.9, 68.9, 67.9, 66.9, 66.0, 65.0, 64.0,
    63.0, 62.1, 61.1, 60.1, 59.1, 58.2, 57.2, 56.2, 55.3, 54.3,
    53.3, 52.4, 51.4, 50.4, 49.4, 48.5, 47.5, 46.5, 45.6, 44.6,
    43.6, 42.7, 41.7, 40.7, 39.8, 38.8, 37.9, 37.0, 36.0, 35.1,
    34.2, 33.3, 32.3, 31.4, 30.5, 29.6, 28.7, 27.9, 27.0, 26.1,
    25.2, 24.4, 23.5, 22.7, 21.8, 21.0, 20.2, 19.4, 18.6, 17.8,
    17.0, 16.3, 15.5, 14.8, 14.1, 13.4, 12.7, 12.1, 11.4, 10.8,
    10.2, 9.7, 9.1, 8.6, 8.1, 7.6, 7.1, 6.7, 6.3, 5.9,
    5.5, 5.2, 4.9, 4.6, 4.3, 4.1, 3.8, 3.6, 3.4, 3.1,
    2.9, 2.7, 2.5, 2.3, 2.1, 1.9, 1.7, 1.5, 1.4, 1.2,
    1.1, 1.0,
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RmdTable {
    pub entries: Vec<RmdTableEntry>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RmdTableEntry {
    pub age: u8,
    pub divisor: f64,
}

impl RmdTable {
    fn from_divisors(first_age: u8, divisors: &[f64]) -> Self {
        RmdTable {
            entries: divisors
                .iter()
                .enumerate()
                .map(|(i, &divisor)| RmdTableEntry {
                    age: first_age + i as u8,
                    divisor,
                })
                .collect(),
        }
    }

    /// Uniform lifetime table, ages 70 through 115.
    #[must_use]
    pub fn uniform_lifetime() -> Self {
        Self::from_divisors(70, &UNIFORM_LIFETIME_DIVISORS)
    }

    /// Single life expectancy table, ages 0 through 111.
    #[must_use]
    pub fn single_life_expectancy() -> Self {
        Self::from_divisors(0, &SINGLE_LIFE_DIVISORS)
    }

    #[must_use]
    pub fn divisor_for_age(&self, age: u8) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.age == age)
            .map(|e| e.divisor)
    }

    /// Divisor for `age`, clamped into the table's age range.
    #[must_use]
    pub fn clamped_divisor(&self, age: i32) -> f64 {
        let (Some(first), Some(last)) = (self.entries.first(), self.entries.last()) else {
            return 1.0;
        };
        let age = age.clamp(i32::from(first.age), i32::from(last.age));
        self.entries[(age - i32::from(first.age)) as usize].divisor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_lifetime_bounds() {
        let table = RmdTable::uniform_lifetime();
        assert_eq!(table.entries.len(), 46);
        assert_eq!(table.divisor_for_age(70), Some(27.4), "first divisor at 70");
        assert_eq!(table.divisor_for_age(75), Some(22.9));
        assert_eq!(table.divisor_for_age(115), Some(1.9));
        assert_eq!(table.divisor_for_age(69), None, "no divisor before 70");
    }

    #[test]
    fn test_single_life_bounds() {
        let table = RmdTable::single_life_expectancy();
        assert_eq!(table.entries.len(), 112);
        assert_eq!(table.divisor_for_age(0), Some(82.4));
        assert_eq!(table.divisor_for_age(111), Some(1.0));
    }

    #[test]
    fn test_clamped_divisor() {
        let table = RmdTable::uniform_lifetime();
        assert_eq!(table.clamped_divisor(130), 1.9, "past the end uses the last row");
        assert_eq!(table.clamped_divisor(60), 27.4);
        let single = RmdTable::single_life_expectancy();
        assert_eq!(single.clamped_divisor(-3), 82.4);
    }
}
