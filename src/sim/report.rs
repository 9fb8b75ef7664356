//! Consumption statistics across households.

use std::fmt;

/// Aggregate statistics over per-household cumulative consumption.
///
/// Computed on demand from the grid so the numbers always match the
/// consumption values they summarize.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsumptionReport {
    /// Number of households summarized.
    pub households: usize,
    pub min: f64,
    pub max: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub total: f64,
}

impl ConsumptionReport {
    /// Computes the report from per-household consumption values.
    ///
    /// An empty slice yields an all-zero report.
    pub fn from_consumption(consumption: &[f64]) -> Self {
        if consumption.is_empty() {
            return Self::default();
        }

        let n = consumption.len() as f64;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut total = 0.0;
        for &c in consumption {
            min = min.min(c);
            max = max.max(c);
            total += c;
        }

        let mean = total / n;
        let variance = consumption
            .iter()
            .map(|c| (c - mean) * (c - mean))
            .sum::<f64>()
            / n;

        Self {
            households: consumption.len(),
            min,
            max,
            std_dev: variance.sqrt(),
            total,
        }
    }

    pub fn mean(&self) -> f64 {
        if self.households == 0 {
            0.0
        } else {
            self.total / self.households as f64
        }
    }
}

impl fmt::Display for ConsumptionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Consumption Report ({} households) ---", self.households)?;
        writeln!(f, "min power consumption       {:>20.3}", self.min)?;
        writeln!(f, "max power consumption       {:>20.3}", self.max)?;
        writeln!(f, "std_dev                     {:>20.3}", self.std_dev)?;
        write!(f, "total power consumption     {:>20.3}", self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn population_std_dev() {
        // mean 5, squared deviations 9 + 1 + 1 + 9 = 20, /4 = 5
        let r = ConsumptionReport::from_consumption(&[2.0, 4.0, 6.0, 8.0]);
        assert_eq!(r.households, 4);
        assert_eq!(r.min, 2.0);
        assert_eq!(r.max, 8.0);
        assert_eq!(r.total, 20.0);
        assert!((r.std_dev - 5.0_f64.sqrt()).abs() < 1e-12);
        assert_eq!(r.mean(), 5.0);
    }

    #[test]
    fn uniform_consumption_has_no_spread() {
        let r = ConsumptionReport::from_consumption(&[15.0; 10]);
        assert_eq!(r.std_dev, 0.0);
        assert_eq!(r.total, 150.0);
    }

    #[test]
    fn empty_consumption() {
        let r = ConsumptionReport::from_consumption(&[]);
        assert_eq!(r, ConsumptionReport::default());
        assert_eq!(r.mean(), 0.0);
    }

    #[test]
    fn display_lists_all_statistics() {
        let text = ConsumptionReport::from_consumption(&[1.0, 3.0]).to_string();
        assert!(text.contains("min power consumption"));
        assert!(text.contains("std_dev"));
        assert!(text.ends_with("4.000"));
        assert_eq!(text.lines().count(), 5);
    }
}
