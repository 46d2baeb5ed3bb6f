use tracing::warn;

use super::descriptive::{average_ranks, pearson};
use super::monthly::MonthlyStatRow;

/// Fewest monthly points for which a correlation is reported.
pub const MIN_POINTS: usize = 3;

/// Why a correlation could not be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndefinedReason {
    TooFewPoints { points: usize },
    ZeroVariance,
}

impl std::fmt::Display for UndefinedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UndefinedReason::TooFewPoints { points } => {
                write!(f, "need at least {MIN_POINTS} monthly points, got {points}")
            }
            UndefinedReason::ZeroVariance => write!(f, "a series has zero variance"),
        }
    }
}

/// Correlation between monthly core ratio and monthly mean duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Correlation {
    Defined { pearson: f64, spearman: f64 },
    Undefined(UndefinedReason),
}

impl Correlation {
    pub fn pearson(&self) -> Option<f64> {
        match self {
            Correlation::Defined { pearson, .. } => Some(*pearson),
            Correlation::Undefined(_) => None,
        }
    }

    pub fn spearman(&self) -> Option<f64> {
        match self {
            Correlation::Defined { spearman, .. } => Some(*spearman),
            Correlation::Undefined(_) => None,
        }
    }
}

/// Pearson and Spearman coefficients of `core_ratio` against `mean_duration`.
pub fn correlate(monthly: &[MonthlyStatRow]) -> Correlation {
    if monthly.len() < MIN_POINTS {
        let reason = UndefinedReason::TooFewPoints {
            points: monthly.len(),
        };
        warn!(%reason, "correlation undefined");
        return Correlation::Undefined(reason);
    }

    let ratios: Vec<f64> = monthly.iter().map(|m| m.core_ratio).collect();
    let durations: Vec<f64> = monthly.iter().map(|m| m.mean_duration).collect();
    correlate_series(&ratios, &durations)
}

fn correlate_series(x: &[f64], y: &[f64]) -> Correlation {
    let linear = pearson(x, y);
    let rank = pearson(&average_ranks(x), &average_ranks(y));

    match (linear, rank) {
        (Some(pearson), Some(spearman)) => Correlation::Defined { pearson, spearman },
        _ => {
            warn!(reason = %UndefinedReason::ZeroVariance, "correlation undefined");
            Correlation::Undefined(UndefinedReason::ZeroVariance)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::monthly::YearMonth;

    fn months(ratios: &[f64], durations: &[f64]) -> Vec<MonthlyStatRow> {
        ratios
            .iter()
            .zip(durations)
            .enumerate()
            .map(|(i, (&core_ratio, &mean_duration))| MonthlyStatRow {
                month: YearMonth {
                    year: 2023,
                    month: i as u32 + 1,
                },
                total_fixes: 10,
                core_fixes: (core_ratio * 10.0).round() as usize,
                mean_duration,
                median_duration: mean_duration,
                mean_comments: 1.0,
                core_ratio,
            })
            .collect()
    }

    #[test]
    fn test_strong_inverse_relation() {
        let result = correlate(&months(&[0.1, 0.5, 0.9], &[10.0, 5.0, 1.0]));
        let pearson = result.pearson().unwrap();
        assert!(pearson < -0.9, "pearson was {pearson}");
        assert!((result.spearman().unwrap() + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_too_few_points() {
        let result = correlate(&months(&[0.1, 0.9], &[10.0, 1.0]));
        assert_eq!(
            result,
            Correlation::Undefined(UndefinedReason::TooFewPoints { points: 2 })
        );
        assert_eq!(result.pearson(), None);
        assert_eq!(result.spearman(), None);
        assert!(matches!(correlate(&[]), Correlation::Undefined(_)));
    }

    #[test]
    fn test_zero_variance_is_undefined() {
        let result = correlate(&months(&[0.5, 0.5, 0.5, 0.5], &[1.0, 2.0, 3.0, 4.0]));
        assert_eq!(result, Correlation::Undefined(UndefinedReason::ZeroVariance));
    }

    #[test]
    fn test_spearman_is_rank_based() {
        // Monotone but non-linear: ranks agree perfectly, values do not.
        let result = correlate(&months(&[0.1, 0.2, 0.3, 0.4], &[1.0, 2.0, 4.0, 100.0]));
        assert!((result.spearman().unwrap() - 1.0).abs() < 1e-9);
        assert!(result.pearson().unwrap() < 1.0);
    }

    #[test]
    fn test_spearman_handles_ties() {
        let result = correlate(&months(&[0.2, 0.2, 0.8], &[3.0, 5.0, 9.0]));
        // ranks x = [1.5, 1.5, 3], y = [1, 2, 3]
        let expected = 0.8660254037844387;
        assert!((result.spearman().unwrap() - expected).abs() < 1e-9);
    }
}
