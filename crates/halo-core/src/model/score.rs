use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Finalized position → brightness score mapping produced by one strategy run.
///
/// Range, sign and initial value depend on the strategy that produced it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreMap(BTreeMap<usize, f64>);

impl ScoreMap {
    pub fn get(&self, position: usize) -> Option<f64> {
        self.0.get(&position).copied()
    }

    pub fn contains(&self, position: usize) -> bool {
        self.0.contains_key(&position)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.0.iter().map(|(&p, &s)| (p, s))
    }

    pub fn positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.keys().copied()
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.values().copied()
    }

    /// Distribution statistics, or `None` for an empty map.
    pub fn stats(&self) -> Option<ScoreStats> {
        ScoreStats::from_values(self.values())
    }
}

impl From<BTreeMap<usize, f64>> for ScoreMap {
    fn from(map: BTreeMap<usize, f64>) -> Self {
        Self(map)
    }
}

impl FromIterator<(usize, f64)> for ScoreMap {
    fn from_iter<I: IntoIterator<Item = (usize, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
}

impl ScoreStats {
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut sorted: Vec<f64> = values.into_iter().collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len();
        let mean = sorted.iter().sum::<f64>() / n as f64;
        let median = if n % 2 == 1 {
            sorted[n / 2]
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        };

        Some(Self {
            min: sorted[0],
            max: sorted[n - 1],
            mean,
            median,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_odd_count() {
        let stats = ScoreStats::from_values([5.0, 1.0, 3.0]).unwrap();
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 5.0);
        assert_eq!(stats.mean, 3.0);
        assert_eq!(stats.median, 3.0);
    }

    #[test]
    fn test_stats_even_count_averages_middle() {
        let stats = ScoreStats::from_values([4.0, 1.0, 3.0, 10.0]).unwrap();
        assert_eq!(stats.median, 3.5);
        assert_eq!(stats.mean, 4.5);
    }

    #[test]
    fn test_stats_empty_is_none() {
        assert!(ScoreMap::default().stats().is_none());
    }

    #[test]
    fn test_score_map_serializes_positions_as_keys() {
        let map: ScoreMap = [(2, 255.0), (0, 1.5)].into_iter().collect();
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"0":1.5,"2":255.0}"#);
        let parsed: ScoreMap = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, map);
    }
}
