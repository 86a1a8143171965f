//! Engine configuration and bounds

use std::time::Duration;

use crate::{EngineError, EngineResult, Lane};

/// Minimum number of lanes
pub const MIN_LANE_COUNT: usize = 2;
/// Maximum number of lanes
pub const MAX_LANE_COUNT: usize = 8;
/// Minimum generated lane size
pub const MIN_LANE_SIZE: usize = 2;
/// Maximum generated lane size
pub const MAX_LANE_SIZE: usize = 8;
/// Minimum step interval
pub const MIN_STEP_INTERVAL: Duration = Duration::from_millis(100);
/// Maximum step interval
pub const MAX_STEP_INTERVAL: Duration = Duration::from_millis(1000);

/// Merge engine configuration
///
/// Immutable for the duration of a run; changing it requires a reset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Number of input lanes
    pub lane_count: usize,
    /// Values per generated lane
    pub lane_size: usize,
    /// Cadence between observable steps (used by the driver, not the engine)
    pub step_interval: Duration,
    /// Pre-supplied sorted lanes; overrides generation when present
    pub explicit_lanes: Option<Vec<Vec<i64>>>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            lane_count: 4,
            lane_size: 4,
            step_interval: Duration::from_millis(500),
            explicit_lanes: None,
        }
    }
}

impl EngineConfig {
    /// Configuration for explicit pre-sorted lanes
    pub fn with_lanes(lanes: Vec<Vec<i64>>) -> Self {
        EngineConfig {
            lane_count: lanes.len(),
            explicit_lanes: Some(lanes),
            ..EngineConfig::default()
        }
    }

    /// Validate bounds and explicit lane sortedness.
    ///
    /// All-or-nothing: a configuration that fails here creates no state.
    /// Lane size bounds apply to generated lanes only; explicit lanes may be
    /// any length (including empty) but each must be sorted ascending.
    pub fn validate(&self) -> EngineResult<()> {
        let count = self
            .explicit_lanes
            .as_ref()
            .map_or(self.lane_count, Vec::len);
        if !(MIN_LANE_COUNT..=MAX_LANE_COUNT).contains(&count) {
            return Err(EngineError::LaneCountOutOfRange {
                got: count,
                min: MIN_LANE_COUNT,
                max: MAX_LANE_COUNT,
            });
        }

        match &self.explicit_lanes {
            Some(lanes) => {
                for (index, lane) in lanes.iter().enumerate() {
                    if lane.windows(2).any(|w| w[0] > w[1]) {
                        return Err(EngineError::UnsortedLane { lane: index });
                    }
                }
            }
            None => {
                if !(MIN_LANE_SIZE..=MAX_LANE_SIZE).contains(&self.lane_size) {
                    return Err(EngineError::LaneSizeOutOfRange {
                        got: self.lane_size,
                        min: MIN_LANE_SIZE,
                        max: MAX_LANE_SIZE,
                    });
                }
            }
        }

        if self.step_interval < MIN_STEP_INTERVAL || self.step_interval > MAX_STEP_INTERVAL {
            return Err(EngineError::StepIntervalOutOfRange {
                got_ms: self.step_interval.as_millis() as u64,
                min_ms: MIN_STEP_INTERVAL.as_millis() as u64,
                max_ms: MAX_STEP_INTERVAL.as_millis() as u64,
            });
        }

        Ok(())
    }

    /// Build the input lanes this configuration describes.
    ///
    /// Explicit lanes are taken as-is (after the sortedness check).
    /// Generated lanes deal `1..=lane_count*lane_size` round-robin: lane `i`
    /// receives `i+1, i+1+N, i+1+2N, ...`, so each lane is ascending by
    /// construction.
    pub fn build_lanes(&self) -> EngineResult<Vec<Lane>> {
        self.validate()?;

        match &self.explicit_lanes {
            Some(lanes) => lanes
                .iter()
                .enumerate()
                .map(|(index, values)| Lane::from_sorted(index, values.clone()))
                .collect(),
            None => {
                let count = self.lane_count;
                let lanes = (0..count)
                    .map(|i| {
                        let values = (0..self.lane_size)
                            .map(|slot| (i + 1 + slot * count) as i64)
                            .collect();
                        Lane::from_unsorted(values)
                    })
                    .collect();
                Ok(lanes)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert_eq!(config.lane_count, 4);
        assert_eq!(config.lane_size, 4);
        assert_eq!(config.step_interval, Duration::from_millis(500));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_generated_lanes_match_reference_layout() {
        let lanes = EngineConfig::default().build_lanes().unwrap();
        let contents: Vec<Vec<i64>> = lanes.iter().map(Lane::to_vec).collect();
        assert_eq!(
            contents,
            vec![
                vec![1, 5, 9, 13],
                vec![2, 6, 10, 14],
                vec![3, 7, 11, 15],
                vec![4, 8, 12, 16],
            ]
        );
    }

    #[test]
    fn test_generated_lanes_are_sorted_for_all_shapes() {
        for count in MIN_LANE_COUNT..=MAX_LANE_COUNT {
            for size in MIN_LANE_SIZE..=MAX_LANE_SIZE {
                let config = EngineConfig {
                    lane_count: count,
                    lane_size: size,
                    ..EngineConfig::default()
                };
                let lanes = config.build_lanes().unwrap();
                assert_eq!(lanes.len(), count);
                for lane in &lanes {
                    assert_eq!(lane.len(), size);
                    let values = lane.to_vec();
                    assert!(values.windows(2).all(|w| w[0] <= w[1]));
                }
            }
        }
    }

    #[test]
    fn test_lane_count_bounds() {
        let too_few = EngineConfig {
            lane_count: 1,
            ..EngineConfig::default()
        };
        assert_eq!(
            too_few.validate().unwrap_err(),
            EngineError::LaneCountOutOfRange {
                got: 1,
                min: MIN_LANE_COUNT,
                max: MAX_LANE_COUNT,
            }
        );

        let too_many = EngineConfig {
            lane_count: 9,
            ..EngineConfig::default()
        };
        assert!(too_many.validate().is_err());
    }

    #[test]
    fn test_lane_size_bounds() {
        let config = EngineConfig {
            lane_size: 12,
            ..EngineConfig::default()
        };
        assert_eq!(
            config.validate().unwrap_err(),
            EngineError::LaneSizeOutOfRange {
                got: 12,
                min: MIN_LANE_SIZE,
                max: MAX_LANE_SIZE,
            }
        );
    }

    #[test]
    fn test_step_interval_bounds() {
        let too_fast = EngineConfig {
            step_interval: Duration::from_millis(50),
            ..EngineConfig::default()
        };
        assert!(matches!(
            too_fast.validate(),
            Err(EngineError::StepIntervalOutOfRange { got_ms: 50, .. })
        ));

        let too_slow = EngineConfig {
            step_interval: Duration::from_millis(1500),
            ..EngineConfig::default()
        };
        assert!(too_slow.validate().is_err());
    }

    #[test]
    fn test_explicit_lanes_override_generation() {
        let config = EngineConfig::with_lanes(vec![vec![1, 3], vec![1, 2]]);
        let lanes = config.build_lanes().unwrap();
        assert_eq!(lanes.len(), 2);
        assert_eq!(lanes[0].to_vec(), vec![1, 3]);
        assert_eq!(lanes[1].to_vec(), vec![1, 2]);
    }

    #[test]
    fn test_explicit_lanes_may_be_empty_or_uneven() {
        let config = EngineConfig::with_lanes(vec![Vec::new(), vec![1, 2]]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_explicit_lanes_must_be_sorted() {
        let config = EngineConfig::with_lanes(vec![vec![1, 2], vec![3, 1]]);
        assert_eq!(
            config.validate().unwrap_err(),
            EngineError::UnsortedLane { lane: 1 }
        );
    }

    #[test]
    fn test_explicit_lane_count_still_bounded() {
        let config = EngineConfig::with_lanes(vec![vec![1]]);
        assert!(matches!(
            config.validate(),
            Err(EngineError::LaneCountOutOfRange { got: 1, .. })
        ));
    }
}
