//! Partitioning of a historical height range into parallel sub-streams.

use crate::error::{SyncError, SyncResult};

/// One contiguous slice of a historical plan, served by one sub-stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubStreamSlice {
    /// First height the sub-stream delivers.
    pub from_height: u32,
    /// Number of headers the sub-stream delivers.
    pub count: u32,
}

impl SubStreamSlice {
    /// Height of the last header in the slice.
    pub fn to_height(&self) -> u32 {
        self.from_height + self.count - 1
    }
}

/// Split `[from_height, to_height]` into at most `max_parallel` contiguous
/// slices of roughly `target_batch_size` headers each.
///
/// Ranges within 40% of the target stay on a single stream; splitting them
/// would buy little parallelism for the extra connections. Otherwise the
/// range is divided into `min(round(total / target), max_parallel)` slices
/// of `ceil(total / n)` headers, with the final slice absorbing the
/// remainder.
pub fn partition(
    from_height: u32,
    to_height: u32,
    target_batch_size: u32,
    max_parallel: u32,
) -> SyncResult<Vec<SubStreamSlice>> {
    if from_height < 1 {
        return Err(SyncError::InvalidHeight(from_height));
    }
    if to_height < from_height {
        return Err(SyncError::InvalidRange {
            from_height,
            to_height,
        });
    }

    let total = u64::from(to_height) - u64::from(from_height) + 1;
    let target = u64::from(target_batch_size.max(1));
    let max_parallel = u64::from(max_parallel.max(1));

    if total * 10 <= target * 14 {
        return Ok(vec![SubStreamSlice {
            from_height,
            count: total as u32,
        }]);
    }

    // Round half-up, as the target is a preference, not a bound.
    let num_streams = ((2 * total + target) / (2 * target)).min(max_parallel).max(1);
    let per_stream = total.div_ceil(num_streams);

    let mut slices = Vec::with_capacity(num_streams as usize);
    let mut start = u64::from(from_height);
    let mut remaining = total;
    while remaining > 0 {
        let count = per_stream.min(remaining);
        slices.push(SubStreamSlice {
            from_height: start as u32,
            count: count as u32,
        });
        start += count;
        remaining -= count;
    }

    Ok(slices)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(slices: &[SubStreamSlice]) -> Vec<u32> {
        slices.iter().map(|s| s.count).collect()
    }

    #[test]
    fn test_even_partition() {
        // total=34, round(34/10)=3 streams, ceil(34/3)=12 each.
        let slices = partition(1, 34, 10, 6).unwrap();
        assert_eq!(
            slices,
            vec![
                SubStreamSlice {
                    from_height: 1,
                    count: 12
                },
                SubStreamSlice {
                    from_height: 13,
                    count: 12
                },
                SubStreamSlice {
                    from_height: 25,
                    count: 10
                },
            ]
        );
    }

    #[test]
    fn test_capped_by_parallelism() {
        let slices = partition(1, 100, 10, 6).unwrap();
        assert_eq!(counts(&slices), vec![17, 17, 17, 17, 17, 15]);
        assert_eq!(slices[0].from_height, 1);
        assert_eq!(slices[5].from_height, 86);
        assert_eq!(slices[5].to_height(), 100);
    }

    #[test]
    fn test_small_total_single_stream() {
        // 13 <= 10 * 1.4
        let slices = partition(1, 13, 10, 6).unwrap();
        assert_eq!(
            slices,
            vec![SubStreamSlice {
                from_height: 1,
                count: 13
            }]
        );
    }

    #[test]
    fn test_just_above_single_stream_threshold() {
        let slices = partition(1, 15, 10, 6).unwrap();
        assert_eq!(counts(&slices), vec![8, 7]);
    }

    #[test]
    fn test_single_header_range() {
        let slices = partition(5, 5, 10, 6).unwrap();
        assert_eq!(
            slices,
            vec![SubStreamSlice {
                from_height: 5,
                count: 1
            }]
        );
    }

    #[test]
    fn test_partition_totality() {
        for (from, to, target, max) in
            [(1u32, 100_000u32, 50_000u32, 6u32), (7, 12_345, 100, 10), (1, 999, 10, 3)]
        {
            let slices = partition(from, to, target, max).unwrap();
            let total: u64 = slices.iter().map(|s| u64::from(s.count)).sum();
            assert_eq!(total, u64::from(to) - u64::from(from) + 1);
            assert!(slices.len() <= max as usize);

            // Slices are contiguous and ordered.
            let mut expected = from;
            for slice in &slices {
                assert_eq!(slice.from_height, expected);
                expected = slice.from_height + slice.count;
            }
            assert_eq!(expected, to + 1);
        }
    }

    #[test]
    fn test_invalid_range() {
        assert!(matches!(
            partition(10, 9, 10, 6),
            Err(SyncError::InvalidRange {
                from_height: 10,
                to_height: 9
            })
        ));
    }

    #[test]
    fn test_invalid_height() {
        assert!(matches!(partition(0, 9, 10, 6), Err(SyncError::InvalidHeight(0))));
    }

    #[test]
    fn test_full_u32_range_does_not_overflow() {
        let slices = partition(1, u32::MAX, 50_000, 6).unwrap();
        let total: u64 = slices.iter().map(|s| u64::from(s.count)).sum();
        assert_eq!(total, u64::from(u32::MAX));
    }
}
