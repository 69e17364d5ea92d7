use crate::errors::PlanError;

/// One `(limit, offset)` slice of the source collection, numbered from 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchWindow {
    pub number: usize,
    pub limit: u64,
    pub offset: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchPlan {
    total: u64,
    batch_size: u64,
    start_offset: u64,
}

impl BatchPlan {
    pub fn new(total: u64, batch_size: u64, start_offset: u64) -> Result<Self, PlanError> {
        if batch_size == 0 {
            return Err(PlanError::ZeroBatchSize);
        }
        if start_offset.checked_add(total).is_none() {
            return Err(PlanError::WindowOverflow { start_offset, total });
        }

        Ok(Self { total, batch_size, start_offset })
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn batch_size(&self) -> u64 {
        self.batch_size
    }

    pub fn start_offset(&self) -> u64 {
        self.start_offset
    }

    pub fn batch_count(&self) -> usize {
        usize::try_from(self.total.div_ceil(self.batch_size)).unwrap_or(usize::MAX)
    }

    pub fn windows(&self) -> BatchWindows {
        BatchWindows { plan: *self, processed: 0, number: 0 }
    }
}

pub struct BatchWindows {
    plan: BatchPlan,
    processed: u64,
    number: usize,
}

impl Iterator for BatchWindows {
    type Item = BatchWindow;

    fn next(&mut self) -> Option<Self::Item> {
        let remaining = self.plan.total - self.processed;
        if remaining == 0 {
            return None;
        }

        let limit = self.plan.batch_size.min(remaining);
        let offset = self.plan.start_offset + self.processed;
        self.processed += limit;
        self.number += 1;

        Some(BatchWindow { number: self.number, limit, offset })
    }
}

#[cfg(test)]
mod tests {
    use super::{BatchPlan, BatchWindow};
    use crate::errors::PlanError;

    #[test]
    fn remainder_becomes_a_short_final_window() {
        let plan = BatchPlan::new(3, 2, 1).expect("valid plan");
        let windows: Vec<BatchWindow> = plan.windows().collect();

        assert_eq!(
            windows,
            vec![
                BatchWindow { number: 1, limit: 2, offset: 1 },
                BatchWindow { number: 2, limit: 1, offset: 3 },
            ]
        );
        assert_eq!(plan.batch_count(), 2);
    }

    #[test]
    fn exact_multiple_produces_full_windows_only() {
        let plan = BatchPlan::new(6, 3, 0).expect("valid plan");
        let windows: Vec<(u64, u64)> =
            plan.windows().map(|window| (window.limit, window.offset)).collect();

        assert_eq!(windows, vec![(3, 0), (3, 3)]);
    }

    #[test]
    fn batch_larger_than_total_is_a_single_window() {
        let plan = BatchPlan::new(4, 100, 10).expect("valid plan");
        let windows: Vec<BatchWindow> = plan.windows().collect();

        assert_eq!(windows, vec![BatchWindow { number: 1, limit: 4, offset: 10 }]);
    }

    #[test]
    fn zero_total_has_no_windows() {
        let plan = BatchPlan::new(0, 5, 7).expect("valid plan");

        assert_eq!(plan.windows().count(), 0);
        assert_eq!(plan.batch_count(), 0);
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        assert_eq!(BatchPlan::new(10, 0, 0), Err(PlanError::ZeroBatchSize));
    }

    #[test]
    fn overflowing_window_is_rejected() {
        assert_eq!(
            BatchPlan::new(2, 1, u64::MAX),
            Err(PlanError::WindowOverflow { start_offset: u64::MAX, total: 2 })
        );
    }
}
