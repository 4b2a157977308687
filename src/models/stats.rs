//! Admin dashboard statistics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DocumentStatus;

/// Derived snapshot of document counts by review status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminStats {
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
    pub generated_at: DateTime<Utc>,
}

impl AdminStats {
    /// Build a snapshot from `(status, count)` pairs
    pub fn from_counts<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = (DocumentStatus, i64)>,
    {
        let mut stats = Self {
            total: 0,
            pending: 0,
            approved: 0,
            rejected: 0,
            generated_at: Utc::now(),
        };

        for (status, count) in counts {
            match status {
                DocumentStatus::Pending => stats.pending += count,
                DocumentStatus::Approved => stats.approved += count,
                DocumentStatus::Rejected => stats.rejected += count,
            }
            stats.total += count;
        }

        stats
    }

    pub fn count(&self, status: DocumentStatus) -> i64 {
        match status {
            DocumentStatus::Pending => self.pending,
            DocumentStatus::Approved => self.approved,
            DocumentStatus::Rejected => self.rejected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_counts_sums_total() {
        let stats = AdminStats::from_counts([
            (DocumentStatus::Pending, 4),
            (DocumentStatus::Approved, 2),
            (DocumentStatus::Rejected, 1),
        ]);
        assert_eq!(stats.total, 7);
        assert_eq!(stats.count(DocumentStatus::Pending), 4);
        assert_eq!(stats.count(DocumentStatus::Approved), 2);
        assert_eq!(stats.count(DocumentStatus::Rejected), 1);
    }

    #[test]
    fn test_from_counts_empty() {
        let stats = AdminStats::from_counts(Vec::new());
        assert_eq!(stats.total, 0);
        assert_eq!(stats.pending, 0);
    }
}
