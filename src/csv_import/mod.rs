//! Importing expenses from CSV files.

mod csv;

pub use csv::{CsvRow, SkipReason, read_rows};

use serde::Serialize;

/// Counts of the rows that were not imported, by reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SkippedRows {
    /// Rows identical to an expense that was already stored.
    pub duplicates: u64,
    /// Rows with an unknown category.
    pub invalid_categories: u64,
    /// Rows with the wrong shape or an invalid date, amount or description.
    pub invalid_data: u64,
}

impl SkippedRows {
    /// The number of skipped rows for every reason combined.
    pub fn total(&self) -> u64 {
        self.duplicates + self.invalid_categories + self.invalid_data
    }
}

/// The outcome of a CSV import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// The number of new expenses stored.
    pub imported: u64,
    /// The rows that were left out.
    pub skipped: SkippedRows,
    /// Every non-blank row read, so `imported + skipped.total()`.
    pub total_processed: u64,
}

impl ImportSummary {
    /// Count a row as imported.
    pub(crate) fn record_import(&mut self) {
        self.imported += 1;
        self.total_processed += 1;
    }

    /// Count a row as skipped for `reason`.
    pub(crate) fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::Duplicate => self.skipped.duplicates += 1,
            SkipReason::InvalidCategory => self.skipped.invalid_categories += 1,
            SkipReason::InvalidData => self.skipped.invalid_data += 1,
        }

        self.total_processed += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::{ImportSummary, SkipReason};

    #[test]
    fn total_processed_counts_imports_and_skips() {
        let mut summary = ImportSummary::default();

        summary.record_import();
        summary.record_import();
        summary.record_skip(SkipReason::Duplicate);
        summary.record_skip(SkipReason::InvalidCategory);
        summary.record_skip(SkipReason::InvalidData);
        summary.record_skip(SkipReason::InvalidData);

        assert_eq!(summary.imported, 2);
        assert_eq!(summary.skipped.duplicates, 1);
        assert_eq!(summary.skipped.invalid_categories, 1);
        assert_eq!(summary.skipped.invalid_data, 2);
        assert_eq!(summary.skipped.total(), 4);
        assert_eq!(summary.total_processed, 6);
    }
}
