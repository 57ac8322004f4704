use crate::StatsCounts;

/// Saved/applied counters shown beside the job list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatsState {
    counts: StatsCounts,
    loading: bool,
    error: Option<String>,
}

impl StatsState {
    pub fn counts(&self) -> StatsCounts {
        self.counts
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub(crate) fn begin_fetch(&mut self) {
        self.loading = true;
    }

    pub(crate) fn loaded(&mut self, result: Result<StatsCounts, String>) {
        self.loading = false;
        match result {
            Ok(counts) => {
                self.counts = counts;
                self.error = None;
            }
            // Keep the last known counts on screen next to the error.
            Err(message) => self.error = Some(message),
        }
    }
}
