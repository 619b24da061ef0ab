use std::sync::atomic::{AtomicU64, Ordering};

/// Telemetry counters for the redirection layer.
///
/// Cheap to bump on the render thread; readable from any thread.
#[derive(Debug, Default)]
pub struct CbrStats {
    redirects: AtomicU64,
    redirects_skipped: AtomicU64,
    restores: AtomicU64,
    restores_skipped: AtomicU64,
    viewport_shifts: AtomicU64,
    views_created: AtomicU64,
    view_failures: AtomicU64,
    releases: AtomicU64,
}

impl CbrStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_redirects(&self) {
        self.redirects.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_redirects_skipped(&self) {
        self.redirects_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_restores(&self) {
        self.restores.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_restores_skipped(&self) {
        self.restores_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_viewport_shifts(&self) {
        self.viewport_shifts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_views_created(&self) {
        self.views_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_view_failures(&self) {
        self.view_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_releases(&self) {
        self.releases.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CbrStatsSnapshot {
        CbrStatsSnapshot {
            redirects: self.redirects.load(Ordering::Relaxed),
            redirects_skipped: self.redirects_skipped.load(Ordering::Relaxed),
            restores: self.restores.load(Ordering::Relaxed),
            restores_skipped: self.restores_skipped.load(Ordering::Relaxed),
            viewport_shifts: self.viewport_shifts.load(Ordering::Relaxed),
            views_created: self.views_created.load(Ordering::Relaxed),
            view_failures: self.view_failures.load(Ordering::Relaxed),
            releases: self.releases.load(Ordering::Relaxed),
        }
    }

    pub fn to_json(&self) -> String {
        self.snapshot().to_json()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CbrStatsSnapshot {
    pub redirects: u64,
    pub redirects_skipped: u64,
    pub restores: u64,
    pub restores_skipped: u64,
    pub viewport_shifts: u64,
    pub views_created: u64,
    pub view_failures: u64,
    pub releases: u64,
}

impl CbrStatsSnapshot {
    pub fn to_json(self) -> String {
        format!(
            concat!(
                "{{\"redirects\":{},\"redirects_skipped\":{},\"restores\":{},",
                "\"restores_skipped\":{},\"viewport_shifts\":{},\"views_created\":{},",
                "\"view_failures\":{},\"releases\":{}}}",
            ),
            self.redirects,
            self.redirects_skipped,
            self.restores,
            self.restores_skipped,
            self.viewport_shifts,
            self.views_created,
            self.view_failures,
            self.releases,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_json_contains_counters() {
        let stats = CbrStats::new();
        stats.inc_redirects();
        stats.inc_redirects();
        stats.inc_restores_skipped();
        stats.inc_view_failures();

        let json = stats.to_json();
        assert!(json.starts_with('{') && json.ends_with('}'));
        assert!(json.contains("\"redirects\":2"));
        assert!(json.contains("\"restores_skipped\":1"));
        assert!(json.contains("\"view_failures\":1"));
        assert!(json.contains("\"releases\":0"));
    }
}
