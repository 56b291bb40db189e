use crate::mode::Mode;

/// Scale applied to the frequency/time product before capping.
pub const BOOST_SCALE: f64 = 0.15;
/// Boosts at or below this are noise and are omitted from results.
pub const NOISE_FLOOR: f64 = 0.01;
/// In-memory entry count that triggers the opportunistic age sweep.
pub const CLEANUP_THRESHOLD: usize = 6_000;
/// Usage records older than this are dropped by the sweep.
pub const ENTRY_MAX_AGE_DAYS: i64 = 90;

pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Composite primary key of a usage record.
pub fn usage_id(mode: Mode, input: &str, url: &str) -> String {
	format!("{}|{}|{}", mode.as_str(), input, url)
}

/// Per-mode ceiling on the raw boost. Tab boosts are kept small because the
/// tab list is short-lived and an oversized boost would pin stale tabs on top.
pub fn max_boost(mode: Mode) -> f64 {
	match mode {
		Mode::Tabs => 0.25,
		Mode::History | Mode::Bookmarks => 0.5,
	}
}

/// Step-wise time decay over the age of the last selection. Age is fractional,
/// so an entry 25 hours old already sits in the second band.
pub fn time_factor(age_ms: i64) -> f64 {
	let age_days = age_ms.max(0) as f64 / DAY_MS as f64;

	if age_days <= 1.0 {
		1.0
	} else if age_days <= 7.0 {
		0.8
	} else if age_days <= 30.0 {
		0.5
	} else if age_days <= 60.0 {
		0.3
	} else {
		0.1
	}
}

/// Logarithmic frequency scaling, so repeat selections add diminishing weight.
pub fn frequency_factor(use_count: i64) -> f64 {
	((use_count.max(0) + 1) as f64).log2()
}

/// Raw boost for one usage entry, capped at the mode ceiling. The caller adds
/// 1.0 to turn it into a multiplier.
pub fn calculate_boost(use_count: i64, last_used: i64, now: i64, mode: Mode) -> f64 {
	let age_ms = now.saturating_sub(last_used);

	max_boost(mode).min(BOOST_SCALE * frequency_factor(use_count) * time_factor(age_ms))
}
