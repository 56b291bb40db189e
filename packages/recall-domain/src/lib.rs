pub mod boost;
pub mod mode;
pub mod normalize;

pub use boost::{
	BOOST_SCALE, CLEANUP_THRESHOLD, DAY_MS, ENTRY_MAX_AGE_DAYS, NOISE_FLOOR, calculate_boost,
	frequency_factor, max_boost, time_factor, usage_id,
};
pub use mode::Mode;
pub use normalize::normalize_input;

/// Current wall-clock time as epoch milliseconds, the unit every store field uses.
pub fn now_ms() -> i64 {
	(time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}
