use std::ops::Range;

/// Reserved priority bands. Lower priority runs earlier in the chain.
pub struct PriorityRanges;

impl PriorityRanges {
    /// Security checks - always first
    pub const SECURITY: Range<i32> = 0..1000;

    /// Trigger guards (timer bookkeeping, rate limits)
    pub const TRIGGER_GUARD: Range<i32> = 1000..3000;

    /// Business-level wrappers
    pub const BUSINESS: Range<i32> = 3000..5000;

    /// Supporting concerns (caching, enrichment)
    pub const SUPPORT: Range<i32> = 5000..9000;

    /// Monitoring - closest to the target
    pub const MONITORING: Range<i32> = 9000..10000;

    /// Everything a registry accepts
    pub const ACCEPTED: Range<i32> = 0..10000;
}
