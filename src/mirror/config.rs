/// Default mirror pool. The first two are historically the most reliable
/// and are kept in priority position on every request; the rest are
/// shuffled per call to spread load.
pub const DEFAULT_MIRRORS: &[&str] = &[
    "https://wolf.qqdl.site",
    "https://tidal-api.binimum.org",
    "https://triton.squid.wtf",
    "https://maus.qqdl.site",
    "https://vogel.qqdl.site",
    "https://katze.qqdl.site",
    "https://hund.qqdl.site",
    "https://tidal.kinoplus.online",
];

/// How many mirrors keep their configured position at the head of the
/// candidate order.
pub const KNOWN_GOOD_MIRRORS: usize = 2;

/// Attempts per mirror before failing over to the next one.
pub const MAX_RETRIES: u32 = 3;

/// Base delay for the linear retry backoff (`delay = base * attempt`).
pub const RETRY_DELAY_MS: u64 = 200;

pub const REQUEST_TIMEOUT_SECONDS: u64 = 10;

pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
