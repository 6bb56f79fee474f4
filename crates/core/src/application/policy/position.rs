//! Notify position for the "any provider" bucket

/// Active-provider count at or below which the head of the bucket is notified
pub const HEAD_ONLY_PROVIDER_LIMIT: usize = 2;

/// Zero-based index in the "any provider" bucket that gets notified.
///
/// An explicit location threshold always wins. Otherwise the position is
/// derived from the number of active providers `c`: `0` when `c <= 2`,
/// `c - 1` above that. Zero providers yields `0`.
pub fn notify_position(threshold: Option<u32>, active_providers: usize) -> usize {
    match threshold {
        Some(explicit) => explicit as usize,
        None if active_providers <= HEAD_ONLY_PROVIDER_LIMIT => 0,
        None => active_providers - 1,
    }
}
