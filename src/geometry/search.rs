/// Largest index `i < len` such that `overflows(j)` is false for every `j <= i`.
///
/// `overflows` must be monotonic: once it returns `true` for some index it must return `true`
/// for every larger one. Returns `None` when index `0` already overflows. Runs
/// `O(log len)` predicate evaluations.
pub fn fit_prefix(len: usize, mut overflows: impl FnMut(usize) -> bool) -> Option<usize> {
    let mut low = 0;
    let mut high = len;
    while low < high {
        let mid = low + ((high - low) >> 1);
        if overflows(mid) {
            high = mid;
        } else {
            low = mid + 1;
        }
    }
    high.checked_sub(1)
}
