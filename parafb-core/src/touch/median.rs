//! Small-sample median

use heapless::Vec;

/// Median of up to `N` values
///
/// Even counts take the upper of the two middle values. Returns `None`
/// for an empty input.
pub fn median<const N: usize>(values: &Vec<u16, N>) -> Option<u16> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.clone();
    sorted.sort_unstable();
    Some(sorted[sorted.len() / 2])
}
