use std::collections::BTreeSet;

/// Reduce per-book category lists to the sorted set of distinct labels.
///
/// Blank labels are dropped.
pub fn distinct_sorted<I, L>(lists: I) -> Vec<String>
where
  I: IntoIterator<Item = L>,
  L: IntoIterator<Item = String>,
{
  lists
    .into_iter()
    .flatten()
    .filter(|label| !label.trim().is_empty())
    .collect::<BTreeSet<_>>()
    .into_iter()
    .collect()
}
