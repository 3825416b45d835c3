/// One slot of the pager strip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSlot {
  Page(u32),
  Ellipsis,
}

/// How many pages either side of the current one are always shown
const WINDOW_RADIUS: u32 = 2;

/// Visible page set for a pager: first, last, and `current` ±2, in order,
/// with an ellipsis wherever the sequence skips pages.
///
/// `current` is clamped into `1..=total_pages`. No pages means no slots.
pub fn page_window(total_pages: u32, current: u32) -> Vec<PageSlot> {
  if total_pages == 0 {
    return Vec::new();
  }

  let current = current.clamp(1, total_pages);
  let low = current.saturating_sub(WINDOW_RADIUS).max(1);
  let high = current.saturating_add(WINDOW_RADIUS).min(total_pages);

  let mut pages = Vec::with_capacity((high - low + 3) as usize);
  pages.push(1);
  pages.extend(low..=high);
  pages.push(total_pages);
  pages.dedup();

  let mut slots = Vec::with_capacity(pages.len() + 2);
  let mut previous: Option<u32> = None;
  for page in pages {
    if previous.is_some_and(|p| page > p + 1) {
      slots.push(PageSlot::Ellipsis);
    }
    slots.push(PageSlot::Page(page));
    previous = Some(page);
  }
  slots
}
