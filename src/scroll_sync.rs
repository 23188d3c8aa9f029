use std::time::{Duration, Instant};

use crate::timer::Timer;

pub const DEFAULT_SUPPRESSION: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemExtent {
    pub top: usize,
    pub height: usize,
}

#[derive(Debug, Clone)]
pub struct ScrollSync {
    suppression: Timer,
    window: Duration,
}

impl Default for ScrollSync {
    fn default() -> Self {
        Self::new(DEFAULT_SUPPRESSION)
    }
}

impl ScrollSync {
    pub fn new(window: Duration) -> Self {
        Self {
            suppression: Timer::new(),
            window,
        }
    }

    pub fn suppress(&mut self, now: Instant) {
        self.suppression.schedule(now, self.window);
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppression.is_pending()
    }

    pub fn tick(&mut self, now: Instant) {
        if self.suppression.fire(now) {
            log::trace!("scroll suppression lifted");
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.suppression.deadline()
    }

    pub fn on_scroll(
        &mut self,
        scroll_top: usize,
        extents: &[ItemExtent],
        current: usize,
        now: Instant,
    ) -> Option<usize> {
        self.tick(now);
        if self.is_suppressed() {
            return None;
        }
        let index = item_at(scroll_top, extents)?;
        (index != current).then_some(index)
    }
}

// Item whose top edge is closest to `scroll_top` without sitting more than
// half its own height above it.
pub fn item_at(scroll_top: usize, extents: &[ItemExtent]) -> Option<usize> {
    extents
        .iter()
        .enumerate()
        .filter(|(_, extent)| extent.top + extent.height / 2 >= scroll_top)
        .min_by_key(|(_, extent)| extent.top.abs_diff(scroll_top))
        .map(|(index, _)| index)
}

pub fn uniform_extents(count: usize, height: usize) -> Vec<ItemExtent> {
    (0..count)
        .map(|index| ItemExtent {
            top: index * height,
            height,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_item_nearest_to_top_edge() {
        let extents = uniform_extents(10, 2);
        assert_eq!(item_at(0, &extents), Some(0));
        assert_eq!(item_at(4, &extents), Some(2));
        // Item 2 starts one row above; half its height keeps it eligible.
        assert_eq!(item_at(5, &extents), Some(2));
        assert_eq!(item_at(100, &extents), None);
    }

    #[test]
    fn half_hidden_item_loses_to_next() {
        let extents = uniform_extents(5, 4);
        // Item 1 spans 4..8; scrolled to 7 it is more than half gone.
        assert_eq!(item_at(7, &extents), Some(2));
    }

    #[test]
    fn suppressed_scrolls_are_ignored() {
        let now = Instant::now();
        let mut sync = ScrollSync::default();
        let extents = uniform_extents(10, 2);
        sync.suppress(now);
        assert_eq!(sync.on_scroll(6, &extents, 0, now), None);
        let later = now + DEFAULT_SUPPRESSION;
        assert_eq!(sync.on_scroll(6, &extents, 0, later), Some(3));
    }

    #[test]
    fn same_index_is_not_reported() {
        let mut sync = ScrollSync::default();
        let extents = uniform_extents(3, 2);
        assert_eq!(sync.on_scroll(0, &extents, 0, Instant::now()), None);
    }
}
