use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use log::{debug, warn};
use web_sys::{Document, Element};

use crate::config::SiteConfig;
use crate::dom;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Phase {
    Waiting,
    Scheduled,
    Revealed,
}

/// Per-target reveal progress. Targets only ever move forward.
#[derive(Clone, Debug, PartialEq)]
pub struct RevealTracker {
    phases: Vec<Phase>,
}

pub fn stagger_delay(sibling_index: usize, step_ms: u32) -> u32 {
    (sibling_index as u32).saturating_mul(step_ms)
}

impl RevealTracker {
    pub fn new(len: usize) -> Self {
        Self {
            phases: vec![Phase::Waiting; len],
        }
    }

    /// Called when a target enters the viewport. Returns the delay to reveal
    /// after, only on the first entry.
    pub fn on_enter(&mut self, index: usize, sibling_index: usize, step_ms: u32) -> Option<u32> {
        let phase = self.phases.get_mut(index)?;
        if *phase != Phase::Waiting {
            return None;
        }
        *phase = Phase::Scheduled;
        Some(stagger_delay(sibling_index, step_ms))
    }

    pub fn mark_revealed(&mut self, index: usize) {
        if let Some(phase) = self.phases.get_mut(index) {
            *phase = Phase::Revealed;
        }
    }

    /// Reveal everything still pending, returning the indices to show.
    pub fn reveal_all(&mut self) -> Vec<usize> {
        let mut shown = Vec::new();
        for (index, phase) in self.phases.iter_mut().enumerate() {
            if *phase != Phase::Revealed {
                *phase = Phase::Revealed;
                shown.push(index);
            }
        }
        shown
    }

    pub fn is_revealed(&self, index: usize) -> bool {
        self.phases.get(index) == Some(&Phase::Revealed)
    }
}

/// Position of `target` among the reveal-tagged elements under its parent.
fn sibling_index(target: &Element, selector: &str) -> usize {
    target
        .parent_element()
        .map(|parent| dom::query_all_in(&parent, selector))
        .and_then(|siblings| siblings.iter().position(|s| s == target))
        .unwrap_or(0)
}

pub fn init(document: &Document, config: &SiteConfig) {
    let targets = dom::query_all(document, config.reveal_selector);
    if targets.is_empty() {
        debug!("No reveal targets");
        return;
    }
    let reveal_class = config.reveal_class;
    let tracker = Rc::new(RefCell::new(RevealTracker::new(targets.len())));
    let reveal_now = {
        let tracker = tracker.clone();
        let targets = targets.clone();
        move || {
            for index in tracker.borrow_mut().reveal_all() {
                dom::add_class(&targets[index], reveal_class);
            }
        }
    };

    if dom::EntryStrategy::detect() == dom::EntryStrategy::Immediate {
        debug!("IntersectionObserver missing, revealing {} targets now", targets.len());
        reveal_now();
        return;
    }

    let elements = Rc::new(targets.clone());
    let selector = config.reveal_selector;
    let step_ms = config.reveal_stagger_ms;

    let result = dom::observe_first_intersection(
        &targets,
        config.reveal_root_margin,
        Some(config.reveal_threshold),
        move |target| {
            let Some(index) = elements.iter().position(|e| e == target) else {
                return;
            };
            let sibling = sibling_index(target, selector);
            let Some(delay) = tracker.borrow_mut().on_enter(index, sibling, step_ms) else {
                return;
            };
            let tracker = tracker.clone();
            let target = target.clone();
            Timeout::new(delay, move || {
                dom::add_class(&target, reveal_class);
                tracker.borrow_mut().mark_revealed(index);
            })
            .forget();
        },
    );

    match result {
        Ok(()) => debug!("Observing {} reveal targets", targets.len()),
        Err(err) => {
            warn!("Could not observe reveal targets, showing them: {:?}", err);
            reveal_now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_is_index_times_step() {
        assert_eq!(stagger_delay(0, 100), 0);
        assert_eq!(stagger_delay(3, 100), 300);
    }

    #[test]
    fn first_entry_schedules_by_sibling_index() {
        let mut tracker = RevealTracker::new(2);
        assert_eq!(tracker.on_enter(0, 2, 100), Some(200));
        assert_eq!(tracker.on_enter(1, 0, 100), Some(0));
    }

    #[test]
    fn reveal_fires_once_and_stays() {
        let mut tracker = RevealTracker::new(1);
        assert_eq!(tracker.on_enter(0, 1, 100), Some(100));
        assert_eq!(tracker.on_enter(0, 1, 100), None);

        tracker.mark_revealed(0);
        assert!(tracker.is_revealed(0));
        for _ in 0..3 {
            assert_eq!(tracker.on_enter(0, 1, 100), None);
            assert!(tracker.is_revealed(0));
        }
    }

    #[test]
    fn without_observer_everything_is_revealed_at_once() {
        let mut tracker = RevealTracker::new(4);
        tracker.on_enter(1, 0, 100);
        tracker.mark_revealed(2);

        assert_eq!(tracker.reveal_all(), vec![0, 1, 3]);
        assert!((0..4).all(|i| tracker.is_revealed(i)));
        assert!(tracker.reveal_all().is_empty());
        assert_eq!(tracker.on_enter(0, 0, 100), None);
    }

    #[test]
    fn unknown_index_is_ignored() {
        let mut tracker = RevealTracker::new(1);
        assert_eq!(tracker.on_enter(4, 0, 100), None);
        tracker.mark_revealed(4);
        assert!(!tracker.is_revealed(4));
    }
}
