//! Staggered reveals and timer-driven phase completions.
//!
//! Timers live in a min-heap keyed by fire time. Each timer carries the
//! generation that was current when it was scheduled; every phase change
//! bumps the generation, so a timer left over from an abandoned sequence is
//! discarded when it comes due instead of acting on the new phase.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::api::config::SceneConfig;
use crate::api::types::EmotionId;
use crate::assets::catalog::EmotionCatalog;
use crate::core::phase::{AnimationPhase, Completion};

/// What a timer does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    /// Let this sphere move out to its anchor.
    Reveal(EmotionId),
    /// Let the central sphere fade back in (merging).
    ShowMainSphere,
    Complete(Completion),
}

#[derive(Debug, Clone, Copy)]
struct Timer {
    fire_at: f64,
    seq: u64,
    generation: u64,
    action: TimerAction,
}

impl PartialEq for Timer {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Timer {}

impl PartialOrd for Timer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timer {
    // Reversed so BinaryHeap pops the earliest timer; ties fire in schedule order.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .fire_at
            .total_cmp(&self.fire_at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Reveal start offsets for `count` emotion spheres followed by the neutral
/// sphere. Emotion sphere `i` starts at `base + i * stagger`; the neutral one
/// at `count * stagger + extra`, never earlier than the last emotion sphere.
pub fn reveal_offsets(count: usize, stagger: f32, base: f32, extra: f32) -> Vec<f32> {
    let mut offsets: Vec<f32> = (0..count).map(|i| base + i as f32 * stagger).collect();
    let last = offsets.last().copied().unwrap_or(0.0);
    offsets.push((count as f32 * stagger + extra).max(last));
    offsets
}

#[derive(Debug, Default)]
pub struct StaggerScheduler {
    queue: BinaryHeap<Timer>,
    generation: u64,
    next_seq: u64,
}

impl StaggerScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Cancel every pending timer. Stale entries stay queued and are
    /// dropped when they come due.
    pub fn invalidate(&mut self) {
        self.generation += 1;
    }

    /// Queue `action` to fire `delay` seconds after `now`.
    pub fn schedule(&mut self, now: f64, delay: f32, action: TimerAction) {
        let timer = Timer {
            fire_at: now + delay.max(0.0) as f64,
            seq: self.next_seq,
            generation: self.generation,
            action,
        };
        self.next_seq += 1;
        self.queue.push(timer);
    }

    /// Start the timer sequence belonging to a newly entered phase.
    /// Always invalidates the previous sequence first.
    pub fn on_phase_entered(
        &mut self,
        phase: AnimationPhase,
        now: f64,
        catalog: &EmotionCatalog,
        config: &SceneConfig,
    ) {
        self.invalidate();
        match phase {
            AnimationPhase::Intro => {
                let done = TimerAction::Complete(Completion::IntroFinished);
                self.schedule(now, config.intro_duration, done);
            }
            AnimationPhase::Splitting => {
                let offsets = reveal_offsets(
                    catalog.categories().len(),
                    config.reveal_stagger,
                    config.reveal_base_offset,
                    config.neutral_extra_delay,
                );
                let mut last_start = 0.0f32;
                for (id, delay) in catalog.reveal_order().zip(offsets) {
                    self.schedule(now, delay, TimerAction::Reveal(id));
                    last_start = last_start.max(delay);
                }
                // The last reveal's eased progress reaches 1.0 one reveal duration after it starts.
                self.schedule(
                    now,
                    last_start + config.reveal_duration,
                    TimerAction::Complete(Completion::SplitFinished),
                );
            }
            AnimationPhase::Merging => {
                self.schedule(now, config.main_fade_delay, TimerAction::ShowMainSphere);
            }
            _ => {}
        }
    }

    /// Fire every timer due at `now`, appending live actions to `out` in fire order.
    pub fn advance(&mut self, now: f64, out: &mut Vec<TimerAction>) {
        while let Some(timer) = self.queue.peek() {
            if timer.fire_at > now {
                break;
            }
            let Some(timer) = self.queue.pop() else { break };
            if timer.generation != self.generation {
                log::debug!("dropping stale timer {:?}", timer.action);
                continue;
            }
            out.push(timer.action);
        }
    }

    /// Timers that will still fire.
    pub fn pending(&self) -> usize {
        self.queue
            .iter()
            .filter(|t| t.generation == self.generation)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fire(s: &mut StaggerScheduler, now: f64) -> Vec<TimerAction> {
        let mut out = Vec::new();
        s.advance(now, &mut out);
        out
    }

    #[test]
    fn offsets_are_monotonic_with_neutral_last() {
        let offsets = reveal_offsets(6, 0.12, 0.1, 0.2);
        assert_eq!(offsets.len(), 7);
        for pair in offsets.windows(2) {
            assert!(pair[1] >= pair[0], "{:?}", offsets);
        }
        let neutral = *offsets.last().unwrap();
        assert!(offsets[..6].iter().all(|&o| neutral >= o));
    }

    #[test]
    fn neutral_never_precedes_last_sphere() {
        // a large base offset would put the formula's neutral slot too early
        let offsets = reveal_offsets(3, 0.1, 2.0, 0.0);
        assert!(offsets[3] >= offsets[2]);
    }

    #[test]
    fn fires_in_time_order() {
        let mut s = StaggerScheduler::new();
        s.schedule(0.0, 0.5, TimerAction::ShowMainSphere);
        s.schedule(0.0, 0.1, TimerAction::Reveal(EmotionId(0)));
        assert!(fire(&mut s, 0.05).is_empty());
        assert_eq!(fire(&mut s, 0.2), vec![TimerAction::Reveal(EmotionId(0))]);
        assert_eq!(fire(&mut s, 1.0), vec![TimerAction::ShowMainSphere]);
        assert_eq!(s.pending(), 0);
    }

    #[test]
    fn invalidated_timers_are_no_ops() {
        let mut s = StaggerScheduler::new();
        s.schedule(0.0, 0.4, TimerAction::ShowMainSphere);
        s.invalidate();
        assert_eq!(s.pending(), 0);
        assert!(fire(&mut s, 1.0).is_empty());
    }

    #[test]
    fn splitting_sequence_reveals_every_sphere_then_completes() {
        let catalog = EmotionCatalog::default();
        let config = SceneConfig::default();
        let mut s = StaggerScheduler::new();
        s.on_phase_entered(AnimationPhase::Splitting, 10.0, &catalog, &config);

        let fired = fire(&mut s, 100.0);
        let reveals: Vec<_> = fired
            .iter()
            .filter_map(|a| match a {
                TimerAction::Reveal(id) => Some(*id),
                _ => None,
            })
            .collect();
        let expected: Vec<_> = catalog.reveal_order().collect();
        assert_eq!(reveals, expected);
        assert_eq!(fired.last(), Some(&TimerAction::Complete(Completion::SplitFinished)));
    }

    #[test]
    fn split_completes_after_last_reveal_finishes() {
        let catalog = EmotionCatalog::default();
        let config = SceneConfig::default();
        let mut s = StaggerScheduler::new();
        s.on_phase_entered(AnimationPhase::Splitting, 0.0, &catalog, &config);

        let offsets = reveal_offsets(
            6,
            config.reveal_stagger,
            config.reveal_base_offset,
            config.neutral_extra_delay,
        );
        let done_at = (offsets[6] + config.reveal_duration) as f64;
        let early = fire(&mut s, done_at - 0.01);
        assert!(!early.contains(&TimerAction::Complete(Completion::SplitFinished)));
        let late = fire(&mut s, done_at + 0.01);
        assert_eq!(late, vec![TimerAction::Complete(Completion::SplitFinished)]);
    }

    #[test]
    fn phase_change_cancels_previous_sequence() {
        let catalog = EmotionCatalog::default();
        let config = SceneConfig::default();
        let mut s = StaggerScheduler::new();
        s.on_phase_entered(AnimationPhase::Merging, 0.0, &catalog, &config);
        s.on_phase_entered(AnimationPhase::Initial, 0.1, &catalog, &config);
        assert!(fire(&mut s, 5.0).is_empty());
    }
}
