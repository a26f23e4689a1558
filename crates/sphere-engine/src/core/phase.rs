//! The global animation phase and the controller that owns it.
//!
//! `PhaseController` is the only writer of phase, selection and hover. Every
//! other component reads a [`SceneSnapshot`] taken once per frame. Requests
//! that do not fit the current phase are UI races (double clicks, clicks
//! during a transition) and are ignored rather than treated as errors.

use serde::{Deserialize, Serialize};

use crate::api::types::EmotionId;

/// What the overview scene is doing. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum AnimationPhase {
    #[default]
    Intro = 0,
    Initial = 1,
    Splitting = 2,
    Idle = 3,
    Focusing = 4,
    Focused = 5,
    Gathering = 6,
    Zooming = 7,
    Transitioning = 8,
    Merging = 9,
}

impl AnimationPhase {
    pub const COUNT: usize = 10;

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Intro),
            1 => Some(Self::Initial),
            2 => Some(Self::Splitting),
            3 => Some(Self::Idle),
            4 => Some(Self::Focusing),
            5 => Some(Self::Focused),
            6 => Some(Self::Gathering),
            7 => Some(Self::Zooming),
            8 => Some(Self::Transitioning),
            9 => Some(Self::Merging),
            _ => None,
        }
    }

    /// Convert to u8 for the wire header.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Intro => "intro",
            Self::Initial => "initial",
            Self::Splitting => "splitting",
            Self::Idle => "idle",
            Self::Focusing => "focusing",
            Self::Focused => "focused",
            Self::Gathering => "gathering",
            Self::Zooming => "zooming",
            Self::Transitioning => "transitioning",
            Self::Merging => "merging",
        }
    }

    /// Spheres sit at their anchors and particles are alive.
    pub fn is_revealed(self) -> bool {
        matches!(
            self,
            Self::Idle
                | Self::Focusing
                | Self::Focused
                | Self::Gathering
                | Self::Zooming
                | Self::Transitioning
        )
    }

    pub fn accepts_hover(self) -> bool {
        matches!(self, Self::Idle | Self::Focused)
    }

    /// Phases `return_to_overview` may leave from.
    pub fn is_detail(self) -> bool {
        matches!(self, Self::Focused | Self::Gathering | Self::Zooming | Self::Transitioning)
    }

    /// Phases that only a completion signal can leave.
    pub fn is_transient(self) -> bool {
        Completion::for_phase(self).is_some()
    }
}

/// "The continuous animation behind this phase is done."
/// Raised by the component that owns that animation during a frame and
/// applied by the controller after the frame's update pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Completion {
    IntroFinished,
    SplitFinished,
    FocusFinished,
    GatherFinished,
    ZoomFinished,
    MergeFinished,
}

impl Completion {
    /// The phase this signal completes.
    pub fn source(self) -> AnimationPhase {
        match self {
            Self::IntroFinished => AnimationPhase::Intro,
            Self::SplitFinished => AnimationPhase::Splitting,
            Self::FocusFinished => AnimationPhase::Focusing,
            Self::GatherFinished => AnimationPhase::Gathering,
            Self::ZoomFinished => AnimationPhase::Zooming,
            Self::MergeFinished => AnimationPhase::Merging,
        }
    }

    /// The phase entered when the signal is accepted.
    pub fn target(self) -> AnimationPhase {
        match self {
            Self::IntroFinished => AnimationPhase::Initial,
            Self::SplitFinished => AnimationPhase::Idle,
            Self::FocusFinished => AnimationPhase::Focused,
            Self::GatherFinished => AnimationPhase::Zooming,
            Self::ZoomFinished => AnimationPhase::Transitioning,
            Self::MergeFinished => AnimationPhase::Initial,
        }
    }

    pub fn for_phase(phase: AnimationPhase) -> Option<Self> {
        match phase {
            AnimationPhase::Intro => Some(Self::IntroFinished),
            AnimationPhase::Splitting => Some(Self::SplitFinished),
            AnimationPhase::Focusing => Some(Self::FocusFinished),
            AnimationPhase::Gathering => Some(Self::GatherFinished),
            AnimationPhase::Zooming => Some(Self::ZoomFinished),
            AnimationPhase::Merging => Some(Self::MergeFinished),
            _ => None,
        }
    }
}

/// Frame-stable view of the controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SceneSnapshot {
    pub phase: AnimationPhase,
    pub selected: Option<EmotionId>,
    pub hovered: Option<EmotionId>,
    pub is_split: bool,
    /// Bumped whenever the selection is set or cleared, so a clear followed
    /// by a reselect of the same emotion is still visible to frame consumers.
    #[serde(skip)]
    pub selection_epoch: u64,
}

impl SceneSnapshot {
    pub fn is_selected(&self, id: EmotionId) -> bool {
        self.selected == Some(id)
    }

    /// Hover only counts in phases that accept it.
    pub fn is_hovered(&self, id: EmotionId) -> bool {
        self.phase.accepts_hover() && self.hovered == Some(id)
    }
}

/// An accepted phase change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: AnimationPhase,
    pub to: AnimationPhase,
}

/// Owner of phase, selection, hover and the split flag.
#[derive(Debug, Clone)]
pub struct PhaseController {
    phase: AnimationPhase,
    selected: Option<EmotionId>,
    hovered: Option<EmotionId>,
    split: bool,
    selection_epoch: u64,
    emotion_count: usize,
}

impl PhaseController {
    /// Start in `intro` with nothing selected. Ids at or beyond
    /// `emotion_count` are rejected.
    pub fn new(emotion_count: usize) -> Self {
        Self {
            phase: AnimationPhase::Intro,
            selected: None,
            hovered: None,
            split: false,
            selection_epoch: 0,
            emotion_count,
        }
    }

    pub fn phase(&self) -> AnimationPhase {
        self.phase
    }

    pub fn selected(&self) -> Option<EmotionId> {
        self.selected
    }

    pub fn hovered(&self) -> Option<EmotionId> {
        self.hovered
    }

    pub fn is_split(&self) -> bool {
        self.split
    }

    pub fn selection_epoch(&self) -> u64 {
        self.selection_epoch
    }

    fn set_selected(&mut self, id: Option<EmotionId>) {
        self.selected = id;
        self.selection_epoch += 1;
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            phase: self.phase,
            selected: self.selected,
            hovered: self.hovered,
            is_split: self.split,
            selection_epoch: self.selection_epoch,
        }
    }

    fn enter(&mut self, to: AnimationPhase) -> Transition {
        let from = self.phase;
        self.phase = to;
        if !to.accepts_hover() {
            self.hovered = None;
        }
        log::info!("phase {} -> {}", from.name(), to.name());
        Transition { from, to }
    }

    fn reject(&self, request: &str) -> Option<Transition> {
        log::debug!("ignoring {request} during {}", self.phase.name());
        None
    }

    /// `idle` → `focusing` with `id` selected. Requires the spheres to be split.
    pub fn select(&mut self, id: EmotionId) -> Option<Transition> {
        if self.phase != AnimationPhase::Idle || !self.split {
            return self.reject("select");
        }
        if id.index() >= self.emotion_count {
            log::warn!("select: unknown emotion {}", id.0);
            return None;
        }
        self.set_selected(Some(id));
        Some(self.enter(AnimationPhase::Focusing))
    }

    /// `initial` → `splitting`.
    pub fn start_split(&mut self) -> Option<Transition> {
        if self.phase != AnimationPhase::Initial {
            return self.reject("start_split");
        }
        Some(self.enter(AnimationPhase::Splitting))
    }

    /// Any detail phase → `merging`, clearing the selection.
    pub fn return_to_overview(&mut self) -> Option<Transition> {
        if !self.phase.is_detail() {
            return self.reject("return_to_overview");
        }
        self.set_selected(None);
        Some(self.enter(AnimationPhase::Merging))
    }

    /// `focused` → `gathering`: the user confirmed the focused emotion.
    pub fn confirm(&mut self) -> Option<Transition> {
        if self.phase != AnimationPhase::Focused {
            return self.reject("confirm");
        }
        Some(self.enter(AnimationPhase::Gathering))
    }

    /// `gathering` → `focused`: back out before the dive starts.
    pub fn release(&mut self) -> Option<Transition> {
        if self.phase != AnimationPhase::Gathering {
            return self.reject("release");
        }
        Some(self.enter(AnimationPhase::Focused))
    }

    /// `focused` → `idle`, clearing the selection but keeping the spheres split.
    pub fn deselect(&mut self) -> Option<Transition> {
        if self.phase != AnimationPhase::Focused {
            return self.reject("deselect");
        }
        self.set_selected(None);
        Some(self.enter(AnimationPhase::Idle))
    }

    /// Update hover. Returns true if the hovered emotion changed.
    pub fn set_hovered(&mut self, id: Option<EmotionId>) -> bool {
        if !self.phase.accepts_hover() {
            log::debug!("ignoring hover during {}", self.phase.name());
            return false;
        }
        if id.is_some_and(|id| id.index() >= self.emotion_count) {
            return false;
        }
        if self.hovered == id {
            return false;
        }
        self.hovered = id;
        true
    }

    /// Apply a completion signal if it belongs to the current phase.
    pub fn complete(&mut self, signal: Completion) -> Option<Transition> {
        if signal.source() != self.phase {
            log::debug!("stale completion {:?} during {}", signal, self.phase.name());
            return None;
        }
        match signal {
            Completion::SplitFinished => self.split = true,
            Completion::MergeFinished => self.split = false,
            _ => {}
        }
        Some(self.enter(signal.target()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLARITY: EmotionId = EmotionId(2);

    fn split_controller() -> PhaseController {
        let mut c = PhaseController::new(7);
        c.complete(Completion::IntroFinished).unwrap();
        c.start_split().unwrap();
        c.complete(Completion::SplitFinished).unwrap();
        c
    }

    fn focused_controller() -> PhaseController {
        let mut c = split_controller();
        c.select(CLARITY).unwrap();
        c.complete(Completion::FocusFinished).unwrap();
        c
    }

    #[test]
    fn phase_round_trips_through_u8() {
        for v in 0..AnimationPhase::COUNT as u8 {
            assert_eq!(AnimationPhase::from_u8(v).unwrap().as_u8(), v);
        }
        assert_eq!(AnimationPhase::from_u8(10), None);
    }

    #[test]
    fn happy_path_reaches_idle_with_split() {
        let c = split_controller();
        assert_eq!(c.phase(), AnimationPhase::Idle);
        assert!(c.is_split());
    }

    #[test]
    fn select_requires_idle() {
        let mut c = PhaseController::new(7);
        assert!(c.select(CLARITY).is_none());
        assert_eq!(c.selected(), None);

        let mut c = split_controller();
        let t = c.select(CLARITY).unwrap();
        assert_eq!(t.to, AnimationPhase::Focusing);
        assert_eq!(c.selected(), Some(CLARITY));

        // double click while focusing
        assert!(c.select(EmotionId(0)).is_none());
        assert_eq!(c.selected(), Some(CLARITY));
    }

    #[test]
    fn select_rejects_unknown_id() {
        let mut c = split_controller();
        assert!(c.select(EmotionId(99)).is_none());
        assert_eq!(c.phase(), AnimationPhase::Idle);
    }

    #[test]
    fn transient_phases_ignore_foreign_completions() {
        let mut c = split_controller();
        c.select(CLARITY).unwrap();
        assert!(c.complete(Completion::MergeFinished).is_none());
        assert!(c.complete(Completion::SplitFinished).is_none());
        assert_eq!(c.phase(), AnimationPhase::Focusing);
        assert!(c.return_to_overview().is_none());
    }

    #[test]
    fn hover_only_in_idle_and_focused() {
        let mut c = PhaseController::new(7);
        assert!(!c.set_hovered(Some(CLARITY)));

        let mut c = split_controller();
        assert!(c.set_hovered(Some(CLARITY)));
        assert!(!c.set_hovered(Some(CLARITY)));
        assert!(c.set_hovered(None));
    }

    #[test]
    fn entering_focusing_clears_hover() {
        let mut c = split_controller();
        c.set_hovered(Some(EmotionId(0)));
        c.select(CLARITY).unwrap();
        assert_eq!(c.hovered(), None);
    }

    #[test]
    fn dive_and_return_cycle() {
        let mut c = focused_controller();
        c.confirm().unwrap();
        assert_eq!(c.phase(), AnimationPhase::Gathering);
        c.complete(Completion::GatherFinished).unwrap();
        c.complete(Completion::ZoomFinished).unwrap();
        assert_eq!(c.phase(), AnimationPhase::Transitioning);

        let t = c.return_to_overview().unwrap();
        assert_eq!(t.to, AnimationPhase::Merging);
        assert_eq!(c.selected(), None);
        assert!(c.is_split());

        c.complete(Completion::MergeFinished).unwrap();
        assert_eq!(c.phase(), AnimationPhase::Initial);
        assert!(!c.is_split());
    }

    #[test]
    fn release_returns_to_focused() {
        let mut c = focused_controller();
        c.confirm().unwrap();
        let t = c.release().unwrap();
        assert_eq!(
            t,
            Transition {
                from: AnimationPhase::Gathering,
                to: AnimationPhase::Focused,
            }
        );
        assert_eq!(c.selected(), Some(CLARITY));
    }

    #[test]
    fn deselect_keeps_split() {
        let mut c = focused_controller();
        c.deselect().unwrap();
        assert_eq!(c.phase(), AnimationPhase::Idle);
        assert_eq!(c.selected(), None);
        assert!(c.is_split());
    }

    #[test]
    fn every_selection_change_bumps_the_epoch() {
        let mut c = focused_controller();
        let focused = c.selection_epoch();
        c.deselect().unwrap();
        c.select(CLARITY).unwrap();
        assert_eq!(c.selected(), Some(CLARITY));
        assert_eq!(c.selection_epoch(), focused + 2);

        // rejected requests leave it alone
        assert!(c.select(EmotionId(0)).is_none());
        assert_eq!(c.snapshot().selection_epoch, focused + 2);
    }

    #[test]
    fn transient_classification() {
        assert!(AnimationPhase::Focusing.is_transient());
        assert!(AnimationPhase::Merging.is_transient());
        assert!(!AnimationPhase::Idle.is_transient());
        assert!(!AnimationPhase::Transitioning.is_transient());
    }
}
