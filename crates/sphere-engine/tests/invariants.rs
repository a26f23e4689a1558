//! Property-based invariants for the scene pipeline.
//!
//! Random input sequences interleaved with random frame counts. After every
//! frame:
//! 1. Lifecycle counts sum to the pool size.
//! 2. With no selection, no particle is flying, absorbing or absorbed.
//! 3. Hover is only set in hover-accepting phases.
//! 4. A selection exists exactly in focusing..transitioning.
//! 5. The split flag only survives in phases reached after splitting.
//! 6. Every navigation request follows an entry into `transitioning`.

use proptest::prelude::*;
use sphere_engine::{
    AnimationPhase, EmotionCatalog, EmotionId, EmotionScene, InputEvent, RenderMode, SceneConfig,
    SceneEvent,
};

const POOL: usize = 36;
const DT: f32 = 1.0 / 60.0;

// ── Strategy helpers ──────────────────────────────────────────────────

fn arb_emotion() -> impl Strategy<Value = EmotionId> {
    // catalog has 7 entries; 7 and 8 are unknown ids
    (0u32..9).prop_map(EmotionId)
}

fn arb_input() -> impl Strategy<Value = InputEvent> {
    prop_oneof![
        (0.0f32..1280.0, 0.0f32..800.0).prop_map(|(x, y)| InputEvent::PointerMove { x, y }),
        Just(InputEvent::PointerLeave),
        proptest::option::of(arb_emotion()).prop_map(InputEvent::HoverSphere),
        arb_emotion().prop_map(InputEvent::ClickSphere),
        Just(InputEvent::ClickMainSphere),
        Just(InputEvent::Confirm),
        Just(InputEvent::Release),
        Just(InputEvent::Deselect),
        Just(InputEvent::ReturnToOverview),
        (200.0f32..2000.0, 200.0f32..1200.0)
            .prop_map(|(width, height)| InputEvent::Resize { width, height }),
    ]
}

fn arb_steps() -> impl Strategy<Value = Vec<(InputEvent, usize)>> {
    prop::collection::vec((arb_input(), 0usize..90), 1..24)
}

fn scene(mode: RenderMode) -> EmotionScene {
    let config = SceneConfig {
        pool_size: POOL,
        ..SceneConfig::default()
    };
    EmotionScene::new(config, EmotionCatalog::default(), mode).expect("default config is valid")
}

fn has_selection_phase(phase: AnimationPhase) -> bool {
    matches!(
        phase,
        AnimationPhase::Focusing
            | AnimationPhase::Focused
            | AnimationPhase::Gathering
            | AnimationPhase::Zooming
            | AnimationPhase::Transitioning
    )
}

fn check_frame(scene: &EmotionScene) -> Result<(), TestCaseError> {
    let snapshot = scene.snapshot();
    let counts = scene.particles().counts();
    prop_assert_eq!(counts.total(), POOL);

    if snapshot.selected.is_none() {
        prop_assert_eq!(counts.flying + counts.absorbing + counts.absorbed, 0, "{:?}", counts);
    }
    if snapshot.hovered.is_some() {
        prop_assert!(snapshot.phase.accepts_hover(), "hover during {:?}", snapshot.phase);
    }
    prop_assert_eq!(snapshot.selected.is_some(), has_selection_phase(snapshot.phase));
    if snapshot.is_split {
        prop_assert!(
            snapshot.phase.is_revealed() || snapshot.phase == AnimationPhase::Merging,
            "split during {:?}",
            snapshot.phase
        );
    }
    Ok(())
}

fn run(mode: RenderMode, steps: &[(InputEvent, usize)]) -> Result<(), TestCaseError> {
    let mut scene = scene(mode);
    let mut entered_transitioning = 0usize;
    let mut navigations = 0usize;
    for &(input, frames) in steps {
        scene.push_input(input);
        for _ in 0..frames.max(1) {
            scene.advance(DT);
            check_frame(&scene)?;
        }
        for event in scene.drain_events() {
            match event {
                SceneEvent::PhaseChanged {
                    to: AnimationPhase::Transitioning,
                    ..
                } => entered_transitioning += 1,
                SceneEvent::Navigate(_) => navigations += 1,
                _ => {}
            }
        }
        prop_assert!(navigations <= entered_transitioning);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn animated_scene_invariants(steps in arb_steps()) {
        run(RenderMode::Animated, &steps)?;
    }

    #[test]
    fn fallback_scene_invariants(steps in arb_steps()) {
        run(RenderMode::Fallback, &steps)?;
    }

    #[test]
    fn scene_never_stalls_in_a_timed_phase(frames in 1usize..4) {
        // focusing always resolves within its duration plus a frame
        let mut scene = scene(RenderMode::Animated);
        for _ in 0..frames {
            scene.advance(DT);
        }
        while scene.snapshot().phase != AnimationPhase::Initial {
            scene.advance(DT);
            prop_assert!(scene.elapsed() < 2.0);
        }
        prop_assert!(scene.start_split());
        while scene.snapshot().phase != AnimationPhase::Idle {
            scene.advance(DT);
            prop_assert!(scene.elapsed() < 5.0);
        }
        prop_assert!(scene.select(EmotionId(0)));
        let started = scene.elapsed();
        while scene.snapshot().phase != AnimationPhase::Focused {
            scene.advance(DT);
            prop_assert!(scene.elapsed() - started <= 0.8 + 2.0 * DT as f64);
        }
    }
}
