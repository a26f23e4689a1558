//! Particle pool: floating motes that gather into the selected sphere.
//!
//! `ParticleSimulation` owns a fixed pool of [`Particle`] records and advances
//! them once per frame from the frame's [`SceneSnapshot`]. Particles are never
//! created or destroyed after construction, only recycled.

mod particle;
mod rng;

pub use particle::{Lifecycle, Particle};
pub use rng::Rng;

use glam::Vec3;

use crate::api::types::{EmotionId, ViewportClass};
use crate::assets::catalog::EmotionCatalog;
use crate::core::phase::{AnimationPhase, Completion, SceneSnapshot};
use crate::renderer::instance::RenderInstance;

/// Fraction of the selected emotion's cohort that must be absorbed before
/// gathering hands over to zooming. Only the cohort ever flies.
pub const GATHER_THRESHOLD: f32 = 0.9;

/// Particles per lifecycle step. Always sums to the pool size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LifecycleCounts {
    pub hidden: usize,
    pub spawning: usize,
    pub floating: usize,
    pub flying: usize,
    pub absorbing: usize,
    pub absorbed: usize,
}

impl LifecycleCounts {
    pub fn total(&self) -> usize {
        self.hidden + self.spawning + self.floating + self.flying + self.absorbing + self.absorbed
    }
}

pub struct ParticleSimulation {
    particles: Vec<Particle>,
    rng: Rng,
    absorb_duration: f32,
    gather_threshold: f32,
    last_selected: Option<EmotionId>,
    last_epoch: u64,
    pointer: Option<Vec3>,
}

impl ParticleSimulation {
    /// Build a hidden pool with affinities assigned round-robin over `categories`.
    pub fn new(
        pool_size: usize,
        categories: &[EmotionId],
        seed: u64,
        absorb_duration: f32,
        gather_threshold: f32,
    ) -> Self {
        let mut rng = Rng::new(seed.wrapping_add(7919));
        let particles = if categories.is_empty() {
            log::warn!("particle pool has no categories to attach to");
            Vec::new()
        } else {
            (0..pool_size)
                .map(|i| Particle::new(categories[i % categories.len()], &mut rng))
                .collect()
        };
        Self {
            particles,
            rng,
            absorb_duration,
            gather_threshold,
            last_selected: None,
            last_epoch: 0,
            pointer: None,
        }
    }

    /// Pointer position on the z = 0 plane, or `None` when it left the scene.
    pub fn set_pointer(&mut self, pointer: Option<Vec3>) {
        self.pointer = pointer;
    }

    pub fn pointer(&self) -> Option<Vec3> {
        self.pointer
    }

    fn reset_all(&mut self) {
        for p in &mut self.particles {
            p.reset(&mut self.rng);
        }
    }

    /// Advance every particle by `dt`. Pushes `GatherFinished` while gathering
    /// once the selected cohort is absorbed past the threshold.
    pub fn advance(
        &mut self,
        snapshot: &SceneSnapshot,
        catalog: &EmotionCatalog,
        class: ViewportClass,
        now: f64,
        dt: f32,
        completions: &mut Vec<Completion>,
    ) {
        // A clear and reselect of the same emotion within one input batch
        // leaves the id unchanged; the epoch still moves.
        let selection_changed = snapshot.selected != self.last_selected
            || snapshot.selection_epoch != self.last_epoch;
        let previous = self.last_selected;
        self.last_selected = snapshot.selected;
        self.last_epoch = snapshot.selection_epoch;
        if selection_changed && previous.is_some() {
            log::debug!("selection changed from {:?}, recycling particles", previous);
            self.reset_all();
            return;
        }

        if !snapshot.phase.is_revealed() {
            for p in &mut self.particles {
                if p.lifecycle != Lifecycle::Hidden {
                    p.reset(&mut self.rng);
                }
            }
            return;
        }

        let target = snapshot
            .selected
            .and_then(|id| catalog.get(id).map(|desc| (id, desc.anchor(class))));
        let time = now as f32;
        let mut arrived = 0usize;

        for p in &mut self.particles {
            match p.lifecycle {
                Lifecycle::Hidden => p.start_spawning(),
                Lifecycle::Spawning => p.step_spawning(dt),
                Lifecycle::Floating => match target {
                    Some((id, _)) if id == p.affinity => p.lifecycle = Lifecycle::Flying,
                    _ => p.step_floating(dt, time, self.pointer),
                },
                Lifecycle::Flying => match target {
                    Some((_, center)) => {
                        if p.step_flying(dt, center + p.rest_offset, now) {
                            arrived += 1;
                        }
                    }
                    None => p.step_floating(dt, time, self.pointer),
                },
                Lifecycle::Absorbing => {
                    if let Some((_, center)) = target {
                        p.step_absorbing(now, center, self.absorb_duration);
                    }
                }
                Lifecycle::Absorbed => {}
            }
        }

        if arrived > 0 {
            log::trace!("{arrived} particles started absorbing");
        }

        if snapshot.phase == AnimationPhase::Gathering {
            if let Some(id) = snapshot.selected {
                if self.cohort_ratio(id) >= self.gather_threshold {
                    completions.push(Completion::GatherFinished);
                }
            }
        }
    }

    pub fn counts(&self) -> LifecycleCounts {
        let mut counts = LifecycleCounts::default();
        for p in &self.particles {
            match p.lifecycle {
                Lifecycle::Hidden => counts.hidden += 1,
                Lifecycle::Spawning => counts.spawning += 1,
                Lifecycle::Floating => counts.floating += 1,
                Lifecycle::Flying => counts.flying += 1,
                Lifecycle::Absorbing => counts.absorbing += 1,
                Lifecycle::Absorbed => counts.absorbed += 1,
            }
        }
        counts
    }

    /// Absorbed fraction of the particles attached to `id`.
    /// An empty cohort counts as fully gathered.
    pub fn cohort_ratio(&self, id: EmotionId) -> f32 {
        let (size, absorbed) = self
            .particles
            .iter()
            .filter(|p| p.affinity == id)
            .fold((0usize, 0usize), |(size, absorbed), p| {
                (size + 1, absorbed + usize::from(p.lifecycle == Lifecycle::Absorbed))
            });
        if size == 0 {
            1.0
        } else {
            absorbed as f32 / size as f32
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Write visible particles, tinted with their emotion's color.
    pub fn write_instances(&self, catalog: &EmotionCatalog, out: &mut Vec<RenderInstance>) {
        out.clear();
        for p in self.particles.iter().filter(|p| p.lifecycle.is_rendered()) {
            let color = catalog.get(p.affinity).map_or([1.0; 3], |d| d.color);
            out.push(RenderInstance::new(p.position, p.scale, color, p.opacity));
        }
    }
}
