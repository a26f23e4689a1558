/// Frame buffer layout shared with the JS renderer.
/// Must stay in sync with TypeScript `protocol.ts`.
///
/// Layout (all values in f32 / 4 bytes):
/// ```text
/// [Header: 16 floats]
/// [Camera: 20 floats (view_proj 4x4, eye position xyzw)]
/// [Spheres: max_spheres × 8 floats]
/// [Particles: max_particles × 8 floats]
/// [Events: max_events × 4 floats]
/// ```
///
/// Capacities are written into the header every frame.
/// TypeScript reads them from the header to compute offsets dynamically.

use crate::api::types::{emotion_to_f32, WireEvent};
use crate::core::phase::SceneSnapshot;
use crate::renderer::camera::CameraUniform;
use crate::renderer::instance::{RenderBuffer, RenderInstance};

/// Number of floats in the header section.
pub const HEADER_FLOATS: usize = 16;

/// Header field indices.
pub const HEADER_PROTOCOL_VERSION: usize = 0;
pub const HEADER_FRAME_COUNTER: usize = 1;
pub const HEADER_PHASE: usize = 2;
pub const HEADER_SELECTED: usize = 3;
pub const HEADER_HOVERED: usize = 4;
pub const HEADER_SPLIT: usize = 5;
pub const HEADER_SPHERE_COUNT: usize = 6;
pub const HEADER_MAX_SPHERES: usize = 7;
pub const HEADER_PARTICLE_COUNT: usize = 8;
pub const HEADER_MAX_PARTICLES: usize = 9;
pub const HEADER_EVENT_COUNT: usize = 10;
pub const HEADER_MAX_EVENTS: usize = 11;
pub const HEADER_FALLBACK: usize = 12;
pub const HEADER_ASPECT: usize = 13;
pub const HEADER_ELAPSED: usize = 14;

/// Protocol version written into the header.
pub const PROTOCOL_VERSION: f32 = 1.0;

/// Floats in the camera section (fixed by the wire format).
pub const CAMERA_FLOATS: usize = CameraUniform::FLOATS;

/// Floats per sphere or particle instance (fixed by the wire format).
pub const INSTANCE_FLOATS: usize = RenderInstance::FLOATS;

/// Floats per scene event: kind, a, b, c (fixed by the wire format).
pub const EVENT_FLOATS: usize = WireEvent::FLOATS;

/// Runtime-computed buffer layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolLayout {
    pub max_spheres: usize,
    pub max_particles: usize,
    pub max_events: usize,

    /// Offset (in floats) where the camera uniform begins.
    pub camera_offset: usize,
    /// Offset (in floats) where sphere instances begin.
    pub sphere_data_offset: usize,
    /// Offset (in floats) where particle instances begin.
    pub particle_data_offset: usize,
    /// Offset (in floats) where events begin.
    pub event_data_offset: usize,

    /// Total buffer size in floats.
    pub buffer_total_floats: usize,
    /// Total buffer size in bytes.
    pub buffer_total_bytes: usize,
}

impl ProtocolLayout {
    pub fn new(max_spheres: usize, max_particles: usize, max_events: usize) -> Self {
        let camera_offset = HEADER_FLOATS;
        let sphere_data_offset = camera_offset + CAMERA_FLOATS;
        let particle_data_offset = sphere_data_offset + max_spheres * INSTANCE_FLOATS;
        let event_data_offset = particle_data_offset + max_particles * INSTANCE_FLOATS;
        let buffer_total_floats = event_data_offset + max_events * EVENT_FLOATS;

        Self {
            max_spheres,
            max_particles,
            max_events,
            camera_offset,
            sphere_data_offset,
            particle_data_offset,
            event_data_offset,
            buffer_total_floats,
            buffer_total_bytes: buffer_total_floats * 4,
        }
    }
}

/// Per-frame scalars that go into the header.
#[derive(Debug, Clone, Copy)]
pub struct FrameInfo {
    pub frame: u64,
    pub snapshot: SceneSnapshot,
    pub fallback: bool,
    pub aspect: f32,
    pub elapsed: f64,
}

/// Write one frame into `out` (resized to the layout's total).
/// Sections beyond their capacity are truncated; the header carries the
/// counts actually written.
pub fn pack_frame(
    layout: &ProtocolLayout,
    info: &FrameInfo,
    render: &RenderBuffer,
    events: &[WireEvent],
    out: &mut Vec<f32>,
) {
    out.clear();
    out.resize(layout.buffer_total_floats, 0.0);

    let spheres = &render.spheres[..render.spheres.len().min(layout.max_spheres)];
    let particles = &render.particles[..render.particles.len().min(layout.max_particles)];
    let events = &events[..events.len().min(layout.max_events)];
    if spheres.len() < render.spheres.len() || particles.len() < render.particles.len() {
        log::warn!(
            "frame buffer full: {}/{} spheres, {}/{} particles",
            spheres.len(),
            render.spheres.len(),
            particles.len(),
            render.particles.len()
        );
    }

    let header = &mut out[..HEADER_FLOATS];
    header[HEADER_PROTOCOL_VERSION] = PROTOCOL_VERSION;
    // f32 keeps frame counts exact up to 2^24 (~77 hours at 60 Hz).
    header[HEADER_FRAME_COUNTER] = (info.frame % (1 << 24)) as f32;
    header[HEADER_PHASE] = info.snapshot.phase.as_u8() as f32;
    header[HEADER_SELECTED] = emotion_to_f32(info.snapshot.selected);
    header[HEADER_HOVERED] = emotion_to_f32(info.snapshot.hovered);
    header[HEADER_SPLIT] = if info.snapshot.is_split { 1.0 } else { 0.0 };
    header[HEADER_SPHERE_COUNT] = spheres.len() as f32;
    header[HEADER_MAX_SPHERES] = layout.max_spheres as f32;
    header[HEADER_PARTICLE_COUNT] = particles.len() as f32;
    header[HEADER_MAX_PARTICLES] = layout.max_particles as f32;
    header[HEADER_EVENT_COUNT] = events.len() as f32;
    header[HEADER_MAX_EVENTS] = layout.max_events as f32;
    header[HEADER_FALLBACK] = if info.fallback { 1.0 } else { 0.0 };
    header[HEADER_ASPECT] = info.aspect;
    header[HEADER_ELAPSED] = info.elapsed as f32;

    let camera: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&render.camera));
    out[layout.camera_offset..layout.camera_offset + CAMERA_FLOATS].copy_from_slice(camera);

    write_section(out, layout.sphere_data_offset, bytemuck::cast_slice(spheres));
    write_section(out, layout.particle_data_offset, bytemuck::cast_slice(particles));
    write_section(out, layout.event_data_offset, bytemuck::cast_slice(events));
}

fn write_section(out: &mut [f32], offset: usize, data: &[f32]) {
    out[offset..offset + data.len()].copy_from_slice(data);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{EmotionId, SceneEvent};
    use crate::core::phase::AnimationPhase;
    use glam::Vec3;

    fn info() -> FrameInfo {
        FrameInfo {
            frame: 7,
            snapshot: SceneSnapshot {
                phase: AnimationPhase::Focused,
                selected: Some(EmotionId(2)),
                hovered: None,
                is_split: true,
                selection_epoch: 1,
            },
            fallback: false,
            aspect: 1.5,
            elapsed: 3.25,
        }
    }

    #[test]
    fn offsets_are_contiguous() {
        let layout = ProtocolLayout::new(8, 150, 32);
        assert_eq!(layout.camera_offset, HEADER_FLOATS);
        assert_eq!(layout.sphere_data_offset, HEADER_FLOATS + 20);
        assert_eq!(layout.particle_data_offset, layout.sphere_data_offset + 8 * 8);
        assert_eq!(layout.event_data_offset, layout.particle_data_offset + 150 * 8);
        assert_eq!(layout.buffer_total_floats, layout.event_data_offset + 32 * 4);
        assert_eq!(layout.buffer_total_bytes, layout.buffer_total_floats * 4);
    }

    #[test]
    fn header_reflects_snapshot() {
        let layout = ProtocolLayout::new(8, 4, 4);
        let mut render = RenderBuffer::new(8, 4);
        let red = RenderInstance::new(Vec3::new(1.0, 2.0, 3.0), 0.9, [1.0, 0.0, 0.0], 1.0);
        render.spheres.push(red);
        let events = [SceneEvent::Navigate(EmotionId(2)).to_wire()];
        let mut out = Vec::new();
        pack_frame(&layout, &info(), &render, &events, &mut out);

        assert_eq!(out.len(), layout.buffer_total_floats);
        assert_eq!(out[HEADER_PROTOCOL_VERSION], PROTOCOL_VERSION);
        assert_eq!(out[HEADER_FRAME_COUNTER], 7.0);
        assert_eq!(out[HEADER_PHASE], AnimationPhase::Focused.as_u8() as f32);
        assert_eq!(out[HEADER_SELECTED], 2.0);
        assert_eq!(out[HEADER_HOVERED], -1.0);
        assert_eq!(out[HEADER_SPLIT], 1.0);
        assert_eq!(out[HEADER_SPHERE_COUNT], 1.0);
        assert_eq!(out[HEADER_EVENT_COUNT], 1.0);

        let s = layout.sphere_data_offset;
        assert_eq!(&out[s..s + 4], &[1.0, 2.0, 3.0, 0.9]);
        let e = layout.event_data_offset;
        assert_eq!(out[e], SceneEvent::KIND_NAVIGATE);
        assert_eq!(out[e + 1], 2.0);
    }

    #[test]
    fn sections_truncate_at_capacity() {
        let layout = ProtocolLayout::new(1, 2, 1);
        let mut render = RenderBuffer::new(4, 4);
        for i in 0..4 {
            render.spheres.push(RenderInstance::new(Vec3::splat(i as f32), 1.0, [1.0; 3], 1.0));
            render.particles.push(RenderInstance::new(Vec3::splat(i as f32), 0.1, [1.0; 3], 1.0));
        }
        let mut out = Vec::new();
        pack_frame(&layout, &info(), &render, &[], &mut out);
        assert_eq!(out.len(), layout.buffer_total_floats);
        assert_eq!(out[HEADER_SPHERE_COUNT], 1.0);
        assert_eq!(out[HEADER_PARTICLE_COUNT], 2.0);
        assert_eq!(out[HEADER_EVENT_COUNT], 0.0);
    }
}
