use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::assets::{SpriteKey, SpriteSheet};
use crate::sim::scene::Scene;

const PET_COLOR: u32 = 0xF2A65AFF; // ginger
const CLOUD_COLOR: u32 = 0xFFFFFFE0;
const TREAT_COLOR: u32 = 0xE8B04BFF;
const POOP_COLOR: u32 = 0x7A4E2DFF;

/// Per-instance data uploaded to GPU each frame.
/// Stride = 28 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct SpriteInstance {
    /// Center of the quad in screen pixels.
    pub position: [f32; 2],
    /// Quad size in pixels.
    pub size: [f32; 2],
    /// RGBA color packed as u32.
    pub color: u32,
    /// Shader frame id.
    pub frame: u32,
    /// 1 = mirror horizontally.
    pub flip: u32,
}

impl SpriteInstance {
    const ATTRIBS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        2 => Float32x2,  // position
        3 => Float32x2,  // size
        4 => Uint32,     // color
        5 => Uint32,     // frame
        6 => Uint32,     // flip
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }

    fn new(top_left: Vec2, size: Vec2, color: u32, frame: u32, flip: bool) -> Self {
        Self {
            position: (top_left + size * 0.5).into(),
            size: size.into(),
            color,
            frame,
            flip: flip as u32,
        }
    }
}

/// Turn a scene into a back-to-front draw list. Anything whose sprite the
/// sheet can't resolve is left out.
pub fn build_instances(scene: &Scene, sheet: &SpriteSheet, buf: &mut Vec<SpriteInstance>) {
    buf.clear();

    let mut layer = |key: SpriteKey, positions: &[Vec2], size: Vec2, color: u32| {
        let Some(handle) = sheet.lookup(key) else {
            return;
        };
        buf.extend(
            positions
                .iter()
                .map(|&p| SpriteInstance::new(p, size, color, handle.0, false)),
        );
    };

    layer(SpriteKey::Cloud, &scene.clouds, scene.cloud_size, CLOUD_COLOR);
    layer(SpriteKey::Poop, &scene.poops, scene.poop_size, POOP_COLOR);
    layer(SpriteKey::Treat, &scene.treats, scene.treat_size, TREAT_COLOR);

    let pet = &scene.pet;
    if let Some(handle) = sheet.lookup(SpriteKey::Pet(pet.sprite)) {
        buf.push(SpriteInstance::new(
            pet.pos,
            pet.size,
            PET_COLOR,
            handle.0,
            pet.mirrored,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pet::PetSprite;
    use crate::sim::scene::PetView;

    fn scene() -> Scene {
        Scene {
            pet: PetView {
                pos: Vec2::new(100.0, 28.0),
                size: Vec2::splat(40.0),
                mirrored: true,
                sprite: PetSprite::Walk(1),
            },
            cloud_size: Vec2::new(48.0, 24.0),
            clouds: vec![Vec2::new(-48.0, 12.0), Vec2::new(60.0, 15.0)],
            treat_size: Vec2::splat(14.0),
            treats: vec![Vec2::new(10.0, 32.0)],
            poop_size: Vec2::new(14.0, 12.0),
            poops: vec![Vec2::new(200.0, 56.0)],
        }
    }

    #[test]
    fn draws_back_to_front_with_pet_last() {
        let mut buf = Vec::new();
        build_instances(&scene(), &SpriteSheet::builtin(), &mut buf);

        let frames: Vec<u32> = buf.iter().map(|i| i.frame).collect();
        assert_eq!(frames, [7, 7, 9, 8, 2]);

        let pet = buf.last().copied().unwrap();
        assert_eq!(pet.position, [120.0, 48.0]);
        assert_eq!(pet.size, [40.0, 40.0]);
        assert_eq!(pet.flip, 1);
    }

    #[test]
    fn unresolved_sprites_are_skipped() {
        let sheet = SpriteSheet {
            cloud: None,
            walk: Vec::new(),
            ..SpriteSheet::builtin()
        };
        let mut buf = vec![SpriteInstance::zeroed()];
        build_instances(&scene(), &sheet, &mut buf);

        let frames: Vec<u32> = buf.iter().map(|i| i.frame).collect();
        assert_eq!(frames, [9, 8]);
    }
}
