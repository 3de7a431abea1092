use glam::{vec3, vec4, Vec3, Vec4, Vec4Swizzles};

use crate::{Normal, U32Ext};

/// Geometric attributes of a single pixel, as reported by the renderer.
///
/// The entry is packed into one rgba32f texel: albedo and material id go into
/// the first channel (as four bytes), the octahedron-encoded normal into the
/// second and third, and depth into the fourth; a depth of zero marks a pixel
/// with no geometry behind it.
#[derive(Clone, Copy, Default)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct GBufferEntry {
    pub albedo: Vec3,
    pub material: u32,
    pub normal: Vec3,
    pub depth: f32,
}

impl GBufferEntry {
    pub fn unpack(d0: Vec4) -> Self {
        let [r, g, b, material] = d0.x.to_bits().to_bytes();

        let albedo = vec3(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
        );

        Self {
            albedo,
            material,
            normal: Normal::decode(d0.yz()),
            depth: d0.w,
        }
    }

    pub fn pack(self) -> Vec4 {
        let x = {
            let albedo = self.albedo.clamp(Vec3::ZERO, Vec3::ONE) * 255.0;
            let albedo = albedo.as_uvec3();

            f32::from_bits(u32::from_bytes([
                albedo.x,
                albedo.y,
                albedo.z,
                self.material & 0xff,
            ]))
        };

        let normal = Normal::encode(self.normal);

        vec4(x, normal.x, normal.y, self.depth)
    }

    pub fn is_some(&self) -> bool {
        self.depth != Default::default()
    }

    pub fn is_none(&self) -> bool {
        !self.is_some()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    const EPSILON: f32 = 0.01;

    #[test]
    fn serialization() {
        let target = GBufferEntry {
            albedo: vec3(0.1, 0.2, 0.3),
            material: 7,
            normal: vec3(0.26, 0.53, 0.80).normalize(),
            depth: 123.456,
        };

        let entry = GBufferEntry::unpack(target.pack());

        assert_relative_eq!(entry.albedo.x, 0.1, epsilon = EPSILON);
        assert_relative_eq!(entry.albedo.y, 0.2, epsilon = EPSILON);
        assert_relative_eq!(entry.albedo.z, 0.3, epsilon = EPSILON);

        assert_eq!(entry.material, 7);

        assert_relative_eq!(entry.normal.x, target.normal.x, epsilon = EPSILON);
        assert_relative_eq!(entry.normal.y, target.normal.y, epsilon = EPSILON);
        assert_relative_eq!(entry.normal.z, target.normal.z, epsilon = EPSILON);

        assert_relative_eq!(entry.depth, 123.456, epsilon = EPSILON);
    }

    #[test]
    fn emptiness() {
        assert!(GBufferEntry::default().is_none());

        let entry = GBufferEntry {
            depth: 1.0,
            ..Default::default()
        };

        assert!(entry.is_some());
    }
}
