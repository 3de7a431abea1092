use glam::{vec2, vec4, UVec2, Vec2, Vec4};

use crate::TexRgba32;

/// Result of reprojecting a pixel into the previous frame.
///
/// `prev_x` and `prev_y` are fractional screen coordinates, `confidence` says
/// how geometrically similar the previous surface is (zero meaning a
/// disocclusion), and `validity` is a bitmask with one bit per bilinear tap
/// around the reprojected point.
#[derive(Clone, Copy, Default)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug, PartialEq))]
pub struct Reprojection {
    pub prev_x: f32,
    pub prev_y: f32,
    pub confidence: f32,
    pub validity: u32,
}

impl Reprojection {
    pub fn serialize(&self) -> Vec4 {
        vec4(
            self.prev_x,
            self.prev_y,
            self.confidence,
            f32::from_bits(self.validity),
        )
    }

    pub fn deserialize(d0: Vec4) -> Self {
        Self {
            prev_x: d0.x,
            prev_y: d0.y,
            confidence: d0.z,
            validity: d0.w.to_bits(),
        }
    }

    pub fn is_some(&self) -> bool {
        self.confidence > 0.0
    }

    pub fn is_none(&self) -> bool {
        !self.is_some()
    }

    pub fn prev_pos(&self) -> Vec2 {
        vec2(self.prev_x, self.prev_y)
    }

    pub fn prev_pos_round(&self) -> UVec2 {
        self.prev_pos().round().as_uvec2()
    }

    pub fn prev_pos_fract(&self) -> Vec2 {
        self.prev_pos().fract()
    }

    pub fn is_exact(&self) -> bool {
        self.prev_pos_fract().length_squared() == 0.0
    }
}

pub struct ReprojectionMap<'a> {
    tex: TexRgba32<'a>,
}

impl<'a> ReprojectionMap<'a> {
    pub fn new(tex: TexRgba32<'a>) -> Self {
        Self { tex }
    }

    pub fn get(&self, screen_pos: UVec2) -> Reprojection {
        Reprojection::deserialize(self.tex.read(screen_pos))
    }

    pub fn set(&self, screen_pos: UVec2, reprojection: &Reprojection) {
        unsafe {
            self.tex.write(screen_pos, reprojection.serialize());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialization() {
        let target = Reprojection {
            prev_x: 123.45,
            prev_y: 234.56,
            confidence: 0.87,
            validity: 0b1011,
        };

        assert_eq!(target, Reprojection::deserialize(target.serialize()));
    }

    #[test]
    fn emptiness() {
        assert!(Reprojection::default().is_none());

        let target = Reprojection {
            prev_x: 1.0,
            prev_y: 2.0,
            confidence: 0.5,
            validity: 0b1111,
        };

        assert!(target.is_some());
    }

    #[test]
    fn exactness() {
        let mut target = Reprojection {
            prev_x: 10.0,
            prev_y: 20.0,
            confidence: 1.0,
            validity: 0b1111,
        };

        assert!(target.is_exact());

        target.prev_x = 10.5;
        assert!(!target.is_exact());
    }
}
