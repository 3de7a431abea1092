use glam::{vec3, Vec3};

pub trait Vec3Ext
where
    Self: Sized,
{
    /// Clips this color-vector into given bounding box.
    ///
    /// See:
    /// - https://s3.amazonaws.com/arena-attachments/655504/c5c71c5507f0f8bf344252958254fb7d.pdf?1468341463
    fn clip(self, aabb_min: Self, aabb_max: Self) -> Self;

    /// Returns luminance of this color-vector.
    fn luma(self) -> f32;
}

impl Vec3Ext for Vec3 {
    fn clip(self, aabb_min: Self, aabb_max: Self) -> Self {
        let p_clip = 0.5 * (aabb_max + aabb_min);
        let e_clip = 0.5 * (aabb_max - aabb_min);
        let v_clip = self - p_clip;
        let v_unit = v_clip / e_clip;
        let a_unit = v_unit.abs();
        let ma_unit = a_unit.max_element();

        if ma_unit > 1.0 {
            p_clip + v_clip / ma_unit
        } else {
            self
        }
    }

    fn luma(self) -> f32 {
        self.dot(vec3(0.2126, 0.7152, 0.0722))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip() {
        let aabb_min = vec3(0.0, 0.0, 0.0);
        let aabb_max = vec3(1.0, 1.0, 1.0);

        let inside = vec3(0.5, 0.25, 0.75);
        assert_eq!(inside, inside.clip(aabb_min, aabb_max));

        let outside = vec3(2.0, 0.5, 0.5);
        let clipped = outside.clip(aabb_min, aabb_max);

        assert!(clipped.x <= 1.0);
        assert!(clipped.y >= 0.0 && clipped.y <= 1.0);
        assert!(clipped.z >= 0.0 && clipped.z <= 1.0);
    }

    #[test]
    fn luma() {
        assert_eq!(0.0, Vec3::ZERO.luma());
        assert!((Vec3::ONE.luma() - 1.0).abs() < 1e-4);
        assert!(vec3(0.0, 1.0, 0.0).luma() > vec3(0.0, 0.0, 1.0).luma());
    }
}
