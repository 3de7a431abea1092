use bytemuck::{Pod, Zeroable};

#[repr(C)]
#[derive(Copy, Clone, Default, Pod, Zeroable)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct TemporalAccumulationPassParams {
    /// 1 when the incoming radiance plane should be divided by albedo before
    /// accumulating, 0 otherwise.
    pub demodulate: u32,
}

#[repr(C)]
#[derive(Copy, Clone, Default, Pod, Zeroable)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct BlockFitPassParams {
    pub seed: u32,
    pub layer: u32,
}

impl BlockFitPassParams {
    /// Noise seed for the dither, decorrelated between the radiance planes.
    pub fn dither_seed(&self) -> u32 {
        self.seed ^ self.layer.wrapping_mul(0x9e3779b9)
    }
}

#[repr(C)]
#[derive(Copy, Clone, Default, Pod, Zeroable)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct FrameCompositionPassParams {
    pub camera_mode: u32,

    /// Number of radiance planes to merge; 1 or 2.
    pub planes: u32,

    /// 1 when the planes were filtered in demodulated space and the merged
    /// color has to be multiplied by albedo again.
    pub demodulate: u32,
}
