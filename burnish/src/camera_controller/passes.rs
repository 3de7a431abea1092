use log::debug;

use crate::{Camera, CameraBuffers, Engine};

macro_rules! passes {
    ([ $( $name:ident => $class:ident, )* ]) => {
        $( mod $name; )*
        $( pub use self::$name::*; )*

        #[derive(Debug)]
        pub struct CameraPasses {
            $( pub $name: $class, )*
        }

        impl CameraPasses {
            pub fn new(
                engine: &Engine,
                device: &wgpu::Device,
                camera: &Camera,
                buffers: &CameraBuffers,
            ) -> Self {
                debug!("Initializing camera passes");

                Self {
                    $( $name: $class::new(engine, device, camera, buffers), )*
                }
            }
        }
    };
}

passes!([
    block_fit => BlockFitPass,
    fit_accumulation => FitAccumulationPass,
    frame_composition => FrameCompositionPass,
    frame_reprojection => FrameReprojectionPass,
    frame_stabilization => FrameStabilizationPass,
    scale_blend => ScaleBlendPass,
    temporal_accumulation => TemporalAccumulationPass,
]);
