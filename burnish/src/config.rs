/// Session-wide configuration; picked once, before the first frame.
///
/// Everything here gets baked into the pipelines and the buffer layout when
/// the engine is created, so per-frame code never dispatches on it.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    pub mode: DenoiserMode,
    pub layout: RadianceLayout,
    pub scale: FitScale,
}

impl Config {
    /// Checks that the denoiser's mode can actually digest the radiance
    /// layout the renderer promises to provide.
    ///
    /// This is the only fatal error in here; everything that can go wrong
    /// per-pixel later (disocclusions, rank-deficient blocks) is handled
    /// in-place by the passes.
    pub(crate) fn validate(&self) -> Result<(), Error> {
        let ok = match self.mode {
            DenoiserMode::None => true,

            DenoiserMode::Joint => matches!(
                self.layout,
                RadianceLayout::Raw | RadianceLayout::Demodulated,
            ),

            DenoiserMode::Layered => {
                matches!(self.layout, RadianceLayout::SplitDemodulated)
            }
        };

        if ok {
            Ok(())
        } else {
            Err(Error::LayoutMismatch {
                mode: self.mode,
                layout: self.layout,
            })
        }
    }

    /// Number of radiance planes the renderer provides.
    pub fn planes(&self) -> usize {
        self.layout.planes()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: DenoiserMode::Joint,
            layout: RadianceLayout::Raw,
            scale: FitScale::Blend,
        }
    }
}

/// Selects the denoising algorithm.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DenoiserMode {
    /// Passes the raw samples through; handy for A/B-ing the filter.
    None,

    /// Fits one model over the combined radiance.
    #[default]
    Joint,

    /// Fits direct and indirect radiance separately; needs the renderer to
    /// provide them as separate demodulated planes.
    Layered,
}

/// Describes the radiance planes the renderer fills in each frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RadianceLayout {
    /// One plane, radiance as rendered; the accumulation pass divides the
    /// albedo out itself.
    #[default]
    Raw,

    /// One plane, already divided by albedo.
    Demodulated,

    /// Two planes - direct and indirect radiance - both already divided by
    /// albedo.
    SplitDemodulated,
}

impl RadianceLayout {
    pub fn planes(&self) -> usize {
        match self {
            Self::Raw | Self::Demodulated => 1,
            Self::SplitDemodulated => 2,
        }
    }

    /// Whether the pipeline has to divide the albedo out itself before
    /// filtering; see [`burnish_gpu::demodulate()`].
    pub(crate) fn needs_demodulation(&self) -> bool {
        matches!(self, Self::Raw)
    }
}

/// Edge length of the blocks the regression filter runs over.
///
/// Smaller blocks hug geometry better but keep more noise; larger blocks
/// average more samples at the cost of detail. `Blend` runs all three and
/// merges them per pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FitScale {
    Block8,
    Block16,
    Block32,
    #[default]
    Blend,
}

impl FitScale {
    /// Block edge lengths this configuration fits, in ascending order.
    pub fn edges(&self) -> &'static [u32] {
        match self {
            Self::Block8 => &[8],
            Self::Block16 => &[16],
            Self::Block32 => &[32],
            Self::Blend => &[8, 16, 32],
        }
    }

    pub fn is_blend(&self) -> bool {
        matches!(self, Self::Blend)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(
        "denoiser mode `{mode:?}` cannot operate on the `{layout:?}` \
         radiance layout"
    )]
    LayoutMismatch {
        mode: DenoiserMode,
        layout: RadianceLayout,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(mode: DenoiserMode, layout: RadianceLayout) -> Config {
        Config {
            mode,
            layout,
            scale: Default::default(),
        }
    }

    #[test]
    fn validate() {
        use DenoiserMode as M;
        use RadianceLayout as L;

        let cases = [
            (M::None, L::Raw, true),
            (M::None, L::Demodulated, true),
            (M::None, L::SplitDemodulated, true),
            (M::Joint, L::Raw, true),
            (M::Joint, L::Demodulated, true),
            (M::Joint, L::SplitDemodulated, false),
            (M::Layered, L::Raw, false),
            (M::Layered, L::Demodulated, false),
            (M::Layered, L::SplitDemodulated, true),
        ];

        for (mode, layout, expected) in cases {
            assert_eq!(
                expected,
                config(mode, layout).validate().is_ok(),
                "mode={mode:?}, layout={layout:?}",
            );
        }
    }

    #[test]
    fn edges() {
        assert_eq!(&[8], FitScale::Block8.edges());
        assert_eq!(&[8, 16, 32], FitScale::Blend.edges());
        assert!(FitScale::Blend.is_blend());
        assert!(!FitScale::Block16.is_blend());
    }
}
