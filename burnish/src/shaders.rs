use log::debug;

/// Compiled SPIR-V modules, paired with their entry-point names.
///
/// The build script runs `burnish-shader-builder`, which compiles the
/// `burnish-shaders` crate into one module per entry point and publishes each
/// module's path and entry-point name through `burnish_shaders::*` environment
/// variables picked up here at compile time.
macro_rules! shaders {
    ([ $( $name:ident, )* ]) => {
        #[derive(Debug)]
        pub struct Shaders {
            $( pub $name: (wgpu::ShaderModule, &'static str), )*
        }

        impl Shaders {
            pub fn new(device: &wgpu::Device) -> Self {
                $(
                    let $name = {
                        debug!("Loading shader: {}", stringify!($name));

                        let module = wgpu::include_spirv!(env!(concat!(
                            "burnish_shaders::",
                            stringify!($name),
                            ".path"
                        )));

                        let module = device.create_shader_module(module);

                        let entry_point = env!(concat!(
                            "burnish_shaders::",
                            stringify!($name),
                            ".entry_point"
                        ));

                        (module, entry_point)
                    };
                )*

                Self {
                    $( $name, )*
                }
            }
        }
    };
}

shaders!([
    block_fit_fit8,
    block_fit_fit16,
    block_fit_fit32,
    fit_accumulation,
    frame_composition,
    frame_reprojection,
    frame_stabilization,
    scale_blend,
    temporal_accumulation,
]);
