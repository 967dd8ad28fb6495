pub mod renderer;
pub mod scene;
pub mod settings;

pub use renderer::{Accumulator, RenderContext, RenderFlags, RenderMode, ShaderGlobals};
pub use settings::AccumulatorSettings;

/// Installs the env_logger backend; `RUST_LOG` overrides the default level.
pub fn init_logging() {
    let _ = env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .try_init();
}
