use std::path::PathBuf;

use anyhow::Context;
use spectra::ViewerConfig;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .default_filter_or("spectra=info,wgpu_core=warn,wgpu_hal=warn,naga=warn"),
    )
    .init();

    let mut config = ViewerConfig::default();
    if let Some(path) = std::env::args_os().nth(1) {
        config = config.with_model(PathBuf::from(path));
    }

    spectra::run(config).context("viewer exited with an error")
}
