use anyhow::Result;
use tokio::runtime::Builder as TokioRuntimeBuilder;
use tracing_subscriber::EnvFilter;

use vrack::{SiteApp, SiteConfig};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vrack=info")),
        )
        .init();

    let config = SiteConfig::from_env()?;
    let app = SiteApp::open(config)?;

    let runtime = TokioRuntimeBuilder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(app.run())
}
