//! Evbridge - window event bridge producer
//!
//! This is the entry point that maps the file-backed shared region the
//! consumer allocated, creates the bridged window over it and pumps it
//! until the window closes.

use log::error;

#[cfg(target_os = "windows")]
mod windows_main {
    use evbridge::backend::win32::Win32Platform;
    use evbridge::backend::WindowContext;
    use evbridge::config::BridgeConfig;
    use evbridge::protocol::{RegionMemory, SharedRegion};
    use log::{info, warn};

    pub fn run() -> anyhow::Result<()> {
        let config = BridgeConfig::from_env()?;
        info!("Starting evbridge, region {}", config.region_path.display());

        let memory = RegionMemory::open_file(&config.region_path)?;
        if memory.len() != config.region_size {
            warn!(
                "Region is {} bytes, configured size is {}",
                memory.len(),
                config.region_size
            );
        }
        let region = SharedRegion::new(memory);

        let mut ctx = WindowContext::create(Win32Platform::new(), region, &config.window_spec())?
            .with_controller_grace(config.controller_grace);
        ctx.show();

        'frames: loop {
            ctx.poll_controllers();
            loop {
                let code = ctx.poll();
                if ctx.region().write_state().is_quit() {
                    break 'frames;
                }
                if code == 0 {
                    break;
                }
            }
            std::thread::sleep(config.poll_interval);
        }

        if let Err(e) = ctx.destroy() {
            warn!("{}", e);
        }
        info!("Window closed, exiting");
        Ok(())
    }
}

#[cfg(not(target_os = "windows"))]
mod stub_main {
    use super::*;

    pub fn run() -> anyhow::Result<()> {
        error!("Evbridge only runs on Windows");
        anyhow::bail!("Evbridge requires Windows to run")
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    #[cfg(target_os = "windows")]
    {
        windows_main::run().inspect_err(|e| error!("{}", e))
    }

    #[cfg(not(target_os = "windows"))]
    {
        stub_main::run()
    }
}
