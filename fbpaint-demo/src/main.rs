/// fbpaint demo: draws a scene file, or a test pattern, onto /dev/fb<N>.
/// With --simulate it draws into memory instead and can dump the frame.

mod config;
mod scene;

use anyhow::{Context, Result};
use fbpaint::{with_framebuffer_in, Device, Framebuffer, MemoryDevice};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use crate::config::Config;
use crate::scene::Scene;

fn render<D: Device>(fb: &mut Framebuffer<D>, scene: Option<&Scene>) {
    let pattern;
    let scene = match scene {
        Some(scene) => scene,
        None => {
            pattern = scene::test_pattern(fb.width(), fb.height());
            &pattern
        }
    };
    scene.draw(fb);
    fb.flush();
}

fn main() -> Result<()> {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e:#}");
            std::process::exit(2);
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let scene = config.scene.as_deref().map(Scene::load).transpose()?;
    if let Some(scene) = &scene {
        info!(shapes = scene.shapes.len(), "loaded scene");
    }

    match config.simulate {
        Some(resolution) => {
            let mut fb = Framebuffer::from_device(MemoryDevice::new(resolution))
                .context("simulated framebuffer")?;
            render(&mut fb, scene.as_ref());
            info!(
                width = resolution.width,
                height = resolution.height,
                bpp = resolution.bits_per_pixel,
                "rendered simulated frame"
            );

            if let (Some(path), Some(dev)) = (&config.dump, fb.device()) {
                std::fs::write(path, dev.memory())
                    .with_context(|| format!("write {}", path.display()))?;
                info!(path = %path.display(), bytes = dev.memory().len(), "dumped frame");
            }
        }
        None => {
            with_framebuffer_in(&config.device_dir, config.device, |fb| {
                render(fb, scene.as_ref());
                info!(width = fb.width(), height = fb.height(), "frame flushed");
            })
            .with_context(|| {
                format!(
                    "framebuffer {} under {}",
                    config.device,
                    config.device_dir.display()
                )
            })?;
        }
    }

    Ok(())
}
