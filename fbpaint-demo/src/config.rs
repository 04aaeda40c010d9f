//! Runtime configuration: environment first, command line flags on top.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use fbpaint::{Resolution, DEFAULT_DEVICE_DIR};
use tracing::Level;

pub const USAGE: &str = "\
usage: fbpaint-demo [--device N] [--simulate WxHxBPP] [--dump PATH] [SCENE.json]

environment:
  FBPAINT_DEVICE_DIR  directory holding the fb device nodes (default /dev)
  FBPAINT_LOG         log level: error, warn, info, debug, trace (default info)";

#[derive(Debug, Clone)]
pub struct Config {
    pub device_dir: PathBuf,
    pub device: i64,
    pub simulate: Option<Resolution>,
    pub dump: Option<PathBuf>,
    pub scene: Option<PathBuf>,
    pub log_level: Level,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device_dir: PathBuf::from(DEFAULT_DEVICE_DIR),
            device: 0,
            simulate: None,
            dump: None,
            scene: None,
            log_level: Level::INFO,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        config.apply_args(std::env::args().skip(1))?;
        Ok(config)
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(dir) = var("FBPAINT_DEVICE_DIR") {
            self.device_dir = PathBuf::from(dir);
        }
        if let Some(level) = var("FBPAINT_LOG") {
            self.log_level = level
                .parse()
                .map_err(|_| anyhow::anyhow!("FBPAINT_LOG: unknown level {level:?}"))?;
        }
        Ok(())
    }

    fn apply_args(&mut self, args: impl IntoIterator<Item = String>) -> Result<()> {
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--device" | "-d" => {
                    let n = args.next().context("--device needs a number")?;
                    self.device = n.parse().with_context(|| format!("bad device number {n:?}"))?;
                }
                "--simulate" => {
                    let spec = args.next().context("--simulate needs WxHxBPP")?;
                    self.simulate = Some(parse_geometry(&spec)?);
                }
                "--dump" => {
                    self.dump = Some(args.next().context("--dump needs a path")?.into());
                }
                "--help" | "-h" => bail!("{USAGE}"),
                flag if flag.starts_with('-') => bail!("unknown option {flag}\n{USAGE}"),
                path => {
                    if self.scene.replace(PathBuf::from(path)).is_some() {
                        bail!("only one scene file can be given");
                    }
                }
            }
        }
        if self.dump.is_some() && self.simulate.is_none() {
            bail!("--dump only works together with --simulate");
        }
        Ok(())
    }
}

/// Parses `800x600x32` (or `800x600`, meaning 32 bpp).
pub fn parse_geometry(spec: &str) -> Result<Resolution> {
    let parts: Vec<u32> = spec
        .split('x')
        .map(|p| p.trim().parse::<u32>())
        .collect::<std::result::Result<_, _>>()
        .with_context(|| format!("bad geometry {spec:?}"))?;
    let res = match parts[..] {
        [w, h] => Resolution::new(w, h, 32),
        [w, h, bpp] => Resolution::new(w, h, bpp),
        _ => bail!("bad geometry {spec:?}, expected WxH or WxHxBPP"),
    };
    res.validate().with_context(|| format!("geometry {spec:?}"))?;
    Ok(res)
}
