//! Command-line front end for baking and inspecting vertex buffers
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use nalgebra::Point3;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tanbake_core::assets::{read_mesh_file, MeshLibrary};
use tanbake_core::layout;
use tanbake_core::{
    cube, primitives, screen_triangle, BackendPreference, BakeConfig, Baker, BoundingBox,
    DegeneratePolicy,
};

pub mod report;

pub use report::MeshReport;

#[derive(Parser, Debug)]
#[command(name = "tanbake", author, version, about, long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the configured backend
    #[arg(long, global = true, value_enum)]
    pub backend: Option<BackendArg>,

    /// Worker threads for the accelerated backend
    #[arg(long, global = true)]
    pub threads: Option<usize>,

    /// Override the handling of zero UV determinants
    #[arg(long, global = true, value_enum)]
    pub degenerate: Option<PolicyArg>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Bake a pre-bake mesh file into a post-bake buffer
    Bake {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Bake a named mesh from the asset directory (e.g. sphere, arrow)
    Mesh {
        name: String,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Write the cube primitive
    Cube {
        #[arg(short, long)]
        output: PathBuf,
        /// Minimum corner as x,y,z
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true, default_value = "-1,-1,-1")]
        min: Point3<f32>,
        /// Maximum corner as x,y,z
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true, default_value = "1,1,1")]
        max: Point3<f32>,
        /// Write the pre-bake buffer instead of baking it
        #[arg(long)]
        raw: bool,
    },
    /// Write the position-only full-screen triangle
    ScreenTriangle {
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Summarise a buffer file
    Inspect {
        file: PathBuf,
        /// Treat the file as a post-bake buffer
        #[arg(long)]
        baked: bool,
    },
    /// Print the effective configuration
    Config,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendArg {
    Accelerated,
    Portable,
}

impl From<BackendArg> for BackendPreference {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Accelerated => BackendPreference::Accelerated,
            BackendArg::Portable => BackendPreference::Portable,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolicyArg {
    Propagate,
    Zero,
    Reject,
}

impl From<PolicyArg> for DegeneratePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Propagate => DegeneratePolicy::Propagate,
            PolicyArg::Zero => DegeneratePolicy::Zero,
            PolicyArg::Reject => DegeneratePolicy::Reject,
        }
    }
}

fn parse_point(s: &str) -> std::result::Result<Point3<f32>, String> {
    let coords = s
        .split(',')
        .map(|c| c.trim().parse::<f32>().map_err(|e| format!("'{}': {}", c, e)))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    match coords.as_slice() {
        [x, y, z] => Ok(Point3::new(*x, *y, *z)),
        _ => Err(format!("expected x,y,z, got '{}'", s)),
    }
}

impl Cli {
    /// Config file values with command-line overrides applied
    pub fn resolve_config(&self) -> Result<BakeConfig> {
        let mut config = match &self.config {
            Some(path) => BakeConfig::load(path)?,
            None => BakeConfig::default(),
        };

        if let Some(backend) = self.backend {
            config.backend = backend.into();
        }
        if self.threads.is_some() {
            config.threads = self.threads;
        }
        if let Some(policy) = self.degenerate {
            config.degenerate = policy.into();
        }
        Ok(config)
    }
}

/// Holds the baker chosen at startup and runs commands against it
pub struct App {
    config: BakeConfig,
    baker: Baker,
}

impl App {
    pub fn new(config: BakeConfig) -> Self {
        let baker = Baker::select(&config);
        Self { config, baker }
    }

    pub fn with_baker(config: BakeConfig, baker: Baker) -> Self {
        Self { config, baker }
    }

    pub fn baker(&self) -> &Baker {
        &self.baker
    }

    pub fn run<W: Write>(&self, command: &Command, out: &mut W) -> Result<()> {
        match command {
            Command::Bake { input, output } => {
                let raw = read_mesh_file(input)?;
                let baked = self
                    .baker
                    .bake(&raw)
                    .with_context(|| format!("Failed to bake {}", input.display()))?;
                self.write_baked(output, &baked, out)
            }
            Command::Mesh { name, output } => {
                let library = MeshLibrary::from_config(&self.config);
                let baked = library.load_baked(&self.baker, name)?;
                self.write_baked(output, &baked, out)
            }
            Command::Cube {
                output,
                min,
                max,
                raw,
            } => {
                let bounds = BoundingBox::new(*min, *max);
                if *raw {
                    let vertices = cube(&bounds);
                    write_file(output, &layout::encode(&vertices))?;
                    MeshReport::pre_bake(&output.display().to_string(), &vertices).draw(out)?;
                    Ok(())
                } else {
                    let baked = primitives::baked_cube(&self.baker, &bounds)?;
                    self.write_baked(output, &baked, out)
                }
            }
            Command::ScreenTriangle { output } => {
                let vertices = screen_triangle();
                write_file(output, &layout::encode(&vertices))?;
                MeshReport::screen(&output.display().to_string(), &vertices).draw(out)?;
                Ok(())
            }
            Command::Inspect { file, baked } => {
                let data = read_mesh_file(file)?;
                let label = file.display().to_string();
                let report = if *baked {
                    MeshReport::baked(&label, &layout::decode_baked(&data)?)
                } else {
                    MeshReport::pre_bake(&label, &layout::decode_vertices(&data)?)
                };
                report.draw(out)?;
                Ok(())
            }
            Command::Config => {
                writeln!(out, "{}", self.config.to_toml_string()?)?;
                Ok(())
            }
        }
    }

    fn write_baked<W: Write>(&self, path: &Path, baked: &[u8], out: &mut W) -> Result<()> {
        write_file(path, baked)?;
        let records = layout::decode_baked(baked)?;
        let label = format!("{} ({} backend)", path.display(), self.baker.backend_name());
        MeshReport::baked(&label, &records).draw(out)?;
        Ok(())
    }
}

fn write_file(path: &Path, data: &[u8]) -> Result<()> {
    fs::write(path, data).with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("wrote {} bytes to {}", data.len(), path.display());
    Ok(())
}
