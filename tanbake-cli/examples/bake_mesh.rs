//! Example: bake a pre-bake mesh file, or the cube when none is given
//!
//! Usage: cargo run --example bake_mesh -- path/to/mesh.mdl
use std::env;
use std::io;
use tanbake_cli::MeshReport;
use tanbake_core::assets::read_mesh_file;
use tanbake_core::layout::decode_baked;
use tanbake_core::{primitives, BakeConfig, Baker, BoundingBox};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    let baker = Baker::select(&BakeConfig::default());

    let (label, baked) = match args.get(1) {
        Some(path) => {
            println!("Loading mesh file: {}", path);
            (path.clone(), baker.bake(&read_mesh_file(path)?)?)
        }
        None => {
            eprintln!("Usage: {} <mesh-file>", args[0]);
            eprintln!("\nNo mesh file provided, using default cube...");
            let cube = primitives::baked_cube(&baker, &BoundingBox::default())?;
            ("cube".to_string(), cube)
        }
    };

    MeshReport::baked(&label, &decode_baked(&baked)?).draw(&mut io::stdout())?;
    Ok(())
}
