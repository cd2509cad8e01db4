mod cli;
mod shell;

use std::io;
use std::sync::Arc;

use clap::Parser;
use tfs::{Geometry, TinyFileSystem};
use typed_bytesize::ByteSizeIec;

use self::cli::Cli;
use self::shell::{into_io, Shell};

fn main() -> io::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let geometry = Geometry::new(cli.blocks, cli.block_size).map_err(into_io)?;
    let device = Arc::new(tfs_fuse::open_or_create(&cli.image, geometry).map_err(into_io)?);
    let fs = TinyFileSystem::mount(device, geometry).map_err(into_io)?;
    println!(
        "image={:?} size={}",
        cli.image,
        ByteSizeIec(geometry.image_size() as u64)
    );

    Shell::new(fs, geometry).run()
}
