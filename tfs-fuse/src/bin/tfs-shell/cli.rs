use std::path::PathBuf;

use clap::Parser;
use tfs::{DEFAULT_BLOCK_COUNT, DEFAULT_BLOCK_SIZE};

/// Interactive shell over a tfs disk image
#[derive(Parser)]
pub struct Cli {
    /// Disk image, created if missing
    #[arg(default_value = "temp")]
    pub image: PathBuf,

    /// Number of blocks
    #[arg(long, short, default_value_t = DEFAULT_BLOCK_COUNT)]
    pub blocks: usize,

    /// Bytes per block
    #[arg(long, short = 's', default_value_t = DEFAULT_BLOCK_SIZE)]
    pub block_size: usize,
}
