use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use enumflags2::BitFlags;
use tfs::{EntryKind, Geometry, TinyFileSystem};

const LINE_START: &str = "TFS> ";

/// 一行命令
#[derive(Parser)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Mount another existing image of the same geometry
    Open { image: PathBuf },
    /// Create an empty file
    Create { path: String },
    /// Copy a host file into the image
    Import { host: PathBuf, path: String },
    /// Copy a file out of the image
    Export { path: String, host: PathBuf },
    /// List a directory
    Ls {
        /// Files only
        #[arg(short, conflicts_with = "dirs")]
        files: bool,
        /// Directories only
        #[arg(short)]
        dirs: bool,
        #[arg(default_value = "/")]
        path: String,
    },
    /// Create a directory
    Mkdir { path: String },
    /// Remove a file or an empty directory
    Rm { path: String },
    /// Show an entry
    Stat { path: String },
    /// Print every block as hex
    Display,
    /// Write the raw image to a host file
    Dump { host: PathBuf },
    /// Sync and leave
    Exit,
}

pub struct Shell {
    fs: TinyFileSystem,
    geometry: Geometry,
}

impl Shell {
    pub fn new(fs: TinyFileSystem, geometry: Geometry) -> Self {
        Self { fs, geometry }
    }

    /// 逐行读取命令直到 `exit` 或输入结束；单条命令失败不会结束循环
    pub fn run(mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();

        loop {
            print!("{LINE_START}");
            io::stdout().flush()?;

            let Some(line) = lines.next().transpose()? else {
                println!();
                break;
            };
            let args: Vec<&str> = line.split_whitespace().collect();
            if args.is_empty() {
                continue;
            }

            let command = match Line::try_parse_from(args) {
                Ok(line) => line.command,
                Err(e) => {
                    let _ = e.print();
                    continue;
                }
            };
            if let Command::Exit = command {
                break;
            }
            if let Err(e) = self.execute(command) {
                println!("{e}");
            }
        }

        self.fs.sync().map_err(into_io)
    }

    fn execute(&mut self, command: Command) -> io::Result<()> {
        match command {
            Command::Open { image } => {
                let device = tfs_fuse::open_existing(&image, self.geometry).map_err(into_io)?;
                self.fs.sync().map_err(into_io)?;
                self.fs = TinyFileSystem::mount(Arc::new(device), self.geometry).map_err(into_io)?;
                log::info!("opened {image:?}");
            }
            Command::Create { path } => {
                self.fs.create(&path).map_err(into_io)?;
            }
            Command::Import { host, path } => {
                let content = fs::read(&host)?;
                let entry = self.fs.import(&path, &content).map_err(into_io)?;
                println!("{} bytes -> block {}", entry.size(), entry.block());
            }
            Command::Export { path, host } => {
                let content = self.fs.export(&path).map_err(into_io)?;
                fs::write(&host, content)?;
            }
            Command::Ls { files, dirs, path } => {
                let kinds: BitFlags<EntryKind> = match (files, dirs) {
                    (true, _) => EntryKind::File.into(),
                    (_, true) => EntryKind::Directory.into(),
                    _ => BitFlags::all(),
                };
                for entry in self.fs.list_kinds(&path, kinds).map_err(into_io)? {
                    match entry.kind() {
                        EntryKind::File => println!("{}", entry.name()),
                        EntryKind::Directory => println!("{}/", entry.name()),
                    }
                }
            }
            Command::Mkdir { path } => {
                self.fs.make_directory(&path).map_err(into_io)?;
            }
            Command::Rm { path } => {
                self.fs.remove(&path).map_err(into_io)?;
            }
            Command::Stat { path } => {
                let stat = self.fs.stat(&path).map_err(into_io)?;
                let slot = stat.slot.map_or("-".to_owned(), |slot| slot.to_string());
                println!(
                    "kind={:?} slot={slot} block={} size={}",
                    stat.kind, stat.block, stat.size
                );
            }
            Command::Display => {
                print!("{}", self.fs.display().map_err(into_io)?);
                println!("{} blocks free", self.fs.free_blocks());
            }
            Command::Dump { host } => {
                fs::write(&host, self.fs.dump().map_err(into_io)?)?;
            }
            Command::Exit => {}
        }

        Ok(())
    }
}

pub fn into_io(e: tfs::Error) -> io::Error {
    io::Error::other(e.to_string())
}
