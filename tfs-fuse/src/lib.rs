//! 宿主机一侧的 tfs：以普通文件作为磁盘镜像

#[cfg(test)]
mod tests;

mod block_file;

use std::fs::OpenOptions;
use std::path::Path;

use tfs::{Error, Geometry};

pub use self::block_file::BlockFile;

/// 打开镜像文件，不存在则创建，并把长度调整为恰好一个镜像的大小
pub fn open_or_create(path: impl AsRef<Path>, geometry: Geometry) -> Result<BlockFile, Error> {
    let path = path.as_ref();
    let fd = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(|e| {
            log::error!("cannot open {}: {e}", path.display());
            Error::AllocationFailure
        })?;
    fd.set_len(geometry.image_size() as u64).map_err(|e| {
        log::error!("cannot resize {}: {e}", path.display());
        Error::AllocationFailure
    })?;

    Ok(BlockFile::new(fd, geometry.block_size()))
}

/// 打开已有的镜像文件，其长度必须恰好等于镜像大小
pub fn open_existing(path: impl AsRef<Path>, geometry: Geometry) -> Result<BlockFile, Error> {
    let path = path.as_ref();
    let fd = OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map_err(|e| {
            log::warn!("cannot open {}: {e}", path.display());
            Error::NotFound
        })?;
    let len = fd.metadata().map_err(|_| Error::Io)?.len();
    if len != geometry.image_size() as u64 {
        log::warn!(
            "{} is {len} bytes, expected {}",
            path.display(),
            geometry.image_size()
        );
        return Err(Error::InvalidGeometry);
    }

    Ok(BlockFile::new(fd, geometry.block_size()))
}
