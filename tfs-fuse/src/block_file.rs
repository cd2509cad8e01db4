use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::sync::Mutex;

use block_dev::BlockDevice;
use tfs::Error;

/// 以文件为后备存储的块设备，第 i 块位于偏移 `i * block_size` 处
#[derive(Debug)]
pub struct BlockFile {
    block_size: usize,
    file: Mutex<File>,
}

impl BlockFile {
    pub fn new(fd: File, block_size: usize) -> Self {
        Self {
            block_size,
            file: Mutex::new(fd),
        }
    }

    fn seek(&self, file: &mut File, block_id: usize) -> Result<(), Error> {
        file.seek(SeekFrom::Start((block_id * self.block_size) as u64))
            .map_err(|e| {
                log::error!("seeking block {block_id}: {e}");
                Error::Io
            })?;
        Ok(())
    }
}

impl BlockDevice for BlockFile {
    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> Result<(), Error> {
        if buf.len() != self.block_size {
            return Err(Error::Io);
        }
        let mut file = self.file.lock().map_err(|_| Error::Io)?;
        self.seek(&mut file, block_id)?;
        // 读不满一块说明越过了镜像末尾
        file.read_exact(buf).map_err(|e| {
            log::error!("reading block {block_id}: {e}");
            Error::OutOfRange
        })
    }

    fn write_block(&self, block_id: usize, buf: &[u8]) -> Result<(), Error> {
        if buf.len() != self.block_size {
            return Err(Error::Io);
        }
        let mut file = self.file.lock().map_err(|_| Error::Io)?;
        self.seek(&mut file, block_id)?;
        file.write_all(buf).map_err(|e| {
            log::error!("writing block {block_id}: {e}");
            Error::Io
        })
    }
}
