use alloc::vec;
use alloc::vec::Vec;
use core::ops::Range;

use spin::Mutex;
use vfs::Error;

use crate::BlockDevice;

/// 以内存缓冲区为后备的块设备
#[derive(Debug)]
pub struct RamDisk {
    block_size: usize,
    data: Mutex<Vec<u8>>,
}

impl RamDisk {
    /// 全零的新设备
    pub fn new(block_count: usize, block_size: usize) -> Self {
        Self {
            block_size,
            data: Mutex::new(vec![0; block_count * block_size]),
        }
    }

    /// 从现成的镜像构造设备，末尾不足一块的字节不可寻址。
    pub fn from_image(image: Vec<u8>, block_size: usize) -> Self {
        Self {
            block_size,
            data: Mutex::new(image),
        }
    }

    /// 当前镜像的拷贝
    pub fn image(&self) -> Vec<u8> {
        self.data.lock().clone()
    }

    pub fn block_count(&self) -> usize {
        self.data.lock().len() / self.block_size
    }

    /// 块在镜像内的字节区间
    fn range(&self, block_id: usize, buf_len: usize, image_len: usize) -> Result<Range<usize>, Error> {
        if buf_len != self.block_size {
            log::error!("buffer of {buf_len} bytes for a {}-byte block", self.block_size);
            return Err(Error::Io);
        }

        let start = block_id * self.block_size;
        let end = start + self.block_size;
        if end > image_len {
            return Err(Error::OutOfRange);
        }

        Ok(start..end)
    }
}

impl BlockDevice for RamDisk {
    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> Result<(), Error> {
        let data = self.data.lock();
        let range = self.range(block_id, buf.len(), data.len())?;
        buf.copy_from_slice(&data[range]);
        Ok(())
    }

    fn write_block(&self, block_id: usize, buf: &[u8]) -> Result<(), Error> {
        let mut data = self.data.lock();
        let range = self.range(block_id, buf.len(), data.len())?;
        data[range].copy_from_slice(buf);
        Ok(())
    }
}
