use vfs::Error;

use crate::{DEFAULT_BLOCK_COUNT, DEFAULT_BLOCK_SIZE, HEADER_SIZE};

/// 磁盘的几何参数：块数与块大小
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    block_count: usize,
    block_size: usize,
}

impl Geometry {
    /// 块指针只有一字节
    pub const MAX_BLOCKS: usize = u8::MAX as usize + 1;
    /// 文件大小只有一字节
    pub const MAX_BLOCK_SIZE: usize = u8::MAX as usize;

    pub fn new(block_count: usize, block_size: usize) -> Result<Self, Error> {
        if !(2..=Self::MAX_BLOCKS).contains(&block_count)
            || !(HEADER_SIZE..=Self::MAX_BLOCK_SIZE).contains(&block_size)
        {
            return Err(Error::InvalidGeometry);
        }

        Ok(Self {
            block_count,
            block_size,
        })
    }

    #[inline]
    pub fn block_count(&self) -> usize {
        self.block_count
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// 镜像文件的字节数
    #[inline]
    pub fn image_size(&self) -> usize {
        self.block_count * self.block_size
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            block_count: DEFAULT_BLOCK_COUNT,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds() {
        assert_eq!(512, Geometry::default().image_size());
        assert!(Geometry::new(256, HEADER_SIZE).is_ok());
        assert!(Geometry::new(2, 255).is_ok());
        assert_eq!(Err(Error::InvalidGeometry), Geometry::new(1, 32));
        assert_eq!(Err(Error::InvalidGeometry), Geometry::new(257, 32));
        assert_eq!(Err(Error::InvalidGeometry), Geometry::new(16, 16));
        assert_eq!(Err(Error::InvalidGeometry), Geometry::new(16, 256));
    }
}
