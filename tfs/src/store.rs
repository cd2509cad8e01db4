//! # 块存储层
//!
//! 磁盘镜像被划分为大小相同的块，[`BlockStore`] 按块号读写它们。
//! 其它层只能通过这里的接口访问块：
//! 读取得到的是块的拷贝，修改一律经过 [`BlockStore::write`]，
//! 因此不会有任何指向存储的引用跨越一次修改而存活。
//!
//! 写入先落在内存中的块缓存里，[`BlockStore::sync`] 时才写回块设备。
//! 缓存归存储自己所有，不存在全局状态。

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use core::mem;

use block_dev::BlockDevice;
use vfs::Error;

use crate::Geometry;

/// 内存中的块缓存
struct BlockCache {
    /// 缓存的数据
    data: Box<[u8]>,
    /// 对应的块ID
    block_id: usize,
    /// 是否为脏块
    modified: bool,
}

impl BlockCache {
    fn sync(&mut self, device: &dyn BlockDevice) -> Result<(), Error> {
        if self.modified {
            device.write_block(self.block_id, &self.data)?;
            self.modified = false;
        }
        Ok(())
    }
}

pub struct BlockStore {
    device: Arc<dyn BlockDevice>,
    geometry: Geometry,
    /// 按写入先后排列的块缓存
    queue: Vec<BlockCache>,
}

impl BlockStore {
    /// 块缓存个数的上限
    const CAPACITY: usize = 16;

    pub fn new(device: Arc<dyn BlockDevice>, geometry: Geometry) -> Self {
        Self {
            device,
            geometry,
            queue: Vec::with_capacity(Self::CAPACITY),
        }
    }

    #[inline]
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// 读出整块，优先使用缓存
    pub fn read(&self, block_id: usize) -> Result<Vec<u8>, Error> {
        self.check(block_id)?;

        if let Some(cache) = self.cached(block_id) {
            return Ok(cache.data.to_vec());
        }

        let mut data = vec![0; self.geometry.block_size()];
        self.device.read_block(block_id, &mut data)?;
        Ok(data)
    }

    /// 覆写整块，这是修改块内容的唯一途径。
    /// `buf` 的长度必须恰好为块大小。
    pub fn write(&mut self, block_id: usize, buf: &[u8]) -> Result<(), Error> {
        self.check(block_id)?;
        if buf.len() != self.geometry.block_size() {
            return Err(Error::OutOfRange);
        }

        let cache = self.cache_slot(block_id)?;
        cache.data.copy_from_slice(buf);
        cache.modified = true;
        Ok(())
    }

    /// 把所有脏块写回块设备
    pub fn sync(&mut self) -> Result<(), Error> {
        let device = self.device.as_ref();
        self.queue.iter_mut().try_for_each(|cache| cache.sync(device))
    }

    /// 整个磁盘的线性字节镜像
    pub fn dump(&self) -> Result<Vec<u8>, Error> {
        let mut image = Vec::with_capacity(self.geometry.image_size());
        for block_id in 0..self.geometry.block_count() {
            image.extend_from_slice(&self.read(block_id)?);
        }
        Ok(image)
    }

    /// 十六进制网格形式的磁盘内容，每行一块
    pub fn display(&self) -> Result<String, Error> {
        let image = self.dump()?;
        Ok(HexGrid {
            geometry: self.geometry,
            image: &image,
        }
        .to_string())
    }

    /// 以 `T` 的视角读取块内 `offset` 处的数据
    pub(crate) fn map<T, V>(
        &self,
        block_id: usize,
        offset: usize,
        f: impl FnOnce(&T) -> V,
    ) -> Result<V, Error> {
        let block = self.read(block_id)?;
        Ok(f(view(&block, offset)))
    }

    /// 读出块、以 `T` 的视角修改，再整块写回
    pub(crate) fn map_mut<T, V>(
        &mut self,
        block_id: usize,
        offset: usize,
        f: impl FnOnce(&mut T) -> V,
    ) -> Result<V, Error> {
        let mut block = self.read(block_id)?;
        let value = f(view_mut(&mut block, offset));
        self.write(block_id, &block)?;
        Ok(value)
    }
}

impl BlockStore {
    fn check(&self, block_id: usize) -> Result<(), Error> {
        if block_id < self.geometry.block_count() {
            Ok(())
        } else {
            Err(Error::OutOfRange)
        }
    }

    fn cached(&self, block_id: usize) -> Option<&BlockCache> {
        self.queue.iter().find(|cache| cache.block_id == block_id)
    }

    // 块缓存调度策略：踢走最早写入的块
    fn cache_slot(&mut self, block_id: usize) -> Result<&mut BlockCache, Error> {
        if let Some(index) = self
            .queue
            .iter()
            .position(|cache| cache.block_id == block_id)
        {
            return Ok(&mut self.queue[index]);
        }

        // 触及上限，写回一个块
        if self.queue.len() == Self::CAPACITY {
            self.queue[0].sync(self.device.as_ref())?;
            self.queue.remove(0);
        }

        self.queue.push(BlockCache {
            data: vec![0; self.geometry.block_size()].into_boxed_slice(),
            block_id,
            modified: false,
        });
        let last = self.queue.len() - 1;
        Ok(&mut self.queue[last])
    }
}

impl Drop for BlockStore {
    fn drop(&mut self) {
        if let Err(e) = self.sync() {
            log::error!("failed to write back block cache: {e}");
        }
    }
}

/// 块内的数据结构只由字节数组组成，对齐为1
fn view<T>(block: &[u8], offset: usize) -> &T {
    let type_size = mem::size_of::<T>();
    assert!(type_size + offset <= block.len());
    assert_eq!(1, mem::align_of::<T>());
    unsafe { &*block[offset..].as_ptr().cast() }
}

fn view_mut<T>(block: &mut [u8], offset: usize) -> &mut T {
    let type_size = mem::size_of::<T>();
    assert!(type_size + offset <= block.len());
    assert_eq!(1, mem::align_of::<T>());
    unsafe { &mut *block[offset..].as_mut_ptr().cast() }
}

struct HexGrid<'a> {
    geometry: Geometry,
    image: &'a [u8],
}

impl fmt::Display for HexGrid<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 行号的十六进制位数
        let width = (usize::BITS - (self.geometry.block_count() - 1).leading_zeros())
            .div_ceil(4)
            .max(1) as usize;

        write!(f, "{:width$}", "", width = width + 2)?;
        for col in 0..self.geometry.block_size() {
            write!(f, "{col:>3x}")?;
        }
        writeln!(f)?;

        for (row, block) in self.image.chunks(self.geometry.block_size()).enumerate() {
            write!(f, "{row:>width$x}: ")?;
            for byte in block {
                write!(f, " {byte:02x}")?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use block_dev::RamDisk;

    use super::*;

    fn store(block_count: usize, block_size: usize) -> (Arc<RamDisk>, BlockStore) {
        let disk = Arc::new(RamDisk::new(block_count, block_size));
        let geometry = Geometry::new(block_count, block_size).unwrap();
        (disk.clone(), BlockStore::new(disk, geometry))
    }

    #[test]
    fn write_is_visible_before_sync_and_persisted_after() {
        let (disk, mut store) = store(16, 32);
        let block = [0xab; 32];
        store.write(3, &block).unwrap();

        assert_eq!(block.to_vec(), store.read(3).unwrap());
        assert_eq!(vec![0; 32], disk.image()[96..128].to_vec());

        store.sync().unwrap();
        assert_eq!(block.to_vec(), disk.image()[96..128].to_vec());
    }

    #[test]
    fn out_of_range_blocks() {
        let (_, mut store) = store(16, 32);
        assert_eq!(Err(Error::OutOfRange), store.read(16));
        assert_eq!(Err(Error::OutOfRange), store.write(16, &[0; 32]));
        assert_eq!(Err(Error::OutOfRange), store.write(1, &[0; 31]));
    }

    #[test]
    fn eviction_writes_back() {
        let (disk, mut store) = store(32, 32);
        for block_id in 0..32 {
            store.write(block_id, &[block_id as u8; 32]).unwrap();
        }
        // 前16块已被挤出缓存并写回
        assert_eq!(vec![0; 32], disk.image()[0..32].to_vec());
        assert_eq!(vec![1; 32], disk.image()[32..64].to_vec());
        assert_eq!(vec![31; 32], store.read(31).unwrap());
    }

    #[test]
    fn drop_syncs() {
        let (disk, mut store) = store(16, 32);
        store.write(2, &[5; 32]).unwrap();
        drop(store);
        assert_eq!(vec![5; 32], disk.image()[64..96].to_vec());
    }

    #[test]
    fn map_mut_goes_through_write() {
        let (_, mut store) = store(16, 32);
        store
            .map_mut(4, 30, |pair: &mut [u8; 2]| *pair = [1, 2])
            .unwrap();
        assert_eq!([1, 2], store.map(4, 30, |pair: &[u8; 2]| *pair).unwrap());
        assert_eq!(&[1, 2], &store.read(4).unwrap()[30..]);
    }

    #[test]
    fn dump_and_display_are_pure() {
        let (_, mut store) = store(16, 32);
        store.write(1, &[0x0f; 32]).unwrap();

        let dump = store.dump().unwrap();
        assert_eq!(512, dump.len());
        assert_eq!(&[0x0f; 32], &dump[32..64]);
        assert_eq!(dump, store.dump().unwrap());

        let grid = store.display().unwrap();
        assert_eq!(grid, store.display().unwrap());
        let lines: Vec<&str> = grid.lines().collect();
        assert_eq!(17, lines.len());
        assert!(lines[0].starts_with("     0  1  2"));
        assert!(lines[2].starts_with("1:  0f 0f"));
        assert!(lines[16].starts_with("f:  00"));
    }
}
