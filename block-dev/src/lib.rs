//! # 块设备接口层
//!
//! 块设备是以**块**为单位存储数据的设备，例如磁盘镜像文件、内存缓冲区等；
//! [`BlockDevice`] 就是对读写块设备的抽象，
//! 实现了此特质的类型称为**块设备驱动**。
//!
//! `tfs` 只通过块设备驱动读写块设备，驱动自己负责块号到字节偏移的换算。

#![no_std]

extern crate alloc;

mod ram_disk;

use core::any::Any;

use vfs::Error;

pub use self::ram_disk::RamDisk;

/// 块设备驱动特质
///
/// 缓冲区长度恒为一个块的大小。
pub trait BlockDevice: Send + Sync + Any {
    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> Result<(), Error>;
    fn write_block(&self, block_id: usize, buf: &[u8]) -> Result<(), Error>;
}
