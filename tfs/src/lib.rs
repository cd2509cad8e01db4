#![no_std]

extern crate alloc;

/* tfs 的整体架构，自上而下 */

// 门面层：创建、导入、导出、删除等文件系统操作
mod fs;
pub use fs::TinyFileSystem;

// 目录层：按名字查找、登记、删除目录项
mod dir;
pub use dir::Directory;

// 磁盘数据结构层：位图、目录表与名字
pub mod layout;
pub use layout::{Bitmap, DirEntry, Name};

// 块存储层：按块号读写，带写回缓存
mod store;
pub use store::BlockStore;

mod geometry;
pub use geometry::Geometry;

mod path;
pub use path::Path;

pub use block_dev::BlockDevice;
pub use vfs::{EntryKind, Error, Stat};

/// 每个目录表的槽位数
pub const SLOTS: usize = 8;
/// 名字在磁盘上的字节数
pub const NAME_LEN: usize = 1;
/// 根目录表所在块
pub const ROOT_BLOCK: usize = 0;
/// 格式化标记：0号块被根目录占用
pub const ROOT_MARKER: u8 = 0x01;
/// 根目录表加格式化标记
pub const HEADER_SIZE: usize = layout::DirTable::SIZE + 1;

pub const DEFAULT_BLOCK_COUNT: usize = 16;
pub const DEFAULT_BLOCK_SIZE: usize = 32;
