//! # 磁盘数据结构层
//!
//! 每个目录表占据一块的开头：
//! 槽位位图 | 目录位图 | 名字 | 块指针 | 大小
//!
//! 0号块是根目录表，表之后紧跟一字节的格式化标记。

mod bitmap;
pub use bitmap::Bitmap;

mod name;
pub use name::Name;

mod table;
pub use table::DirTable;

/// 目录项，由目录表中某个槽位解码而来
mod dir_entry;
pub use dir_entry::DirEntry;

/// 格式化标记在0号块内的偏移
pub const MARKER_OFFSET: usize = DirTable::SIZE;
