use vfs::EntryKind;

use super::Name;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirEntry {
    slot: usize,
    name: Name,
    kind: EntryKind,
    /// 内容块或子目录表所在块，`0` 表示尚未分配
    block: usize,
    /// 文件内容的字节数，目录恒为0
    size: usize,
}

impl DirEntry {
    #[inline]
    pub fn new(slot: usize, name: Name, kind: EntryKind, block: usize, size: usize) -> Self {
        Self {
            slot,
            name,
            kind,
            block,
            size,
        }
    }

    #[inline]
    pub fn slot(&self) -> usize {
        self.slot
    }

    #[inline]
    pub fn name(&self) -> Name {
        self.name
    }

    #[inline]
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    #[inline]
    pub fn block(&self) -> usize {
        self.block
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }
}
