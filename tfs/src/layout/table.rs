use core::mem;

use vfs::{EntryKind, Error};

use super::{Bitmap, DirEntry, Name};
use crate::{NAME_LEN, SLOTS};

/// 位图所需字节数
const BITMAP_BYTES: usize = SLOTS.div_ceil(8);

/// 目录表在磁盘上的布局，各数组按槽位对齐。
///
/// 槽位位图是目录项是否存在的唯一依据：
/// 位为0的槽位上残留的名字、指针都没有意义。
#[derive(Debug, Default, Clone)]
#[repr(C)]
pub struct DirTable {
    /// 第 i 位为1表示槽位 i 存有目录项
    bitmap: [u8; BITMAP_BYTES],
    /// 第 i 位为1表示槽位 i 是目录
    dirs: [u8; BITMAP_BYTES],
    names: [[u8; NAME_LEN]; SLOTS],
    pointers: [u8; SLOTS],
    sizes: [u8; SLOTS],
}

impl DirTable {
    /// 目录表大小恒为26字节
    pub const SIZE: usize = mem::size_of::<Self>();

    #[inline]
    pub fn slots(&self) -> Bitmap<&[u8]> {
        Bitmap::new(&self.bitmap[..], SLOTS)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots().is_clear()
    }

    /// 解码槽位上的目录项，空槽位返回空
    pub fn entry(&self, slot: usize) -> Option<DirEntry> {
        if !self.slots().is_used(slot) {
            return None;
        }

        let kind = if Bitmap::new(&self.dirs[..], SLOTS).is_used(slot) {
            EntryKind::Directory
        } else {
            EntryKind::File
        };

        Some(DirEntry::new(
            slot,
            Name::from_raw(self.names[slot]),
            kind,
            self.pointers[slot] as usize,
            self.sizes[slot] as usize,
        ))
    }

    /// 按槽位升序遍历存活的目录项
    pub fn entries(&self) -> impl Iterator<Item = DirEntry> + '_ {
        (0..SLOTS).filter_map(move |slot| self.entry(slot))
    }

    pub fn find(&self, name: &Name) -> Option<DirEntry> {
        self.entries().find(|entry| entry.name() == *name)
    }

    /// 在编号最小的空槽位写入新目录项，返回该槽位
    pub fn insert(
        &mut self,
        name: Name,
        kind: EntryKind,
        block: usize,
        size: usize,
    ) -> Result<usize, Error> {
        // 确认没有已创建的同名项
        if self.find(&name).is_some() {
            return Err(Error::AlreadyExists);
        }
        let (Ok(block), Ok(size)) = (u8::try_from(block), u8::try_from(size)) else {
            return Err(Error::OutOfRange);
        };

        let slot = Bitmap::new(&mut self.bitmap, SLOTS)
            .allocate()
            .ok_or(Error::DirectoryFull)?;

        self.names[slot] = name.raw();
        self.pointers[slot] = block;
        self.sizes[slot] = size;
        self.set_dir(slot, kind.is_dir());

        Ok(slot)
    }

    /// 删除同名目录项，清空其槽位并返回被删除的项
    pub fn remove(&mut self, name: &Name) -> Result<DirEntry, Error> {
        let entry = self.find(name).ok_or(Error::NotFound)?;
        let slot = entry.slot();

        Bitmap::new(&mut self.bitmap, SLOTS).free(slot)?;
        self.set_dir(slot, false);
        self.names[slot] = [0; NAME_LEN];
        self.pointers[slot] = 0;
        self.sizes[slot] = 0;

        Ok(entry)
    }

    /// 改写存活目录项的块指针
    pub fn set_pointer(&mut self, slot: usize, block: usize) -> Result<(), Error> {
        if !self.slots().is_used(slot) {
            return Err(Error::NotFound);
        }
        self.pointers[slot] = u8::try_from(block).map_err(|_| Error::OutOfRange)?;
        Ok(())
    }
}

impl DirTable {
    fn set_dir(&mut self, slot: usize, is_dir: bool) {
        let mask = 1 << (slot % 8);
        if is_dir {
            self.dirs[slot / 8] |= mask;
        } else {
            self.dirs[slot / 8] &= !mask;
        }
    }
}
