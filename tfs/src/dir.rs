//! # 目录层
//!
//! [`Directory`] 只记录目录表所在的块，
//! 每次操作都借用块存储，从磁盘映射读取或修改目录表。
//! 创建与删除各自只做一次完整的“读-改-写”。

use alloc::vec::Vec;

use vfs::{EntryKind, Error};

use crate::layout::{DirEntry, DirTable, Name};
use crate::store::BlockStore;
use crate::ROOT_BLOCK;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Directory {
    /// 目录表所在块
    block_id: usize,
}

impl Directory {
    pub const ROOT: Self = Self {
        block_id: ROOT_BLOCK,
    };

    #[inline]
    pub fn at(block_id: usize) -> Self {
        Self { block_id }
    }

    #[inline]
    pub fn block_id(&self) -> usize {
        self.block_id
    }

    /// 根据名字获取目录项
    pub fn lookup(&self, store: &BlockStore, name: &Name) -> Result<DirEntry, Error> {
        self.on_disk(store, |table| table.find(name))?
            .ok_or(Error::NotFound)
    }

    /// 在当前目录下创建目录项，返回其槽位
    pub fn create(
        &self,
        store: &mut BlockStore,
        name: Name,
        kind: EntryKind,
        block: usize,
        size: usize,
    ) -> Result<usize, Error> {
        let slot = self.on_disk_mut(store, |table| table.insert(name, kind, block, size))??;
        log::debug!("dir@{}: created {name} in slot {slot}", self.block_id);
        Ok(slot)
    }

    /// 删除目录项并返回它。
    /// 目录是否为空由调用者检查，这里只负责清空槽位。
    pub fn remove(&self, store: &mut BlockStore, name: &Name) -> Result<DirEntry, Error> {
        let entry = self.on_disk_mut(store, |table| table.remove(name))??;
        log::debug!(
            "dir@{}: removed {name} from slot {}",
            self.block_id,
            entry.slot()
        );
        Ok(entry)
    }

    /// 按槽位升序列出名字
    pub fn list(&self, store: &BlockStore) -> Result<Vec<Name>, Error> {
        self.on_disk(store, |table| table.entries().map(|entry| entry.name()).collect())
    }

    pub fn entries(&self, store: &BlockStore) -> Result<Vec<DirEntry>, Error> {
        self.on_disk(store, |table| table.entries().collect())
    }

    /// 把子目录表绑定到槽位上的目录项
    pub fn set_pointer(
        &self,
        store: &mut BlockStore,
        slot: usize,
        block: usize,
    ) -> Result<(), Error> {
        self.on_disk_mut(store, |table| table.set_pointer(slot, block))?
    }

    /// 槽位位图全空即为空目录
    pub fn is_empty(&self, store: &BlockStore) -> Result<bool, Error> {
        self.on_disk(store, DirTable::is_empty)
    }

    pub fn is_used(&self, store: &BlockStore, slot: usize) -> Result<bool, Error> {
        self.on_disk(store, |table| table.slots().is_used(slot))
    }
}

impl Directory {
    /// 读取对磁盘的映射并处理
    fn on_disk<V>(&self, store: &BlockStore, f: impl FnOnce(&DirTable) -> V) -> Result<V, Error> {
        store.map(self.block_id, 0, f)
    }

    /// 以某种方式修改对磁盘的映射
    fn on_disk_mut<V>(
        &self,
        store: &mut BlockStore,
        f: impl FnOnce(&mut DirTable) -> V,
    ) -> Result<V, Error> {
        store.map_mut(self.block_id, 0, f)
    }
}

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;
    use alloc::vec;

    use block_dev::RamDisk;

    use super::*;
    use crate::Geometry;

    fn store() -> BlockStore {
        let geometry = Geometry::default();
        let disk = RamDisk::new(geometry.block_count(), geometry.block_size());
        BlockStore::new(Arc::new(disk), geometry)
    }

    fn name(s: &str) -> Name {
        Name::new(s).unwrap()
    }

    #[test]
    fn create_then_lookup() {
        let mut store = store();
        let dir = Directory::at(2);
        let slot = dir
            .create(&mut store, name("a"), EntryKind::File, 5, 3)
            .unwrap();

        let entry = dir.lookup(&store, &name("a")).unwrap();
        assert_eq!(slot, entry.slot());
        assert_eq!(EntryKind::File, entry.kind());
        assert_eq!(5, entry.block());
        assert_eq!(3, entry.size());
        assert!(dir.is_used(&store, slot).unwrap());
        // 其它块不受影响
        assert!(Directory::ROOT.is_empty(&store).unwrap());
    }

    #[test]
    fn remove_is_inverse_of_create() {
        let mut store = store();
        let dir = Directory::ROOT;
        let slot = dir
            .create(&mut store, name("a"), EntryKind::Directory, 0, 0)
            .unwrap();
        dir.remove(&mut store, &name("a")).unwrap();

        assert_eq!(Err(Error::NotFound), dir.lookup(&store, &name("a")));
        assert!(!dir.is_used(&store, slot).unwrap());
        assert!(dir.is_empty(&store).unwrap());
        assert_eq!(vec![0; DirTable::SIZE], store.read(ROOT_BLOCK).unwrap()[..DirTable::SIZE]);
    }

    #[test]
    fn set_pointer_binds_child_table() {
        let mut store = store();
        let dir = Directory::ROOT;
        let slot = dir
            .create(&mut store, name("d"), EntryKind::Directory, 0, 0)
            .unwrap();
        dir.set_pointer(&mut store, slot, 7).unwrap();
        assert_eq!(7, dir.lookup(&store, &name("d")).unwrap().block());
        assert_eq!(
            Err(Error::NotFound),
            dir.set_pointer(&mut store, slot + 1, 7)
        );
    }

    #[test]
    fn list_in_slot_order() {
        let mut store = store();
        let dir = Directory::ROOT;
        for s in ["a", "b", "c"] {
            dir.create(&mut store, name(s), EntryKind::File, 0, 0)
                .unwrap();
        }
        dir.remove(&mut store, &name("b")).unwrap();
        dir.create(&mut store, name("z"), EntryKind::File, 0, 0)
            .unwrap();

        assert_eq!(dir.list(&store).unwrap(), ["a", "z", "c"]);
        let slots: Vec<usize> = dir
            .entries(&store)
            .unwrap()
            .iter()
            .map(DirEntry::slot)
            .collect();
        assert_eq!(vec![0, 1, 2], slots);
    }
}
