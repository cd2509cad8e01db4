//! # 文件系统门面
//!
//! 组合块存储、位图与目录，对外提供创建、导入、导出、删除、列目录等操作。
//!
//! 块位图不落盘：挂载时从根目录出发，沿所有存活目录项的块指针推导出来，
//! 因此它与目录内容永远一致。

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;

use block_dev::BlockDevice;
use enumflags2::BitFlags;
use vfs::{EntryKind, Error, Stat};

use crate::dir::Directory;
use crate::layout::{Bitmap, DirEntry, Name, MARKER_OFFSET};
use crate::path::{Components, Path};
use crate::store::BlockStore;
use crate::{Geometry, ROOT_BLOCK, ROOT_MARKER};

pub struct TinyFileSystem {
    store: BlockStore,
    /// 块位图，第 i 位为1表示块 i 被根目录或某个目录项占用
    blocks: Bitmap,
}

/// 路径解析到的目录
#[derive(Debug, Clone, Copy)]
enum Parent {
    /// 已有目录表
    Table(Directory),
    /// 还没有子项的目录，其块指针为0
    Unbound { dir: Directory, slot: usize },
}

impl TinyFileSystem {
    /// 无条件格式化：清零所有块，在0号块写入空的根目录表与格式化标记
    pub fn format(device: Arc<dyn BlockDevice>, geometry: Geometry) -> Result<Self, Error> {
        let mut store = BlockStore::new(device, geometry);

        let zero = vec![0; geometry.block_size()];
        for block_id in 0..geometry.block_count() {
            store.write(block_id, &zero)?;
        }
        store.map_mut(ROOT_BLOCK, MARKER_OFFSET, |marker: &mut u8| {
            *marker = ROOT_MARKER
        })?;
        store.sync()?;

        let mut blocks = Bitmap::with_capacity(geometry.block_count());
        blocks.claim(ROOT_BLOCK)?;
        log::info!(
            "formatted {} blocks of {} bytes",
            geometry.block_count(),
            geometry.block_size()
        );

        Ok(Self { store, blocks })
    }

    /// 挂载已格式化的镜像；格式化标记不对时重新格式化
    pub fn mount(device: Arc<dyn BlockDevice>, geometry: Geometry) -> Result<Self, Error> {
        let store = BlockStore::new(device.clone(), geometry);
        let marker = store.map(ROOT_BLOCK, MARKER_OFFSET, |marker: &u8| *marker)?;
        if marker != ROOT_MARKER {
            log::warn!("root marker is {marker:#04x}, formatting");
            drop(store);
            return Self::format(device, geometry);
        }

        let mut blocks = Bitmap::with_capacity(geometry.block_count());
        blocks.claim(ROOT_BLOCK)?;
        Self::claim_tree(&store, Directory::ROOT, &mut blocks)?;
        log::debug!("mounted, {} blocks in use", blocks.count_used());

        Ok(Self { store, blocks })
    }

    #[inline]
    pub fn geometry(&self) -> Geometry {
        self.store.geometry()
    }

    #[inline]
    pub fn store(&self) -> &BlockStore {
        &self.store
    }

    /// 创建空文件，不占用内容块
    pub fn create(&mut self, path: &str) -> Result<DirEntry, Error> {
        self.insert(path, EntryKind::File, None)
    }

    /// 把 `content` 写入新分配的内容块，并以 `path` 为名登记
    pub fn import(&mut self, path: &str, content: &[u8]) -> Result<DirEntry, Error> {
        self.insert(path, EntryKind::File, Some(content))
    }

    /// 取回文件内容，长度为导入时的字节数
    pub fn export(&self, path: &str) -> Result<Vec<u8>, Error> {
        let entry = self.lookup(path)?;
        if entry.kind().is_dir() {
            return Err(Error::IsADirectory);
        }
        if entry.block() == 0 {
            return Ok(Vec::new());
        }

        let mut content = self.store.read(entry.block())?;
        content.truncate(entry.size());
        Ok(content)
    }

    /// 创建目录，直到有了子项才为它分配目录表
    pub fn make_directory(&mut self, path: &str) -> Result<DirEntry, Error> {
        self.insert(path, EntryKind::Directory, None)
    }

    /// 删除文件或空目录，并释放其占用的块
    pub fn remove(&mut self, path: &str) -> Result<(), Error> {
        let (parent, basename) = path.parent_file().ok_or(Error::InvalidName)?;
        let name = Name::new(basename)?;
        let Parent::Table(dir) = self.walk(parent)? else {
            return Err(Error::NotFound);
        };

        let entry = dir.lookup(&self.store, &name)?;
        if entry.kind().is_dir()
            && entry.block() != 0
            && !Directory::at(entry.block()).is_empty(&self.store)?
        {
            return Err(Error::NotEmpty);
        }

        dir.remove(&mut self.store, &name)?;
        if entry.block() != 0 {
            self.release_block(entry.block())?;
        }
        self.store.sync()
    }

    pub fn lookup(&self, path: &str) -> Result<DirEntry, Error> {
        let (parent, basename) = path.parent_file().ok_or(Error::InvalidName)?;
        let name = Name::new(basename)?;
        match self.walk(parent)? {
            Parent::Table(dir) => dir.lookup(&self.store, &name),
            Parent::Unbound { .. } => Err(Error::NotFound),
        }
    }

    /// 按槽位升序列出目录下的名字
    pub fn list(&self, path: &str) -> Result<Vec<Name>, Error> {
        match self.walk(path.components())? {
            Parent::Table(dir) => dir.list(&self.store),
            Parent::Unbound { .. } => Ok(Vec::new()),
        }
    }

    /// 列出目录下属于 `kinds` 的目录项
    pub fn list_kinds(
        &self,
        path: &str,
        kinds: impl Into<BitFlags<EntryKind>>,
    ) -> Result<Vec<DirEntry>, Error> {
        let kinds = kinds.into();
        let entries = match self.walk(path.components())? {
            Parent::Table(dir) => dir.entries(&self.store)?,
            Parent::Unbound { .. } => Vec::new(),
        };

        Ok(entries
            .into_iter()
            .filter(|entry| kinds.contains(entry.kind()))
            .collect())
    }

    pub fn stat(&self, path: &str) -> Result<Stat, Error> {
        if path.components().next().is_none() {
            return Ok(Stat {
                kind: EntryKind::Directory,
                slot: None,
                block: ROOT_BLOCK,
                size: Directory::ROOT.entries(&self.store)?.len(),
            });
        }

        let entry = self.lookup(path)?;
        let size = match entry.kind() {
            EntryKind::File => entry.size(),
            EntryKind::Directory if entry.block() == 0 => 0,
            EntryKind::Directory => Directory::at(entry.block()).entries(&self.store)?.len(),
        };

        Ok(Stat {
            kind: entry.kind(),
            slot: Some(entry.slot()),
            block: entry.block(),
            size,
        })
    }

    /// 十六进制网格形式的整个磁盘
    #[inline]
    pub fn display(&self) -> Result<String, Error> {
        self.store.display()
    }

    #[inline]
    pub fn dump(&self) -> Result<Vec<u8>, Error> {
        self.store.dump()
    }

    #[inline]
    pub fn is_block_used(&self, block_id: usize) -> bool {
        self.blocks.is_used(block_id)
    }

    pub fn free_blocks(&self) -> usize {
        self.blocks.capacity() - self.blocks.count_used()
    }

    #[inline]
    pub fn sync(&mut self) -> Result<(), Error> {
        self.store.sync()
    }
}

impl TinyFileSystem {
    /// 登记目录下所有目录项占用的块，递归进入子目录表
    fn claim_tree(store: &BlockStore, dir: Directory, blocks: &mut Bitmap) -> Result<(), Error> {
        for entry in dir.entries(store)? {
            if entry.block() == 0 {
                continue;
            }
            if !blocks.claim(entry.block())? {
                // 重复占用的块不再深入，避免目录成环
                log::warn!(
                    "block {} claimed twice, last by {}",
                    entry.block(),
                    entry.name()
                );
                continue;
            }
            if entry.kind().is_dir() {
                Self::claim_tree(store, Directory::at(entry.block()), blocks)?;
            }
        }
        Ok(())
    }

    /// 沿路径逐级进入目录，每一级都必须是目录
    fn walk(&self, cmps: Components<'_>) -> Result<Parent, Error> {
        let mut current = Parent::Table(Directory::ROOT);
        for cmp in cmps {
            let Parent::Table(dir) = current else {
                return Err(Error::NotFound);
            };
            let entry = dir.lookup(&self.store, &Name::new(cmp)?)?;
            if !entry.kind().is_dir() {
                return Err(Error::NotADirectory);
            }
            current = match entry.block() {
                0 => Parent::Unbound {
                    dir,
                    slot: entry.slot(),
                },
                block => Parent::Table(Directory::at(block)),
            };
        }
        Ok(current)
    }

    /// 为还没有子项的目录分配并绑定目录表
    fn bind(&mut self, parent: Parent) -> Result<Directory, Error> {
        match parent {
            Parent::Table(dir) => Ok(dir),
            Parent::Unbound { dir, slot } => {
                let block = self.alloc_block(&[])?;
                dir.set_pointer(&mut self.store, slot, block)?;
                log::debug!("bound directory table at block {block}");
                Ok(Directory::at(block))
            }
        }
    }

    fn insert(
        &mut self,
        path: &str,
        kind: EntryKind,
        content: Option<&[u8]>,
    ) -> Result<DirEntry, Error> {
        let (parent, basename) = path.parent_file().ok_or(Error::InvalidName)?;
        let name = Name::new(basename)?;
        if content.is_some_and(|content| content.len() > self.geometry().block_size()) {
            return Err(Error::TooLarge);
        }

        // 先确认能登记，避免分配了块再回滚
        let parent = self.walk(parent)?;
        if let Parent::Table(dir) = parent {
            let entries = dir.entries(&self.store)?;
            if entries.iter().any(|entry| entry.name() == name) {
                return Err(Error::AlreadyExists);
            }
            if entries.len() == crate::SLOTS {
                return Err(Error::DirectoryFull);
            }
        }

        let dir = self.bind(parent)?;
        let (block, size) = match content {
            Some(content) => (self.alloc_block(content)?, content.len()),
            None => (0, 0),
        };

        let slot = match dir.create(&mut self.store, name, kind, block, size) {
            Ok(slot) => slot,
            Err(e) => {
                if block != 0 {
                    self.release_block(block)?;
                }
                return Err(e);
            }
        };
        self.store.sync()?;

        Ok(DirEntry::new(slot, name, kind, block, size))
    }

    /// 首次适配分配一块，写入补0后的 `content`
    fn alloc_block(&mut self, content: &[u8]) -> Result<usize, Error> {
        let block = self.blocks.allocate().ok_or(Error::AllocationFailure)?;

        let mut data = vec![0; self.geometry().block_size()];
        data[..content.len()].copy_from_slice(content);
        if let Err(e) = self.store.write(block, &data) {
            self.blocks.free(block)?;
            return Err(e);
        }

        Ok(block)
    }

    /// 清零并归还一块
    fn release_block(&mut self, block: usize) -> Result<(), Error> {
        let zero = vec![0; self.geometry().block_size()];
        self.store.write(block, &zero)?;
        self.blocks.free(block)
    }
}
