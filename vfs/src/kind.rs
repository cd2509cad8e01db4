use enumflags2::bitflags;

/// 目录项的类型。
///
/// 以位标志表示，方便按类型过滤目录项，例如 `EntryKind::File | EntryKind::Directory`。
#[bitflags]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File = 0b01,
    Directory = 0b10,
}

impl EntryKind {
    #[inline]
    pub fn is_dir(self) -> bool {
        self == Self::Directory
    }
}
