use crate::EntryKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stat {
    pub kind: EntryKind,
    /// 所在目录表的槽位，根目录没有槽位
    pub slot: Option<usize>,
    /// 内容块或子目录表所在块，`0` 表示尚未分配
    pub block: usize,
    /// 文件为字节数；目录为存活目录项个数
    pub size: usize,
}
