use derive_more::Display;

/// 文件系统各层共用的错误
///
/// 所有错误都可以在门面处恢复，调用者自行决定是否重试。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Error {
    /// 块号或槽位越界
    #[display(fmt = "block or slot index out of range")]
    OutOfRange,
    #[display(fmt = "no such file or directory")]
    NotFound,
    #[display(fmt = "entry already exists")]
    AlreadyExists,
    /// 目录表没有空槽位
    #[display(fmt = "directory is full")]
    DirectoryFull,
    #[display(fmt = "directory is not empty")]
    NotEmpty,
    /// 后备存储无法创建、调整大小或分配新块
    #[display(fmt = "storage allocation failed")]
    AllocationFailure,
    #[display(fmt = "invalid name")]
    InvalidName,
    #[display(fmt = "invalid disk geometry")]
    InvalidGeometry,
    /// 内容超过单个块的容量
    #[display(fmt = "content does not fit in one block")]
    TooLarge,
    #[display(fmt = "is a directory")]
    IsADirectory,
    #[display(fmt = "not a directory")]
    NotADirectory,
    /// 块设备读写失败
    #[display(fmt = "block device I/O error")]
    Io,
}
