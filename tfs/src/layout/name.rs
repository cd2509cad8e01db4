use core::fmt;

use vfs::Error;

use crate::NAME_LEN;

/// 目录项的名字：定长、区分大小写的标识符。
///
/// 不足 [`NAME_LEN`] 字节的部分补0；允许除 `/` 以外的可打印ASCII字符。
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Name([u8; NAME_LEN]);

impl Name {
    pub fn new(name: &str) -> Result<Self, Error> {
        let bytes = name.as_bytes();
        if bytes.is_empty()
            || bytes.len() > NAME_LEN
            || !bytes.iter().all(|&c| c.is_ascii_graphic() && c != b'/')
        {
            return Err(Error::InvalidName);
        }

        let mut raw = [0; NAME_LEN];
        raw[..bytes.len()].copy_from_slice(bytes);
        Ok(Self(raw))
    }

    #[inline]
    pub(crate) fn from_raw(raw: [u8; NAME_LEN]) -> Self {
        Self(raw)
    }

    #[inline]
    pub(crate) fn raw(&self) -> [u8; NAME_LEN] {
        self.0
    }

    /// 去掉补位0之后的字节
    pub fn as_bytes(&self) -> &[u8] {
        let len = self.0.iter().position(|&c| c == 0).unwrap_or(NAME_LEN);
        &self.0[..len]
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 磁盘上的名字不一定合法，逐字节输出
        self.as_bytes()
            .iter()
            .try_for_each(|&c| write!(f, "{}", char::from(c)))
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn valid_names() {
        let a = Name::new("a").unwrap();
        assert_eq!(a, "a");
        assert_eq!("a", a.to_string());
        assert_ne!(a, Name::new("A").unwrap());
    }

    #[test]
    fn invalid_names() {
        for name in ["", "ab", "/", " ", "\n", "é"] {
            assert_eq!(Err(Error::InvalidName), Name::new(name), "{name:?}");
        }
    }
}
