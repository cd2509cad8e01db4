use alloc::vec;
use alloc::vec::Vec;

use vfs::Error;

/// 占用位图：第 i 位为1表示槽位（或块）i 已被占用。
///
/// 位按字节小端排列，字节 `i / 8` 的第 `i % 8` 位对应槽位 i。
/// 既可以借用目录表里的位图字节，也可以自己持有一份。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap<S = Vec<u8>> {
    bits: S,
    /// 有效位数
    capacity: usize,
}

impl Bitmap {
    /// 全空的位图
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bits: vec![0; capacity.div_ceil(8)],
            capacity,
        }
    }
}

impl<S: AsRef<[u8]>> Bitmap<S> {
    pub fn new(bits: S, capacity: usize) -> Self {
        assert!(capacity <= bits.as_ref().len() * 8);
        Self { bits, capacity }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 越界的槽位视作空闲
    pub fn is_used(&self, slot: usize) -> bool {
        slot < self.capacity && self.bits.as_ref()[slot / 8] & (1 << (slot % 8)) != 0
    }

    pub fn count_used(&self) -> usize {
        self.iter_used().count()
    }

    /// 按升序遍历已占用的槽位
    pub fn iter_used(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.capacity).filter(|&slot| self.is_used(slot))
    }

    #[inline]
    pub fn is_clear(&self) -> bool {
        self.iter_used().next().is_none()
    }
}

impl<S: AsRef<[u8]> + AsMut<[u8]>> Bitmap<S> {
    /// 首次适配：分配编号最小的空闲槽位。
    /// 若位图已满，则返回空。
    pub fn allocate(&mut self) -> Option<usize> {
        // 寻找还有0的字节，其末尾连续1的个数就是字节内第一个空位
        let (byte_index, inbyte_index) = self
            .bits
            .as_ref()
            .iter()
            .enumerate()
            .find_map(|(index, &bits)| (bits != u8::MAX).then_some((index, bits.trailing_ones())))?;

        let slot = byte_index * 8 + inbyte_index as usize;
        if slot >= self.capacity {
            return None;
        }

        self.bits.as_mut()[byte_index] |= 1 << inbyte_index;
        Some(slot)
    }

    /// 标记指定槽位为占用，返回它此前是否空闲
    pub fn claim(&mut self, slot: usize) -> Result<bool, Error> {
        if slot >= self.capacity {
            return Err(Error::OutOfRange);
        }

        let was_free = !self.is_used(slot);
        self.bits.as_mut()[slot / 8] |= 1 << (slot % 8);
        Ok(was_free)
    }

    pub fn free(&mut self, slot: usize) -> Result<(), Error> {
        if slot >= self.capacity {
            return Err(Error::OutOfRange);
        }

        // 编号一定得有对应的位
        debug_assert!(self.is_used(slot));

        self.bits.as_mut()[slot / 8] &= !(1 << (slot % 8));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_fit() {
        let mut bitmap = Bitmap::with_capacity(12);
        assert_eq!(Some(0), bitmap.allocate());
        assert_eq!(Some(1), bitmap.allocate());
        assert_eq!(Some(2), bitmap.allocate());

        bitmap.free(1).unwrap();
        assert_eq!(Some(1), bitmap.allocate());
        assert_eq!(Some(3), bitmap.allocate());
    }

    #[test]
    fn full_bitmap_allocates_nothing() {
        let mut bitmap = Bitmap::with_capacity(10);
        for slot in 0..10 {
            assert_eq!(Some(slot), bitmap.allocate());
        }
        assert_eq!(None, bitmap.allocate());
        assert_eq!(10, bitmap.count_used());
    }

    #[test]
    fn out_of_range_is_free_but_not_freeable() {
        let mut bitmap = Bitmap::with_capacity(8);
        bitmap.claim(7).unwrap();
        assert!(bitmap.is_used(7));
        assert!(!bitmap.is_used(8));
        assert!(!bitmap.is_used(usize::MAX));
        assert_eq!(Err(Error::OutOfRange), bitmap.free(8));
        assert_eq!(Err(Error::OutOfRange), bitmap.claim(8));
    }

    #[test]
    fn borrowed_bytes() {
        let mut byte = [0b0000_0101u8];
        let mut bitmap = Bitmap::new(&mut byte, 8);
        assert_eq!(vec![0, 2], bitmap.iter_used().collect::<Vec<_>>());
        assert_eq!(Some(1), bitmap.allocate());
        assert_eq!(Ok(false), bitmap.claim(2));
        assert_eq!(Ok(true), bitmap.claim(5));
        assert_eq!(0b0010_0111, byte[0]);
    }
}
