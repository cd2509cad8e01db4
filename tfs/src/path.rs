use core::iter::Filter;
use core::str::Split;

/// 路径的各级分量，多余的 `/` 被忽略
pub type Components<'a> = Filter<Split<'a, char>, fn(&&'a str) -> bool>;

pub trait Path {
    /// 逐级的目录名与文件名，根目录没有分量
    fn components(&self) -> Components<'_>;

    /// 返回路径的`(父目录各级分量, 文件名)`，根目录返回`None`
    fn parent_file(&self) -> Option<(Components<'_>, &str)>;
}

impl Path for str {
    fn components(&self) -> Components<'_> {
        fn non_empty(cmp: &&str) -> bool {
            !cmp.is_empty()
        }

        self.split('/').filter(non_empty as fn(&&str) -> bool)
    }

    fn parent_file(&self) -> Option<(Components<'_>, &str)> {
        let mut cmps = self.components();
        let basename = cmps.next_back()?;
        Some((cmps, basename))
    }
}
