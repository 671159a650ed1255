//! 关节在扁平向量中的位置索引
//!
//! 模型加载后，按服务器给出的关节顺序累加每个关节的尺寸（配置参数个数或
//! 自由度个数），得到每个关节在配置向量 / 速度向量中的起始下标。
//!
//! 索引只在构造时计算一次，之后只读。

use std::collections::HashMap;
use std::ops::Range;

/// 单个关节的位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankEntry {
    pub joint_name: String,
    /// 在扁平向量中的起始下标
    pub offset: usize,
    /// 占用的元素个数
    pub size: usize,
}

impl RankEntry {
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.size
    }
}

/// 关节名到扁平向量下标的索引
///
/// 不变量：第一个关节的偏移为 0，后一个关节的偏移等于前一个关节的
/// 偏移加尺寸，`total()` 等于最后一个关节的偏移加尺寸。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankIndex {
    entries: Vec<RankEntry>,
    lookup: HashMap<String, usize>,
    total: usize,
}

impl RankIndex {
    /// 按顺序追加一个关节
    fn push(&mut self, joint_name: String, size: usize) {
        let offset = self.total;
        // 关节名在模型内唯一；重复时保留第一次出现的位置
        self.lookup
            .entry(joint_name.clone())
            .or_insert(self.entries.len());
        self.entries.push(RankEntry {
            joint_name,
            offset,
            size,
        });
        self.total += size;
    }

    /// 关节的起始下标
    pub fn rank(&self, joint_name: &str) -> Option<usize> {
        self.entry(joint_name).map(|e| e.offset)
    }

    pub fn size(&self, joint_name: &str) -> Option<usize> {
        self.entry(joint_name).map(|e| e.size)
    }

    /// 关节在扁平向量中占用的区间
    pub fn range(&self, joint_name: &str) -> Option<Range<usize>> {
        self.entry(joint_name).map(RankEntry::range)
    }

    pub fn entry(&self, joint_name: &str) -> Option<&RankEntry> {
        self.lookup.get(joint_name).map(|&i| &self.entries[i])
    }

    /// 所有关节尺寸之和
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 按关节顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = &RankEntry> {
        self.entries.iter()
    }

    /// `关节名 -> 起始下标` 的映射
    pub fn to_map(&self) -> HashMap<String, usize> {
        self.entries
            .iter()
            .map(|e| (e.joint_name.clone(), e.offset))
            .collect()
    }
}

impl FromIterator<(String, usize)> for RankIndex {
    fn from_iter<I: IntoIterator<Item = (String, usize)>>(iter: I) -> Self {
        let mut index = RankIndex::default();
        for (joint_name, size) in iter {
            index.push(joint_name, size);
        }
        index
    }
}

impl<'a> IntoIterator for &'a RankIndex {
    type Item = &'a RankEntry;
    type IntoIter = std::slice::Iter<'a, RankEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn index(sizes: &[(&str, usize)]) -> RankIndex {
        sizes.iter().map(|&(n, s)| (n.to_string(), s)).collect()
    }

    #[test]
    fn test_two_single_dof_joints() {
        let idx = index(&[("j1", 1), ("j2", 1)]);
        assert_eq!(idx.rank("j1"), Some(0));
        assert_eq!(idx.rank("j2"), Some(1));
        assert_eq!(idx.total(), 2);
        assert_eq!(idx.len(), 2);
    }

    #[test]
    fn test_free_flyer_then_arm() {
        let idx = index(&[("base_joint_xyz", 3), ("base_joint_SO3", 4), ("shoulder", 1)]);
        assert_eq!(idx.rank("base_joint_SO3"), Some(3));
        assert_eq!(idx.range("base_joint_SO3"), Some(3..7));
        assert_eq!(idx.rank("shoulder"), Some(7));
        assert_eq!(idx.size("shoulder"), Some(1));
        assert_eq!(idx.total(), 8);
        assert_eq!(idx.rank("elbow"), None);
    }

    #[test]
    fn test_zero_sized_joint_shares_offset() {
        // 固定关节不占用配置参数
        let idx = index(&[("j1", 1), ("fixed", 0), ("j2", 1)]);
        assert_eq!(idx.rank("fixed"), Some(1));
        assert_eq!(idx.rank("j2"), Some(1));
        assert_eq!(idx.range("fixed"), Some(1..1));
    }

    #[test]
    fn test_empty_index() {
        let idx = RankIndex::default();
        assert!(idx.is_empty());
        assert_eq!(idx.total(), 0);
        assert!(idx.to_map().is_empty());
    }

    #[test]
    fn test_duplicate_name_keeps_first() {
        let idx = index(&[("j", 2), ("j", 3)]);
        assert_eq!(idx.rank("j"), Some(0));
        assert_eq!(idx.total(), 5);
        assert_eq!(idx.len(), 2);
    }

    #[test]
    fn test_iteration_order() {
        let idx = index(&[("c", 1), ("a", 2), ("b", 1)]);
        let names: Vec<&str> = (&idx).into_iter().map(|e| e.joint_name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    proptest! {
        #[test]
        fn prop_offsets_contiguous(sizes in proptest::collection::vec(0usize..8, 0..32)) {
            let idx: RankIndex = sizes
                .iter()
                .enumerate()
                .map(|(i, &s)| (format!("joint_{i}"), s))
                .collect();

            let mut expected = 0;
            for entry in idx.iter() {
                prop_assert_eq!(entry.offset, expected);
                expected += entry.size;
            }
            prop_assert_eq!(idx.total(), sizes.iter().sum::<usize>());
            if let Some(last) = idx.iter().last() {
                prop_assert_eq!(last.offset + last.size, idx.total());
            }
        }
    }
}
