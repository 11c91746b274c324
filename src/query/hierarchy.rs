// ==========================================
// 人事管理系统 - 层级遍历
// ==========================================
// 邻接表 (id, parent_id) → 父→子映射 → 显式队列广度优先遍历
// 不依赖存储端递归查询语法；visited 集合防止环导致死循环
// ==========================================

use std::collections::{HashMap, HashSet, VecDeque};
use std::hash::Hash;

/// 收集 root 及其全部后代（广度优先顺序，root 在首位）
///
/// root 不在边集合中时仍返回 `[root]`
pub fn collect_subtree<K, I>(edges: I, root: &K) -> Vec<K>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = (K, Option<K>)>,
{
    let mut children: HashMap<K, Vec<K>> = HashMap::new();
    for (id, parent) in edges {
        if let Some(parent) = parent {
            children.entry(parent).or_default().push(id);
        }
    }

    let mut visited: HashSet<K> = HashSet::new();
    let mut queue: VecDeque<K> = VecDeque::new();
    let mut out = Vec::new();

    visited.insert(root.clone());
    queue.push_back(root.clone());

    while let Some(node) = queue.pop_front() {
        if let Some(kids) = children.get(&node) {
            for kid in kids {
                if visited.insert(kid.clone()) {
                    queue.push_back(kid.clone());
                }
            }
        }
        out.push(node);
    }

    out
}
