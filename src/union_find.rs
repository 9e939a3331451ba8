/// Tracks the merges of an agglomerative tree. Samples are nodes `0..n_samples`, every union
/// creates the next node id, mirroring the numbering of [`crate::data_wrappers::MergeNode`].
pub(crate) struct UnionFind {
    parent: Vec<usize>,
    next_label: usize,
    size: Vec<usize>,
}

impl UnionFind {
    pub(crate) fn new(n_samples: usize) -> Self {
        let length = (2 * n_samples).saturating_sub(1);
        let parent = vec![length; length];
        let next_label = n_samples;
        let size = (0..length).map(|n| usize::from(n < n_samples)).collect();

        UnionFind {
            parent,
            next_label,
            size,
        }
    }

    /// Joins two roots under a freshly numbered node and returns its id.
    pub(crate) fn union(&mut self, m: usize, n: usize) -> usize {
        let label = self.next_label;
        self.parent[m] = label;
        self.parent[n] = label;
        self.size[label] = self.size[m] + self.size[n];
        self.next_label += 1;
        label
    }

    pub(crate) fn find(&mut self, n: usize) -> usize {
        let root_marker = self.parent.len();
        let mut root = n;
        while self.parent[root] != root_marker {
            root = self.parent[root];
        }
        let mut node = n;
        while node != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    pub(crate) fn size_of(&self, n: usize) -> usize {
        self.size[n]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unions_number_new_nodes() {
        let mut uf = UnionFind::new(4);
        let first = uf.union(0, 1);
        assert_eq!(first, 4);
        let second = uf.union(2, 3);
        assert_eq!(second, 5);
        assert_eq!(uf.find(0), 4);
        assert_eq!(uf.find(3), 5);
        let root = uf.union(first, second);
        assert_eq!(root, 6);
        assert_eq!(uf.find(1), 6);
        assert_eq!(uf.size_of(root), 4);
    }
}
