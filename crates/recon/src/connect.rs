/// Union-find over explicit parent/rank vectors, scoped to one bucket.
/// Buckets are a single account-day, so the O(n²) pairwise edge scan in
/// `components` stays small and auditable.
#[derive(Debug)]
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    pub fn new(n: usize) -> Self {
        UnionFind {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    /// Find the set representative, compressing the path on the way up.
    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut cur = x;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    /// Union by rank. Returns false if the two were already joined.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }
        if self.rank[ra] < self.rank[rb] {
            self.parent[ra] = rb;
        } else if self.rank[ra] > self.rank[rb] {
            self.parent[rb] = ra;
        } else {
            self.parent[rb] = ra;
            self.rank[ra] += 1;
        }
        true
    }
}

/// Partition `0..n` into connected components under `connects`.
///
/// Members keep input order within each component; components are ordered
/// by their smallest member, so the result is a deterministic function of
/// the input sequence.
pub fn components<F>(n: usize, connects: F) -> Vec<Vec<usize>>
where
    F: Fn(usize, usize) -> bool,
{
    let mut uf = UnionFind::new(n);
    for i in 0..n {
        for j in i + 1..n {
            if connects(i, j) {
                uf.union(i, j);
            }
        }
    }

    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut root_to_group: Vec<Option<usize>> = vec![None; n];
    for i in 0..n {
        let root = uf.find(i);
        match root_to_group[root] {
            Some(g) => groups[g].push(i),
            None => {
                root_to_group[root] = Some(groups.len());
                groups.push(vec![i]);
            }
        }
    }
    groups
}
