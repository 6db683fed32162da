use crate::analytics::CallInfo;
use crate::error::ClusterError;
use crate::models::{Centroid, LabeledPointSet};
use rstar::RTree;
use rstar::primitives::GeomWithData;
use std::collections::HashMap;

/// Disjoint-set forest over `0..n` with path compression
#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Root of `i`'s set
    pub fn find(&mut self, i: usize) -> usize {
        let mut root = i;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        // Point every node on the path straight at the root
        let mut current = i;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }

        root
    }

    /// Merge the sets of `i` and `j`, attaching `i`'s root under `j`'s
    pub fn union(&mut self, i: usize, j: usize) {
        let root_i = self.find(i);
        let root_j = self.find(j);
        if root_i != root_j {
            self.parent[root_i] = root_j;
        }
    }

    /// Members of every set, ordered by each set's first member
    pub fn groups(&mut self) -> Vec<Vec<usize>> {
        let mut slot_of_root: HashMap<usize, usize> = HashMap::new();
        let mut groups: Vec<Vec<usize>> = Vec::new();

        for i in 0..self.parent.len() {
            let root = self.find(i);
            let slot = *slot_of_root.entry(root).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[slot].push(i);
        }

        groups
    }
}

type IndexedPoint = GeomWithData<[f64; 2], usize>;

/// Single-linkage clustering of 2D points.
///
/// Two points share a cluster when a chain of neighbors, each no more than
/// `threshold` apart, connects them. Returns the mean of each cluster.
pub fn point_group(points: &[[f64; 2]], threshold: f64) -> Result<Vec<[f64; 2]>, ClusterError> {
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(ClusterError::InvalidThreshold(threshold));
    }
    if let Some(bad) = points
        .iter()
        .position(|p| !p[0].is_finite() || !p[1].is_finite())
    {
        return Err(ClusterError::NonFinitePoint(bad));
    }
    if points.is_empty() {
        return Ok(Vec::new());
    }

    let tree: RTree<IndexedPoint> = RTree::bulk_load(
        points
            .iter()
            .enumerate()
            .map(|(i, p)| IndexedPoint::new(*p, i))
            .collect(),
    );

    let mut uf = UnionFind::new(points.len());
    let radius_2 = threshold * threshold;

    for (i, point) in points.iter().enumerate() {
        for neighbor in tree.locate_within_distance(*point, radius_2) {
            uf.union(i, neighbor.data);
        }
    }

    let clusters = uf
        .groups()
        .into_iter()
        .map(|members| {
            let n = members.len() as f64;
            let (sx, sy) = members
                .iter()
                .fold((0.0, 0.0), |(sx, sy), &i| (sx + points[i][0], sy + points[i][1]));
            [sx / n, sy / n]
        })
        .collect();

    Ok(clusters)
}

/// Usage-log description of a clustering call
pub fn point_group_call() -> CallInfo {
    CallInfo::new("point_group", module_path!())
        .with_parameter::<[[f64; 2]]>("points")
        .with_parameter::<f64>("threshold")
}

/// Cluster one label's pixels into centroids
pub fn cluster_points(
    set: &LabeledPointSet,
    threshold: f64,
) -> Result<Vec<Centroid>, ClusterError> {
    let points: Vec<[f64; 2]> = set.points.iter().map(|p| p.as_point()).collect();
    let grouped = point_group(&points, threshold)?;
    Ok(grouped.into_iter().map(Centroid::from).collect())
}
