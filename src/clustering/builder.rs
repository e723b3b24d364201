// Connected components over line rectangles

use std::collections::VecDeque;

use super::neighbor::is_neighbor;
use super::rectangle::Rectangle;

/// Rectangles reachable from one seed under the neighbor relation
#[derive(Debug, Clone)]
pub struct Cluster<'a> {
    pub members: Vec<&'a Rectangle>,
}

impl<'a> Cluster<'a> {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Partition rectangles into clusters by breadth-first traversal.
///
/// Seeds are taken in input order and rectangles are marked visited when
/// enqueued, so every rectangle lands in exactly one cluster and the result
/// is identical across runs for the same input.
pub fn build_clusters(rects: &[Rectangle]) -> Vec<Cluster<'_>> {
    build_clusters_with(rects, is_neighbor)
}

/// Same traversal with a caller-provided adjacency test
pub fn build_clusters_with<F>(rects: &[Rectangle], adjacent: F) -> Vec<Cluster<'_>>
where
    F: Fn(&Rectangle, &Rectangle) -> bool,
{
    let mut visited = vec![false; rects.len()];
    let mut clusters = Vec::new();
    let mut queue = VecDeque::new();

    for seed in 0..rects.len() {
        if visited[seed] {
            continue;
        }

        visited[seed] = true;
        queue.push_back(seed);
        let mut members = Vec::new();

        while let Some(current) = queue.pop_front() {
            members.push(&rects[current]);

            for (candidate, seen) in visited.iter_mut().enumerate() {
                if !*seen && adjacent(&rects[current], &rects[candidate]) {
                    *seen = true;
                    queue.push_back(candidate);
                }
            }
        }

        clusters.push(Cluster { members });
    }

    clusters
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(index: usize, left: f64, top: f64, width: f64, height: f64) -> Rectangle {
        Rectangle::new(index, format!("r{}", index), left, top, width, height)
    }

    fn indices(clusters: &[Cluster<'_>]) -> Vec<Vec<usize>> {
        clusters
            .iter()
            .map(|c| c.members.iter().map(|r| r.index).collect())
            .collect()
    }

    #[test]
    fn test_two_stacked_and_one_apart() {
        let rects = vec![
            rect(0, 0.0, 0.0, 50.0, 20.0),
            rect(1, 0.0, 25.0, 50.0, 20.0),
            rect(2, 200.0, 0.0, 50.0, 20.0),
        ];
        let clusters = build_clusters(&rects);
        assert_eq!(indices(&clusters), vec![vec![0, 1], vec![2]]);
    }

    #[test]
    fn test_transitive_chain_forms_one_cluster() {
        // 0-1 and 1-2 are neighbors, 0-2 are not
        let rects = vec![
            rect(0, 0.0, 0.0, 50.0, 20.0),
            rect(1, 0.0, 30.0, 50.0, 20.0),
            rect(2, 0.0, 60.0, 50.0, 20.0),
        ];
        assert!(!is_neighbor(&rects[0], &rects[2]));
        let clusters = build_clusters(&rects);
        assert_eq!(indices(&clusters), vec![vec![0, 1, 2]]);
    }

    #[test]
    fn test_partition_has_no_duplicates() {
        // Dense grid where many queued rectangles share neighbors
        let mut rects = Vec::new();
        for row in 0..4 {
            for col in 0..4 {
                let index = rects.len();
                rects.push(rect(index, col as f64 * 55.0, row as f64 * 22.0, 50.0, 20.0));
            }
        }
        rects.push(rect(16, 2000.0, 2000.0, 50.0, 20.0));

        let clusters = build_clusters(&rects);
        let mut seen: Vec<usize> = clusters
            .iter()
            .flat_map(|c| c.members.iter().map(|r| r.index))
            .collect();
        assert_eq!(seen.len(), rects.len());
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), rects.len());
        assert!(clusters.iter().all(|c| !c.is_empty()));
        assert_eq!(clusters.len(), 2);
    }

    #[test]
    fn test_emission_order_is_deterministic() {
        let rects = vec![
            rect(0, 300.0, 0.0, 40.0, 20.0),
            rect(1, 0.0, 0.0, 40.0, 20.0),
            rect(2, 300.0, 24.0, 40.0, 20.0),
            rect(3, 0.0, 24.0, 40.0, 20.0),
        ];
        let first = indices(&build_clusters(&rects));
        for _ in 0..10 {
            assert_eq!(indices(&build_clusters(&rects)), first);
        }
        assert_eq!(first, vec![vec![0, 2], vec![1, 3]]);
    }

    #[test]
    fn test_custom_adjacency_and_empty_input() {
        let rects = vec![rect(0, 0.0, 0.0, 1.0, 1.0), rect(1, 0.0, 0.0, 1.0, 1.0)];
        let isolated = build_clusters_with(&rects, |_, _| false);
        assert_eq!(indices(&isolated), vec![vec![0], vec![1]]);
        assert!(build_clusters(&[]).is_empty());
    }
}
