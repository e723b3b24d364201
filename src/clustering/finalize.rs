// Reduce a cluster to one text block

use std::cmp::Ordering;

use super::builder::Cluster;
use super::rectangle::Rectangle;
use crate::core::types::{BlockBox, TextBlock};

/// Rectangles whose tops differ by less than this are read as one row
pub const SAME_ROW_TOLERANCE: f64 = 15.0;

/// Merge a cluster into a text block: members in reading order joined by a
/// single space, box is the union of member extents.
pub fn finalize_cluster(cluster: &Cluster<'_>) -> TextBlock {
    if let [only] = cluster.members.as_slice() {
        return TextBlock::new(
            only.source_text.clone(),
            BlockBox {
                x: only.left,
                y: only.top,
                w: only.width,
                h: only.height,
            },
        );
    }

    let mut members = cluster.members.clone();
    sort_reading_order(&mut members);

    let text = members
        .iter()
        .map(|r| r.source_text.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    let left = members.iter().map(|r| r.left).fold(f64::INFINITY, f64::min);
    let top = members.iter().map(|r| r.top).fold(f64::INFINITY, f64::min);
    let right = members.iter().map(|r| r.right).fold(f64::NEG_INFINITY, f64::max);
    let bottom = members.iter().map(|r| r.bottom).fold(f64::NEG_INFINITY, f64::max);

    TextBlock::new(
        text,
        BlockBox {
            x: left,
            y: top,
            w: right - left,
            h: bottom - top,
        },
    )
}

fn reading_order(a: &Rectangle, b: &Rectangle) -> Ordering {
    if (a.top - b.top).abs() < SAME_ROW_TOLERANCE {
        a.left.total_cmp(&b.left)
    } else {
        a.top.total_cmp(&b.top)
    }
}

/// Stable insertion sort. The row tolerance makes `reading_order`
/// non-transitive, which `slice::sort_by` is allowed to reject.
fn sort_reading_order(members: &mut [&Rectangle]) {
    for i in 1..members.len() {
        let mut j = i;
        while j > 0 && reading_order(members[j - 1], members[j]) == Ordering::Greater {
            members.swap(j - 1, j);
            j -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clustering::builder::build_clusters;

    fn rect(index: usize, text: &str, left: f64, top: f64, width: f64, height: f64) -> Rectangle {
        Rectangle::new(index, text, left, top, width, height)
    }

    #[test]
    fn test_single_member_passthrough() {
        let r = rect(0, "ALONE", 12.5, 30.0, 44.0, 18.0);
        let cluster = Cluster { members: vec![&r] };
        let block = finalize_cluster(&cluster);

        assert_eq!(block.original_text, "ALONE");
        assert_eq!(block.bbox, BlockBox { x: 12.5, y: 30.0, w: 44.0, h: 18.0 });
        assert!(block.translated_text.is_none());
    }

    #[test]
    fn test_reading_order_and_union_box() {
        // Input order is scrambled; same-row pair sorts left-to-right
        let a = rect(0, "world", 60.0, 3.0, 40.0, 20.0);
        let b = rect(1, "again", 0.0, 40.0, 50.0, 20.0);
        let c = rect(2, "hello", 0.0, 0.0, 50.0, 20.0);
        let cluster = Cluster { members: vec![&a, &b, &c] };
        let block = finalize_cluster(&cluster);

        assert_eq!(block.original_text, "hello world again");
        assert_eq!(block.bbox, BlockBox { x: 0.0, y: 0.0, w: 100.0, h: 60.0 });
    }

    #[test]
    fn test_finalize_built_clusters() {
        let rects = vec![
            rect(0, "WHAT", 0.0, 0.0, 50.0, 20.0),
            rect(1, "IS THIS", 0.0, 25.0, 50.0, 20.0),
            rect(2, "BANG", 200.0, 0.0, 50.0, 20.0),
        ];
        let blocks: Vec<_> = build_clusters(&rects).iter().map(finalize_cluster).collect();

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].original_text, "WHAT IS THIS");
        assert_eq!(blocks[0].bbox, BlockBox { x: 0.0, y: 0.0, w: 50.0, h: 45.0 });
        assert_eq!(blocks[1].original_text, "BANG");
    }

    #[test]
    fn test_non_transitive_rows_do_not_panic() {
        // Tops 0, 10, 20: 0~10 and 10~20 are same-row, 0 and 20 are not
        let rects: Vec<_> = [(90.0, 0.0), (0.0, 10.0), (50.0, 20.0), (10.0, 5.0), (70.0, 14.0)]
            .iter()
            .enumerate()
            .map(|(i, (x, y))| rect(i, &format!("w{}", i), *x, *y, 5.0, 5.0))
            .collect();
        let cluster = Cluster { members: rects.iter().collect() };
        let block = finalize_cluster(&cluster);
        assert_eq!(block.original_text.split(' ').count(), 5);
    }
}
