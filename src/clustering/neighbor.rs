// Adjacency test between two line rectangles

use super::rectangle::Rectangle;

/// Max vertical gap, as a multiple of the smaller height
const VERTICAL_GAP_FACTOR: f64 = 1.5;
/// Max horizontal gap, as a multiple of the smaller width
const HORIZONTAL_GAP_FACTOR: f64 = 2.0;
/// Allowed misalignment, as a fraction of the smaller extent
const ALIGNMENT_SLACK: f64 = 0.8;

/// Whether two rectangles belong to the same visual text block.
///
/// Stacked lines need a small vertical gap and overlapping columns; fragments
/// on one row need a small horizontal gap and overlapping rows. Symmetric in
/// its arguments.
pub fn is_neighbor(a: &Rectangle, b: &Rectangle) -> bool {
    let x_gap = 0f64.max(a.left - b.right).max(b.left - a.right);
    let y_gap = 0f64.max(a.top - b.bottom).max(b.top - a.bottom);
    let ref_width = a.width.min(b.width);
    let ref_height = a.height.min(b.height);

    let close_vertically = y_gap < ref_height * VERTICAL_GAP_FACTOR;
    let close_horizontally = x_gap < ref_width * HORIZONTAL_GAP_FACTOR;

    let x_overlap = a.right.min(b.right) - a.left.max(b.left);
    let y_overlap = a.bottom.min(b.bottom) - a.top.max(b.top);

    let aligned_vertically = x_overlap > -(ref_width * ALIGNMENT_SLACK);
    let aligned_horizontally = y_overlap > -(ref_height * ALIGNMENT_SLACK);

    (close_vertically && aligned_vertically) || (close_horizontally && aligned_horizontally)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(index: usize, left: f64, top: f64, width: f64, height: f64) -> Rectangle {
        Rectangle::new(index, format!("r{}", index), left, top, width, height)
    }

    #[test]
    fn test_stacked_lines_are_neighbors() {
        let a = rect(0, 0.0, 0.0, 50.0, 20.0);
        let b = rect(1, 0.0, 25.0, 50.0, 20.0);
        assert!(is_neighbor(&a, &b));
    }

    #[test]
    fn test_distant_column_is_not_neighbor() {
        let a = rect(0, 0.0, 0.0, 50.0, 20.0);
        let c = rect(2, 200.0, 0.0, 50.0, 20.0);
        assert!(!is_neighbor(&a, &c));
    }

    #[test]
    fn test_touching_with_full_overlap() {
        // Zero vertical gap, identical columns
        let a = rect(0, 10.0, 0.0, 40.0, 10.0);
        let b = rect(1, 10.0, 10.0, 40.0, 10.0);
        assert!(is_neighbor(&a, &b));

        // Zero horizontal gap, identical rows
        let c = rect(2, 50.0, 0.0, 40.0, 10.0);
        assert!(is_neighbor(&a, &c));
    }

    #[test]
    fn test_far_apart_on_both_axes() {
        let a = rect(0, 0.0, 0.0, 30.0, 10.0);
        let b = rect(1, 1000.0, 1000.0, 30.0, 10.0);
        assert!(!is_neighbor(&a, &b));
    }

    #[test]
    fn test_same_row_fragments_join() {
        // Gap of 60 < 2.0 * 40
        let a = rect(0, 0.0, 100.0, 40.0, 18.0);
        let b = rect(1, 100.0, 104.0, 40.0, 18.0);
        assert!(is_neighbor(&a, &b));
    }

    #[test]
    fn test_stacked_but_offset_columns_do_not_join() {
        // Close vertically, but columns miss each other by more than 0.8 * width
        let a = rect(0, 0.0, 0.0, 20.0, 20.0);
        let b = rect(1, 60.0, 25.0, 20.0, 20.0);
        assert!(!is_neighbor(&a, &b));
    }

    #[test]
    fn test_symmetry_over_grid() {
        let mut rects = Vec::new();
        for (i, (x, y, w, h)) in [
            (0.0, 0.0, 50.0, 20.0),
            (0.0, 25.0, 50.0, 20.0),
            (200.0, 0.0, 50.0, 20.0),
            (60.0, 5.0, 10.0, 40.0),
            (30.0, 70.0, 120.0, 12.0),
            (500.0, 500.0, 5.0, 5.0),
            (-20.0, 10.0, 15.0, 0.0),
        ]
        .into_iter()
        .enumerate()
        {
            rects.push(rect(i, x, y, w, h));
        }

        for a in &rects {
            for b in &rects {
                assert_eq!(is_neighbor(a, b), is_neighbor(b, a), "{} vs {}", a.index, b.index);
            }
        }
    }
}
