//! Outer-boundary tracing (Moore neighborhood) over labelled components.

use crate::mask::label_components;
use image::GrayImage;
use imageproc::point::Point;
use ndarray::Array2;

/// Clockwise Moore neighborhood, starting due west.
const CLOCKWISE: [(i32, i32); 8] = [
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
];

/// One outer contour per connected component, each an ordered pixel ring.
pub(super) fn trace_components(mask: &GrayImage) -> Vec<Vec<Point<i32>>> {
    let map = label_components(mask);
    (1..=map.component_count() as u32)
        .filter_map(|label| trace_one(&map.labels, label))
        .collect()
}

fn label_at(labels: &Array2<u32>, p: (i32, i32)) -> u32 {
    let (height, width) = labels.dim();
    if p.0 < 0 || p.1 < 0 || p.0 >= width as i32 || p.1 >= height as i32 {
        return 0;
    }
    labels[(p.1 as usize, p.0 as usize)]
}

/// First pixel of the component in raster-scan order. Being topmost-leftmost,
/// its west neighbor is guaranteed to lie outside the component, which makes
/// it a valid starting backtrack cell.
fn first_pixel(labels: &Array2<u32>, label: u32) -> Option<(i32, i32)> {
    labels
        .indexed_iter()
        .find(|(_, &l)| l == label)
        .map(|((y, x), _)| (x as i32, y as i32))
}

fn trace_one(labels: &Array2<u32>, label: u32) -> Option<Vec<Point<i32>>> {
    let start = first_pixel(labels, label)?;
    let initial_backtrack = (start.0 - 1, start.1);

    let mut contour = vec![Point::new(start.0, start.1)];
    let mut current = start;
    let mut backtrack = initial_backtrack;

    let (height, width) = labels.dim();
    let max_steps = 4 * width * height;
    let mut steps = 0usize;

    loop {
        let rel = (backtrack.0 - current.0, backtrack.1 - current.1);
        let start_idx = CLOCKWISE.iter().position(|&o| o == rel).unwrap_or(0);

        let mut next = None;
        let mut last_empty = backtrack;
        for i in 1..=8 {
            let idx = (start_idx + i) % 8;
            let p = (current.0 + CLOCKWISE[idx].0, current.1 + CLOCKWISE[idx].1);
            if label_at(labels, p) == label {
                next = Some(p);
                break;
            }
            last_empty = p;
        }

        // Isolated single pixel: no boundary to walk
        let Some(p) = next else { break };

        backtrack = last_empty;
        current = p;
        steps += 1;

        // Jacob's stopping criterion: back at the start, entered the same way
        if (current == start && backtrack == initial_backtrack) || steps > max_steps {
            break;
        }
        contour.push(Point::new(current.0, current.1));
    }

    Some(contour)
}
