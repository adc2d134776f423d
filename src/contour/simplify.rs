//! Contour metrics and the two simplification strategies: convex hull and
//! Douglas-Peucker polygon approximation.

use imageproc::point::Point;

/// Closed-contour perimeter: sum of segment lengths including the closing
/// edge back to the first point.
pub fn perimeter(contour: &[Point<i32>]) -> f64 {
    if contour.len() < 2 {
        return 0.0;
    }
    contour
        .iter()
        .zip(contour.iter().cycle().skip(1))
        .take(contour.len())
        .map(|(a, b)| {
            let dx = (b.x - a.x) as f64;
            let dy = (b.y - a.y) as f64;
            (dx * dx + dy * dy).sqrt()
        })
        .sum()
}

/// Enclosed area by the shoelace formula.
pub fn area(contour: &[Point<i32>]) -> f64 {
    if contour.len() < 3 {
        return 0.0;
    }
    let mut doubled = 0i64;
    for i in 0..contour.len() {
        let a = contour[i];
        let b = contour[(i + 1) % contour.len()];
        doubled += a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64;
    }
    (doubled.abs() as f64) / 2.0
}

fn cross(o: Point<i32>, a: Point<i32>, b: Point<i32>) -> i64 {
    (a.x - o.x) as i64 * (b.y - o.y) as i64 - (a.y - o.y) as i64 * (b.x - o.x) as i64
}

/// Smallest convex polygon enclosing the points (monotone chain). Collinear
/// points are dropped, so a rectangle reduces to its four corners.
pub fn convex_hull(points: &[Point<i32>]) -> Vec<Point<i32>> {
    let mut sorted: Vec<Point<i32>> = points.to_vec();
    sorted.sort_by_key(|p| (p.x, p.y));
    sorted.dedup();
    if sorted.len() < 3 {
        return sorted;
    }

    let mut lower: Vec<Point<i32>> = Vec::new();
    for &p in &sorted {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0 {
            lower.pop();
        }
        lower.push(p);
    }

    let mut upper: Vec<Point<i32>> = Vec::new();
    for &p in sorted.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0 {
            upper.pop();
        }
        upper.push(p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Douglas-Peucker approximation of a closed contour. The contour is split
/// at the vertex farthest from the first point and each open chain is
/// simplified independently.
pub fn approx_polygon(contour: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    if contour.len() < 3 {
        return contour.to_vec();
    }

    let anchor = contour[0];
    let far = contour
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| {
            distance(anchor, **a)
                .partial_cmp(&distance(anchor, **b))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(i, _)| i)
        .unwrap_or(0);

    if far == 0 {
        return vec![anchor];
    }

    let mut second_half: Vec<Point<i32>> = contour[far..].to_vec();
    second_half.push(anchor);

    let mut result = douglas_peucker(&contour[..=far], epsilon);
    let tail = douglas_peucker(&second_half, epsilon);
    // Both chains share their endpoints; keep each vertex once
    result.extend(tail.into_iter().skip(1).take_while(|&p| p != anchor));
    result
}

fn distance(a: Point<i32>, b: Point<i32>) -> f64 {
    let dx = (b.x - a.x) as f64;
    let dy = (b.y - a.y) as f64;
    (dx * dx + dy * dy).sqrt()
}

fn perpendicular_distance(p: Point<i32>, a: Point<i32>, b: Point<i32>) -> f64 {
    if a == b {
        return distance(a, p);
    }
    let num = (cross(a, b, p)).abs() as f64;
    num / distance(a, b)
}

fn douglas_peucker(points: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let first = points[0];
    let last = points[points.len() - 1];

    let (index, max_dist) = points
        .iter()
        .enumerate()
        .skip(1)
        .take(points.len() - 2)
        .map(|(i, &p)| (i, perpendicular_distance(p, first, last)))
        .fold((0, 0.0), |acc, cur| if cur.1 > acc.1 { cur } else { acc });

    if max_dist <= epsilon {
        return vec![first, last];
    }

    let mut left = douglas_peucker(&points[..=index], epsilon);
    let right = douglas_peucker(&points[index..], epsilon);
    left.pop();
    left.extend(right);
    left
}
