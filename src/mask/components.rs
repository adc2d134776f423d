//! Connected-component labelling of binary masks (8-connectivity).

use image::{GrayImage, Luma};
use ndarray::Array2;

/// Label matrix plus per-label pixel counts. Label 0 is background and
/// `sizes[0]` holds the background pixel count.
pub struct ComponentMap {
    pub labels: Array2<u32>,
    pub sizes: Vec<u64>,
}

impl ComponentMap {
    /// Number of foreground components (background excluded).
    pub fn component_count(&self) -> usize {
        self.sizes.len().saturating_sub(1)
    }

    /// Labels of foreground components ordered by pixel count descending.
    /// Ties break on the lower label, which makes the ordering deterministic.
    pub fn labels_by_size(&self) -> Vec<u32> {
        let mut ranked: Vec<u32> = (1..self.sizes.len() as u32).collect();
        ranked.sort_by_key(|&label| (std::cmp::Reverse(self.sizes[label as usize]), label));
        ranked
    }

    /// Binary mask containing only the pixels of one label.
    pub fn extract(&self, label: u32) -> GrayImage {
        let (height, width) = self.labels.dim();
        let mut mask = GrayImage::new(width as u32, height as u32);
        for ((y, x), &l) in self.labels.indexed_iter() {
            if l == label {
                mask.put_pixel(x as u32, y as u32, Luma([255]));
            }
        }
        mask
    }
}

const NEIGHBORS_8: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Label the 8-connected components of a binary mask. Components are
/// numbered from 1 in raster-scan order of their first pixel.
pub fn label_components(mask: &GrayImage) -> ComponentMap {
    let (width, height) = mask.dimensions();
    let mut labels = Array2::<u32>::zeros((height as usize, width as usize));
    let mut sizes: Vec<u64> = vec![0];
    let mut queue = std::collections::VecDeque::new();

    for y in 0..height {
        for x in 0..width {
            if mask.get_pixel(x, y)[0] != 255 || labels[(y as usize, x as usize)] != 0 {
                continue;
            }

            let label = sizes.len() as u32;
            let mut size = 0u64;
            labels[(y as usize, x as usize)] = label;
            queue.push_back((x as i64, y as i64));

            while let Some((cx, cy)) = queue.pop_front() {
                size += 1;
                for (dx, dy) in NEIGHBORS_8 {
                    let nx = cx + dx;
                    let ny = cy + dy;
                    if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                        continue;
                    }
                    if mask.get_pixel(nx as u32, ny as u32)[0] == 255
                        && labels[(ny as usize, nx as usize)] == 0
                    {
                        labels[(ny as usize, nx as usize)] = label;
                        queue.push_back((nx, ny));
                    }
                }
            }

            sizes.push(size);
        }
    }

    // Background pixel count
    sizes[0] = (width as u64 * height as u64) - sizes[1..].iter().sum::<u64>();

    ComponentMap { labels, sizes }
}
