//! Exact Euclidean distance transform of pore space
//!
//! Separable lower-envelope-of-parabolas transform (Felzenszwalb & Huttenlocher)
//! applied along each axis in turn. Voxels outside the array are not treated as
//! background, so a volume without any solid voxel maps to infinite distances.

use ndarray::{Array3, ArrayView3, Axis};

/// Distance in voxels from every pore voxel to the nearest background voxel
///
/// Background voxels map to zero.
pub fn distance_transform(pores: ArrayView3<'_, u8>) -> Array3<f64> {
    let mut squared = pores.mapv(|v| if v == 0 { 0.0 } else { f64::INFINITY });

    let mut line = Vec::new();
    let mut output = Vec::new();
    let mut envelope = LowerEnvelope::default();

    for axis in 0..3 {
        for mut lane in squared.lanes_mut(Axis(axis)) {
            line.clear();
            line.extend(lane.iter().copied());
            envelope.transform(&line, &mut output);
            for (value, &distance) in lane.iter_mut().zip(&output) {
                *value = distance;
            }
        }
    }

    squared.mapv_into(f64::sqrt)
}

#[derive(Debug, Default)]
struct LowerEnvelope {
    // Positions of the parabolas forming the lower envelope
    sites: Vec<usize>,
    // Left boundary of each parabola's interval; one extra trailing +inf
    boundaries: Vec<f64>,
}

impl LowerEnvelope {
    fn transform(&mut self, f: &[f64], output: &mut Vec<f64>) {
        self.sites.clear();
        self.boundaries.clear();
        output.clear();

        for (q, &fq) in f.iter().enumerate() {
            if !fq.is_finite() {
                continue;
            }
            loop {
                let Some(&p) = self.sites.last() else {
                    self.sites.push(q);
                    self.boundaries.push(f64::NEG_INFINITY);
                    break;
                };
                let fp = f.get(p).copied().unwrap_or(f64::INFINITY);
                let s = intersection(p, fp, q, fq);
                if s <= self.boundaries.last().copied().unwrap_or(f64::NEG_INFINITY) {
                    self.sites.pop();
                    self.boundaries.pop();
                } else {
                    self.sites.push(q);
                    self.boundaries.push(s);
                    break;
                }
            }
        }

        if self.sites.is_empty() {
            output.resize(f.len(), f64::INFINITY);
            return;
        }
        self.boundaries.push(f64::INFINITY);

        let mut k = 0;
        for q in 0..f.len() {
            let position = q as f64;
            while self
                .boundaries
                .get(k + 1)
                .is_some_and(|&boundary| boundary < position)
            {
                k += 1;
            }
            let site = self.sites.get(k).copied().unwrap_or(q);
            let offset = q.abs_diff(site) as f64;
            let base = f.get(site).copied().unwrap_or(f64::INFINITY);
            output.push(offset.mul_add(offset, base));
        }
    }
}

// Position where the parabolas rooted at p and q intersect
fn intersection(p: usize, fp: f64, q: usize, fq: f64) -> f64 {
    let (p, q) = (p as f64, q as f64);
    (q.mul_add(q, fq) - p.mul_add(p, fp)) / (2.0 * (q - p))
}
