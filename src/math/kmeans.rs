use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

#[derive(Debug, Clone)]
pub struct Clustering {
    pub centers: Vec<f64>,
    pub counts: Vec<usize>,
    pub assignments: Vec<usize>,
}

// clusters that lose every member are reseeded from a random point
pub fn cluster(values: &[f64], k: usize, max_iterations: usize, seed: u64) -> Clustering {
    let k = k.min(values.len());
    if k == 0 {
        return Clustering {
            centers: Vec::new(),
            counts: Vec::new(),
            assignments: Vec::new(),
        };
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut centers: Vec<f64> = values.choose_multiple(&mut rng, k).copied().collect();
    let mut assignments = vec![0usize; values.len()];
    for _ in 0..max_iterations {
        let mut moved = false;
        for (i, &v) in values.iter().enumerate() {
            let nearest = nearest_center(&centers, v);
            if assignments[i] != nearest {
                assignments[i] = nearest;
                moved = true;
            }
        }
        let mut sums = vec![0.0; k];
        let mut counts = vec![0usize; k];
        for (i, &v) in values.iter().enumerate() {
            sums[assignments[i]] += v;
            counts[assignments[i]] += 1;
        }
        for c in 0..k {
            if counts[c] == 0 {
                if let Some(&v) = values.choose(&mut rng) {
                    centers[c] = v;
                }
            } else {
                centers[c] = sums[c] / counts[c] as f64;
            }
        }
        if !moved {
            break;
        }
    }
    let mut counts = vec![0usize; k];
    for &a in &assignments {
        counts[a] += 1;
    }
    Clustering {
        centers,
        counts,
        assignments,
    }
}

fn nearest_center(centers: &[f64], v: f64) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (c, &center) in centers.iter().enumerate() {
        let dist = (v - center).abs();
        if dist < best_dist {
            best_dist = dist;
            best = c;
        }
    }
    best
}
