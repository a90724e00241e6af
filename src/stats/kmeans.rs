//! # K-Means (1-D)
//!
//! $$
//! \min_{c_1,\dots,c_k}\sum_{i=1}^{n}\min_j (x_i-c_j)^2
//! $$
//!
//! Seeded k-means for scalar series: k-means++ restarts refined by Lloyd
//! iterations, with an optional warm start from a `k - 1` solution.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;

use crate::error::QuantError;
use crate::error::Result;
use crate::traits::stream_seed;

/// Result of a k-means fit.
#[derive(Clone, Debug, PartialEq)]
pub struct KMeansFit {
  /// Cluster centers, indexed by label.
  pub centers: Vec<f64>,
  /// Label of each input point.
  pub labels: Vec<usize>,
  /// Sum of squared distances from each point to its center.
  pub inertia: f64,
  /// Lloyd iterations performed.
  pub n_iter: usize,
}

impl KMeansFit {
  pub fn n_clusters(&self) -> usize {
    self.centers.len()
  }

  /// Centers in ascending order.
  pub fn sorted_centers(&self) -> Vec<f64> {
    let mut c = self.centers.clone();
    c.sort_by(f64::total_cmp);
    c
  }
}

/// Deterministic 1-D k-means.
#[derive(Clone, Debug)]
pub struct KMeans {
  n_clusters: usize,
  n_init: usize,
  max_iter: usize,
  seed: u64,
}

impl KMeans {
  pub fn new(n_clusters: usize) -> Self {
    Self {
      n_clusters,
      n_init: 10,
      max_iter: 300,
      seed: 0,
    }
  }

  pub fn n_init(mut self, n_init: usize) -> Self {
    self.n_init = n_init.max(1);
    self
  }

  pub fn max_iter(mut self, max_iter: usize) -> Self {
    self.max_iter = max_iter.max(1);
    self
  }

  pub fn seed(mut self, seed: u64) -> Self {
    self.seed = seed;
    self
  }

  pub fn fit(&self, data: &[f64]) -> Result<KMeansFit> {
    self.fit_warm(data, None)
  }

  /// Fit, additionally trying a start from `previous` (a fit with one cluster
  /// fewer) plus the worst-served point. That candidate cannot end with more
  /// inertia than `previous`, so successive fits never get worse.
  pub fn fit_warm(&self, data: &[f64], previous: Option<&KMeansFit>) -> Result<KMeansFit> {
    let k = self.n_clusters;
    if k == 0 {
      return Err(QuantError::InvalidConfig(
        "k-means needs at least one cluster".into(),
      ));
    }
    if data.len() < k {
      return Err(QuantError::InsufficientData {
        instrument: "k-means input".into(),
        observations: data.len(),
        required: k,
      });
    }

    let mut candidates: Vec<KMeansFit> = (0..self.n_init)
      .into_par_iter()
      .map(|run| {
        let mut rng = StdRng::seed_from_u64(stream_seed(self.seed, run as u64));
        self.lloyd(data, plus_plus_init(data, k, &mut rng))
      })
      .collect();

    if let Some(prev) = previous.filter(|p| p.n_clusters() + 1 == k) {
      let mut init = prev.centers.clone();
      init.push(worst_point(data, prev));
      candidates.push(self.lloyd(data, init));
    }

    candidates
      .into_iter()
      .min_by(|a, b| a.inertia.total_cmp(&b.inertia))
      .ok_or_else(|| QuantError::InvalidConfig("k-means produced no candidate".into()))
  }

  fn lloyd(&self, data: &[f64], mut centers: Vec<f64>) -> KMeansFit {
    let mut labels = assign(data, &centers);
    let mut n_iter = 0;

    while n_iter < self.max_iter {
      n_iter += 1;
      update_centers(data, &labels, &mut centers);
      let next = assign(data, &centers);
      if next == labels {
        break;
      }
      labels = next;
    }

    let inertia = inertia(data, &centers, &labels);
    KMeansFit {
      centers,
      labels,
      inertia,
      n_iter,
    }
  }
}

/// k-means++ seeding: each new center is drawn with probability proportional
/// to the squared distance to the nearest chosen center.
fn plus_plus_init<R: Rng + ?Sized>(data: &[f64], k: usize, rng: &mut R) -> Vec<f64> {
  let mut centers = Vec::with_capacity(k);
  let first = data[rng.random_range(0..data.len())];
  centers.push(first);
  let mut dist: Vec<f64> = data.iter().map(|x| (x - first).powi(2)).collect();

  while centers.len() < k {
    let total: f64 = dist.iter().sum();
    let idx = if total > 0.0 {
      let threshold = rng.random::<f64>() * total;
      let mut cumsum = 0.0;
      let mut chosen = None;
      for (i, &d) in dist.iter().enumerate() {
        cumsum += d;
        if d > 0.0 && cumsum >= threshold {
          chosen = Some(i);
          break;
        }
      }
      chosen.unwrap_or_else(|| dist.iter().rposition(|&d| d > 0.0).unwrap_or(0))
    } else {
      rng.random_range(0..data.len())
    };

    let c = data[idx];
    centers.push(c);
    for (d, x) in dist.iter_mut().zip(data) {
      *d = d.min((x - c).powi(2));
    }
  }

  centers
}

fn assign(data: &[f64], centers: &[f64]) -> Vec<usize> {
  data
    .iter()
    .map(|x| {
      let mut best = 0;
      let mut best_d = f64::INFINITY;
      for (j, c) in centers.iter().enumerate() {
        let d = (x - c).powi(2);
        if d < best_d {
          best_d = d;
          best = j;
        }
      }
      best
    })
    .collect()
}

// Empty clusters keep their previous center.
fn update_centers(data: &[f64], labels: &[usize], centers: &mut [f64]) {
  let mut sums = vec![0.0; centers.len()];
  let mut counts = vec![0usize; centers.len()];
  for (x, &l) in data.iter().zip(labels) {
    sums[l] += x;
    counts[l] += 1;
  }
  for (j, c) in centers.iter_mut().enumerate() {
    if counts[j] > 0 {
      *c = sums[j] / counts[j] as f64;
    }
  }
}

fn inertia(data: &[f64], centers: &[f64], labels: &[usize]) -> f64 {
  data
    .iter()
    .zip(labels)
    .map(|(x, &l)| (x - centers[l]).powi(2))
    .sum()
}

fn worst_point(data: &[f64], fit: &KMeansFit) -> f64 {
  data
    .iter()
    .zip(&fit.labels)
    .max_by(|(a, la), (b, lb)| {
      (*a - fit.centers[**la])
        .powi(2)
        .total_cmp(&(*b - fit.centers[**lb]).powi(2))
    })
    .map(|(x, _)| *x)
    .unwrap_or(0.0)
}
