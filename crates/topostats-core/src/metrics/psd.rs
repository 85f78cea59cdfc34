//! Power-spectral density of profile bundles and areal maps.
//!
//! 1D:  C¹ᴰ(q_k) = Δ/n · |Σ_j w_j h_j e^{−2πijk/n}|²,   q_k = 2πk/(nΔ), k = 1…n/2
//! 2D:  C²ᴰ(q)   = ΔxΔy/(nx·ny) · |FFT₂(w·h)|²,          q = |(qx, qy)| ≠ 0
//!
//! Non-periodic data is tapered with a Hann window rescaled to unit mean
//! square, which keeps the total power of the estimate unchanged. Periodic
//! data is transformed as is.
//!
//! Estimates above half the Nyquist wavevector rest on fewer than four
//! samples per wavelength and are flagged unreliable.
use num_complex::Complex;
use rustfft::FftPlanner;

use super::profiles::UniformProfiles;
use super::RawCurve;
use crate::heightfield::AreaMap;

/// Largest wavevector resolved by at least four samples per wavelength.
fn reliable_cutoff(spacing: f64) -> f64 {
    std::f64::consts::PI / (2.0 * spacing)
}

/// Hann window of length `n`, scaled so that mean(w²) = 1.
fn hann_window(n: usize) -> Vec<f64> {
    if n < 2 {
        return vec![1.0; n];
    }
    let raw: Vec<f64> = (0..n)
        .map(|i| 0.5 * (1.0 - (2.0 * std::f64::consts::PI * i as f64 / (n - 1) as f64).cos()))
        .collect();
    let mean_sq = raw.iter().map(|w| w * w).sum::<f64>() / n as f64;
    let scale = 1.0 / mean_sq.sqrt();
    raw.into_iter().map(|w| w * scale).collect()
}

fn window(n: usize, periodic: bool) -> Vec<f64> {
    if periodic {
        vec![1.0; n]
    } else {
        hann_window(n)
    }
}

/// Signed FFT frequency index for bin `k` of an `n`-point transform.
#[inline]
fn signed_index(k: usize, n: usize) -> f64 {
    if k <= n / 2 {
        k as f64
    } else {
        k as f64 - n as f64
    }
}

/// Profile-averaged 1D PSD of a bundle.
pub fn profile_psd(bundle: &UniformProfiles) -> RawCurve {
    let n = bundle.len();
    let d = bundle.spacing;
    if n < 2 || bundle.lines.is_empty() {
        return RawCurve::default();
    }

    let w = window(n, bundle.periodic);
    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n);

    let n_freq = n / 2;
    let mut power = vec![0f64; n_freq];
    let mut buf: Vec<Complex<f64>> = vec![Complex::new(0.0, 0.0); n];
    for line in &bundle.lines {
        for (slot, (h, wi)) in buf.iter_mut().zip(line.iter().zip(&w)) {
            *slot = Complex::new(h * wi, 0.0);
        }
        fft.process(&mut buf);
        for k in 1..=n_freq {
            power[k - 1] += buf[k].norm_sqr();
        }
    }

    let norm = d / n as f64 / bundle.lines.len() as f64;
    let length = n as f64 * d;
    let q = (1..=n_freq)
        .map(|k| 2.0 * std::f64::consts::PI * k as f64 / length)
        .collect();
    let c = power.into_iter().map(|p| p * norm).collect();
    RawCurve::with_upper_cutoff(q, c, reliable_cutoff(d))
}

/// Full 2D PSD of an areal map, one sample per nonzero wavevector.
pub fn areal_psd(map: &AreaMap) -> RawCurve {
    let (nx, ny) = (map.nx, map.ny);
    let (px, py) = map.pixel_size();
    if nx < 2 || ny < 2 {
        return RawCurve::default();
    }

    let wx = window(nx, map.periodic);
    let wy = window(ny, map.periodic);
    let mut buf: Vec<Complex<f64>> = Vec::with_capacity(nx * ny);
    for ix in 0..nx {
        for iy in 0..ny {
            buf.push(Complex::new(map.get(ix, iy) * wx[ix] * wy[iy], 0.0));
        }
    }

    let mut planner = FftPlanner::<f64>::new();
    // Rows are contiguous along y; the buffer holds nx transforms of length ny.
    planner.plan_fft_forward(ny).process(&mut buf);
    let mut transposed: Vec<Complex<f64>> = Vec::with_capacity(nx * ny);
    for iy in 0..ny {
        for ix in 0..nx {
            transposed.push(buf[ix * ny + iy]);
        }
    }
    planner.plan_fft_forward(nx).process(&mut transposed);

    let norm = px * py / (nx * ny) as f64;
    let two_pi = 2.0 * std::f64::consts::PI;
    let mut q = Vec::with_capacity(nx * ny);
    let mut c = Vec::with_capacity(nx * ny);
    for iy in 0..ny {
        let qy = two_pi * signed_index(iy, ny) / map.sy;
        for ix in 0..nx {
            let qx = two_pi * signed_index(ix, nx) / map.sx;
            let qn = (qx * qx + qy * qy).sqrt();
            if qn == 0.0 {
                continue;
            }
            q.push(qn);
            c.push(transposed[iy * nx + ix].norm_sqr() * norm);
        }
    }
    RawCurve::with_upper_cutoff(q, c, reliable_cutoff(px.max(py)))
}
