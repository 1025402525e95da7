use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

/// Write a handful of synthetic IR exports for trying out the merger.
#[derive(Parser, Debug)]
#[command(name = "generate_sample")]
struct Args {
    /// Output directory
    #[arg(default_value = "example")]
    out_dir: PathBuf,

    /// PRNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

fn generate_spectrum(
    wavenumbers: &[f64],
    peaks: &[(f64, f64, f64)],
    noise_level: f64,
    rng: &mut SimpleRng,
) -> Vec<f64> {
    wavenumbers
        .iter()
        .map(|&wn| {
            let signal: f64 = peaks
                .iter()
                .map(|&(mu, sigma, amp)| gaussian(wn, mu, sigma, amp))
                .sum();
            signal + rng.gauss(0.0, noise_level)
        })
        .collect()
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Render one export the way bench instruments do: a title and column
/// header, whitespace-separated pairs, then a footer.
fn render_export(name: &str, wavenumbers: &[f64], intensities: &[f64]) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "# {name}")?;
    writeln!(out, "Wavenumber\tAbsorbance")?;
    for (wn, y) in wavenumbers.iter().zip(intensities) {
        writeln!(out, "{wn}\t{y:.6}")?;
    }
    writeln!(out, "END")?;
    Ok(out)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);

    // Each sample covers a slightly different window, so merged rows at the
    // edges are sparse.
    let samples: [(&str, f64, f64, Vec<(f64, f64, f64)>); 3] = [
        (
            "Sample_A",
            4000.0,
            1000.0,
            vec![(3400.0, 80.0, 0.8), (2900.0, 40.0, 0.5), (2350.0, 30.0, 0.3)],
        ),
        (
            "Sample_B",
            3900.0,
            900.0,
            vec![(3200.0, 60.0, 0.6), (2800.0, 50.0, 0.7), (2500.0, 35.0, 0.4)],
        ),
        (
            "Sample C",
            4000.0,
            1200.0,
            vec![(3600.0, 70.0, 0.9), (3000.0, 45.0, 0.4), (2200.0, 25.0, 0.5)],
        ),
    ];

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;

    for (name, start, stop, peaks) in &samples {
        let n = ((start - stop) / 2.0) as usize + 1;
        let wavenumbers: Vec<f64> = (0..n).map(|i| start - i as f64 * 2.0).collect();
        let y = generate_spectrum(&wavenumbers, peaks, 0.005, &mut rng);

        let path = args.out_dir.join(format!("{name}.txt"));
        let text = render_export(name, &wavenumbers, &y)?;
        std::fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
        println!("Wrote {} points to {}", n, path.display());
    }

    Ok(())
}
