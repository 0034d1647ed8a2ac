use anyhow::{Context, Result};

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

fn main() -> Result<()> {
    env_logger::init();

    let mut rng = SimpleRng::new(42);

    // Three weather stations, one reading per day for a month. Temperature
    // follows a seasonal swing, humidity runs against it, pressure is
    // independent noise; good material for every plot kind.
    let stations = [("North", 8.0, 78.0), ("Center", 14.0, 65.0), ("South", 21.0, 55.0)];
    let days = 30;

    let output_path = "sample_data.csv";
    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {output_path}"))?;
    writer
        .write_record(["station", "day", "temperature", "humidity", "pressure"])
        .context("writing CSV header")?;

    let mut rows = 0usize;
    for (station, temp_base, humidity_base) in stations {
        for day in 0..days {
            let swing = (day as f64 / days as f64 * std::f64::consts::TAU).sin();
            let temperature = temp_base + 6.0 * swing + rng.gauss(0.0, 1.2);
            let humidity = (humidity_base - 0.9 * (temperature - temp_base) * 4.0
                + rng.gauss(0.0, 3.0))
            .clamp(0.0, 100.0);
            let pressure = rng.gauss(1013.0, 5.0);

            writer
                .write_record([
                    station.to_string(),
                    day.to_string(),
                    format!("{temperature:.2}"),
                    format!("{humidity:.2}"),
                    format!("{pressure:.2}"),
                ])
                .with_context(|| format!("writing row {rows}"))?;
            rows += 1;
        }
    }
    writer.flush().context("flushing CSV")?;

    println!("Wrote {rows} readings from {} stations to {output_path}", stations.len());
    Ok(())
}
