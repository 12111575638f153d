use anyhow::{Context, Result};

/// Seeded SplitMix64 stream; the sample file is identical on every run.
struct SampleRng(u64);

impl SampleRng {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)`.
    fn unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Normal sample via the Marsaglia polar method.
    fn normal(&mut self, mean: f64, sd: f64) -> f64 {
        loop {
            let u = 2.0 * self.unit() - 1.0;
            let v = 2.0 * self.unit() - 1.0;
            let s = u * u + v * v;
            if s > 0.0 && s < 1.0 {
                return mean + sd * u * (-2.0 * s.ln() / s).sqrt();
            }
        }
    }

    fn chance(&mut self, p: f64) -> bool {
        self.unit() < p
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// Writes a small mixed-type table: integers, floats with gaps, categories,
/// booleans and free text.
fn main() -> Result<()> {
    let mut rng = SampleRng(42);

    let regions = ["North", "South", "East", "West"];
    let products = ["Widget", "Gadget", "Doohickey"];
    let rows = 200;

    let output_path = "sample_data.csv";
    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {output_path}"))?;
    writer.write_record(["order_id", "region", "product", "units", "unit_price", "discounted", "note"])?;

    for id in 0..rows {
        let region = rng.pick(&regions);
        let product = rng.pick(&products);
        let base_price = match product {
            "Widget" => 9.5,
            "Gadget" => 24.0,
            _ => 4.25,
        };
        let units = rng.normal(20.0, 6.0).round().max(1.0) as i64;
        // Roughly one price in twenty is missing.
        let price = if rng.chance(0.05) {
            String::new()
        } else {
            format!("{:.2}", (base_price + rng.normal(0.0, 1.5)).max(0.5))
        };
        let discounted = if rng.chance(0.3) { "True" } else { "False" };
        let note = if rng.chance(0.1) { "rush order" } else { "" };

        writer.write_record([
            id.to_string(),
            region.to_string(),
            product.to_string(),
            units.to_string(),
            price,
            discounted.to_string(),
            note.to_string(),
        ])?;
    }
    writer.flush().context("flushing CSV writer")?;

    println!("Wrote {rows} rows to {output_path}");
    Ok(())
}
