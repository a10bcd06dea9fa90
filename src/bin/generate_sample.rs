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

    /// Uniform integer in `[0, bound)`.
    fn below(&mut self, bound: u64) -> u64 {
        self.next_u64() % bound
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len() as u64) as usize]
    }
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let regions: [(&str, &[&str]); 4] = [
        ("천안시", &["신부동", "두정동", "성정동"]),
        ("아산시", &["온양동", "배방읍"]),
        ("홍성군", &["홍성읍", "광천읍"]),
        ("보령시", &["대천동"]),
    ];
    let levels = ["유치원", "초등학교", "중학교", "고등학교"];
    let founders = ["공립", "사립"];

    // Rough students-per-class spans per level, smallest tier first.
    let class_sizes = [15u64, 25, 28, 27];

    let output_path = "sample_data.csv";
    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {output_path}"))?;
    writer.write_record([
        "학교명",
        "학교급",
        "설립별",
        "시군명",
        "읍면동",
        "학생수",
        "학급수",
        "신설휴원",
        "연도",
    ])?;

    let mut rows = 0usize;
    for (region, subregions) in regions {
        for i in 0..60 {
            let level_idx = rng.below(levels.len() as u64) as usize;
            let level = levels[level_idx];
            let subregion = rng.pick(subregions);
            let founder = rng.pick(&founders);

            let classes = 2 + rng.below(30);
            let students = classes * class_sizes[level_idx] + rng.below(20);

            let status = match rng.below(20) {
                0 => "신설",
                1 => "휴원",
                _ => "",
            };
            // A few rows with unusable counts, to exercise lenient coercion.
            let students_cell = if rng.below(40) == 0 {
                "-".to_string()
            } else {
                students.to_string()
            };

            let name = format!("{region}{level}{i:02}");
            let classes_cell = classes.to_string();
            writer.write_record([
                name.as_str(),
                level,
                founder,
                region,
                subregion,
                students_cell.as_str(),
                classes_cell.as_str(),
                status,
                "2024",
            ])?;
            rows += 1;
        }
    }

    writer.flush()?;
    println!("Wrote {rows} institutions to {output_path}");
    Ok(())
}
