/// Linear axis with tick generation and data→pixel mapping.
#[derive(Debug, Clone)]
pub struct Axis {
    pub min: f64,
    pub max: f64,
    /// Label in mathtext notation (`p$_T$ [GeV]`).
    pub label: String,
    pub tick_positions: Vec<f64>,
    pub tick_labels: Vec<String>,
}

impl Axis {
    /// Limits widened outward to "nice" numbers, ticks on every step.
    pub fn auto_linear(data_min: f64, data_max: f64, target_ticks: usize) -> Self {
        let (nice_min, nice_max, step) = nice_range(data_min, data_max, target_ticks);
        let mut axis = Self::fixed(nice_min, nice_max);
        axis.fill_ticks(step);
        axis
    }

    /// Limits kept exactly at `[min, max]`; ticks at nice positions inside them.
    ///
    /// Histogram x axes use this so the outer bin edges meet the frame.
    pub fn bounded(min: f64, max: f64, target_ticks: usize) -> Self {
        let (lo, hi) = if (max - min).abs() < 1e-15 { (min - 0.5, max + 0.5) } else { (min, max) };
        let (_, _, step) = nice_range(lo, hi, target_ticks);
        let mut axis = Self::fixed(lo, hi);
        axis.fill_ticks(step);
        axis
    }

    /// Fixed axis with explicit limits and no ticks.
    pub fn fixed(min: f64, max: f64) -> Self {
        Self { min, max, label: String::new(), tick_positions: Vec::new(), tick_labels: Vec::new() }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    fn fill_ticks(&mut self, step: f64) {
        let first = (self.min / step - 1e-9).ceil() as i64;
        let last = (self.max / step + 1e-9).floor() as i64;
        for k in first..=last {
            let v = k as f64 * step;
            self.tick_positions.push(v);
            self.tick_labels.push(format_tick(v, step));
        }
    }

    /// Map a data value to pixel coordinate.
    pub fn data_to_pixel(&self, value: f64, px_min: f64, px_max: f64) -> f64 {
        let frac = (value - self.min) / (self.max - self.min);
        px_min + frac * (px_max - px_min)
    }
}

/// "Nice numbers" algorithm for pleasant tick spacing.
fn nice_range(data_min: f64, data_max: f64, target_ticks: usize) -> (f64, f64, f64) {
    if (data_max - data_min).abs() < 1e-15 {
        return (data_min - 1.0, data_max + 1.0, 1.0);
    }
    let range = data_max - data_min;
    let rough_step = range / (target_ticks.max(2) - 1) as f64;
    let step = nice_step(rough_step);
    let nice_min = (data_min / step).floor() * step;
    let nice_max = (data_max / step).ceil() * step;
    (nice_min, nice_max, step)
}

fn nice_step(rough: f64) -> f64 {
    let exp = rough.abs().log10().floor();
    let frac = rough / 10.0_f64.powf(exp);
    let nice_frac = if frac <= 1.5 {
        1.0
    } else if frac <= 3.5 {
        2.0
    } else if frac <= 7.5 {
        5.0
    } else {
        10.0
    };
    nice_frac * 10.0_f64.powf(exp)
}

fn format_tick(value: f64, step: f64) -> String {
    let decimals = if step >= 1.0 { 0 } else { (-step.log10().floor()) as usize };
    // Avoid "-0"
    let v = if value.abs() < step * 0.01 { 0.0 } else { value };
    if decimals == 0 {
        format!("{}", v.round() as i64)
    } else {
        format!("{:.prec$}", v, prec = decimals)
    }
}
