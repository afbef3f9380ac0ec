use std::{fmt, time::Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementUnit {
    GigabytesPerSecond,
}

/// Whether samples come from device events or host wall-clock timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementType {
    Cpu,
    Gpu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasurementFields {
    pub unit: MeasurementUnit,
    pub kind: MeasurementType,
}

impl MeasurementFields {
    pub fn new(unit: MeasurementUnit, kind: MeasurementType) -> Self {
        Self { unit, kind }
    }
}

impl fmt::Display for MeasurementFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.unit {
            MeasurementUnit::GigabytesPerSecond => "GB/s",
        };
        let kind = match self.kind {
            MeasurementType::Cpu => "cpu",
            MeasurementType::Gpu => "gpu",
        };
        write!(f, "{unit} [{kind}]")
    }
}

#[derive(Debug, Default)]
pub struct Statistics {
    fields: Option<MeasurementFields>,
    samples: Vec<f64>,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_unit_and_type(&mut self, unit: MeasurementUnit, kind: MeasurementType) {
        self.fields = Some(MeasurementFields::new(unit, kind));
    }

    /// Records one sample of `bytes` transferred in `elapsed`, converted to `unit`.
    pub fn push_value(
        &mut self,
        elapsed: Duration,
        bytes: u64,
        unit: MeasurementUnit,
        kind: MeasurementType,
    ) {
        let fields = MeasurementFields::new(unit, kind);
        match self.fields {
            None => self.fields = Some(fields),
            Some(existing) if existing != fields => {
                log::warn!("sample tagged {fields} pushed into statistics tagged {existing}");
            }
            Some(_) => {}
        }

        let value = match unit {
            MeasurementUnit::GigabytesPerSecond => {
                let seconds = elapsed.as_secs_f64();
                if seconds > 0.0 {
                    bytes as f64 / seconds / 1e9
                } else {
                    0.0
                }
            }
        };
        self.samples.push(value);
    }

    pub fn fields(&self) -> Option<MeasurementFields> {
        self.fields
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn summary(&self) -> Option<Summary> {
        if self.samples.is_empty() {
            return None;
        }
        let mut sorted = self.samples.clone();
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let median = if count % 2 == 0 {
            (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
        } else {
            sorted[count / 2]
        };

        Some(Summary {
            count,
            min: sorted[0],
            max: sorted[count - 1],
            mean: sorted.iter().sum::<f64>() / count as f64,
            median,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "n={} min={:.3} max={:.3} mean={:.3} median={:.3}",
            self.count, self.min, self.max, self.mean, self.median
        )
    }
}
