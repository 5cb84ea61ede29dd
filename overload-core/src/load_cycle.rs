//! Cyclic load schedules: piecewise-linear load and ambient over one cycle.

use crate::imports::*;
use crate::params::*;

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize, ApproxEq)]
/// One breakpoint of a load schedule
pub struct LoadCyclePoint {
    /// time since the start of the cycle, hours
    #[serde(alias = "time")]
    pub time_hours: f64,
    /// ambient temperature, °C
    #[serde(alias = "ambient")]
    pub ambient_c: f64,
    /// load in per unit of the overload kVA base
    #[serde(alias = "load")]
    pub load_pu: f64,
}

impl LoadCyclePoint {
    pub fn new(time_hours: f64, ambient_c: f64, load_pu: f64) -> Self {
        Self {
            time_hours,
            ambient_c,
            load_pu,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
/// Reasons a schedule is refused before any simulation takes place
pub enum CycleRejection {
    #[error("load cycle has no points")]
    Empty,
    #[error("load cycle must start at time 0, found {0} h")]
    NonZeroStart(f64),
    #[error(
        "load cycle is not cyclic: first point (ambient {first_ambient} °C, load {first_load} pu) \
         differs from last point (ambient {last_ambient} °C, load {last_load} pu)"
    )]
    NotCyclic {
        first_ambient: f64,
        first_load: f64,
        last_ambient: f64,
        last_load: f64,
    },
    #[error("load cycle time decreases at point {0}")]
    TimeReversal(usize),
    #[error("load cycle has negative load at point {0}")]
    NegativeLoad(usize),
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, ApproxEq)]
/// Ordered breakpoints of one load cycle
pub struct LoadCycle {
    #[serde(default)]
    pub name: String,
    pub points: Vec<LoadCyclePoint>,
}

impl SerdeAPI for LoadCycle {
    const ACCEPTED_BYTE_FORMATS: &'static [&'static str] = &["yaml", "json", "bin", "csv"];
    const ACCEPTED_STR_FORMATS: &'static [&'static str] = &["yaml", "json", "csv"];

    fn to_writer<W: std::io::Write>(&self, wtr: W, format: &str) -> anyhow::Result<()> {
        match format.trim_start_matches('.').to_lowercase().as_str() {
            "yaml" | "yml" => serde_yaml::to_writer(wtr, self)?,
            "json" => serde_json::to_writer(wtr, self)?,
            #[cfg(feature = "bincode")]
            "bin" => bincode::serialize_into(wtr, self)?,
            "csv" => {
                let mut wtr = csv::Writer::from_writer(wtr);
                for point in &self.points {
                    wtr.serialize(point)?;
                }
                wtr.flush()?
            }
            _ => bail!(
                "Unsupported format {format:?}, must be one of {:?}",
                Self::ACCEPTED_BYTE_FORMATS
            ),
        }
        Ok(())
    }

    fn to_str(&self, format: &str) -> anyhow::Result<String> {
        Ok(
            match format.trim_start_matches('.').to_lowercase().as_str() {
                "yaml" | "yml" => self.to_yaml()?,
                "json" => self.to_json()?,
                "csv" => self.to_csv()?,
                _ => bail!(
                    "Unsupported format {format:?}, must be one of {:?}",
                    Self::ACCEPTED_STR_FORMATS
                ),
            },
        )
    }

    /// Note that reading CSV this way leaves the cycle name empty
    fn from_str<S: AsRef<str>>(contents: S, format: &str) -> anyhow::Result<Self> {
        Ok(
            match format.trim_start_matches('.').to_lowercase().as_str() {
                "yaml" | "yml" => Self::from_yaml(contents)?,
                "json" => Self::from_json(contents)?,
                "csv" => Self::from_reader(contents.as_ref().as_bytes(), "csv")?,
                _ => bail!(
                    "Unsupported format {format:?}, must be one of {:?}",
                    Self::ACCEPTED_STR_FORMATS
                ),
            },
        )
    }

    fn from_reader<R: std::io::Read>(rdr: R, format: &str) -> anyhow::Result<Self> {
        let mut deserialized = match format.trim_start_matches('.').to_lowercase().as_str() {
            "yaml" | "yml" => serde_yaml::from_reader(rdr)?,
            "json" => serde_json::from_reader(rdr)?,
            #[cfg(feature = "bincode")]
            "bin" => bincode::deserialize_from(rdr)?,
            "csv" => {
                let mut cycle = Self::default();
                let mut rdr = csv::Reader::from_reader(rdr);
                for result in rdr.deserialize() {
                    cycle.push(result?);
                }
                cycle
            }
            _ => bail!(
                "Unsupported format {format:?}, must be one of {:?}",
                Self::ACCEPTED_BYTE_FORMATS
            ),
        };
        deserialized.init()?;
        Ok(deserialized)
    }
}

impl LoadCycle {
    pub fn new<S: Into<String>>(name: S, points: Vec<LoadCyclePoint>) -> Self {
        Self {
            name: name.into(),
            points,
        }
    }

    /// Daily cycle of the worked example: a constant 30 °C ambient, light
    /// load through the night and a 1.1 pu peak from hour 15 to hour 16.
    pub fn c57_91_daily() -> Self {
        let points = [
            (0.0, 1.0),
            (2.0, 0.9),
            (4.0, 0.8),
            (6.0, 0.8),
            (8.0, 0.9),
            (10.0, 1.0),
            (12.0, 1.0),
            (14.0, 1.0),
            (15.0, 1.1),
            (16.0, 1.1),
            (18.0, 1.0),
            (21.0, 1.0),
            (24.0, 1.0),
        ]
        .iter()
        .map(|&(time_hours, load_pu)| LoadCyclePoint::new(time_hours, 30.0, load_pu))
        .collect();
        Self::new("c57_91_daily", points)
    }

    /// Read a cycle from a CSV file and name it after the file stem
    pub fn from_csv_file<P: AsRef<Path>>(filepath: P) -> anyhow::Result<Self> {
        let filepath = filepath.as_ref();
        let name = filepath
            .file_stem()
            .and_then(OsStr::to_str)
            .with_context(|| format!("Could not parse file name: {filepath:?}"))?
            .to_string();
        let mut cycle = Self::from_file(filepath)?;
        cycle.name = name;
        Ok(cycle)
    }

    /// Write the points as CSV with a `time_hours,ambient_c,load_pu` header
    pub fn to_csv(&self) -> anyhow::Result<String> {
        let mut buf = Vec::with_capacity(self.len());
        self.to_writer(&mut buf, "csv")?;
        Ok(String::from_utf8(buf)?)
    }

    pub fn push(&mut self, point: LoadCyclePoint) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Cycle duration in minutes
    pub fn end_time_minutes(&self) -> f64 {
        self.points
            .last()
            .map_or(0.0, |p| p.time_hours * MINUTES_PER_HOUR)
    }

    /// Checks that the schedule can be simulated: non-empty, starting at
    /// time zero, with non-decreasing time, non-negative load and identical
    /// first and last ambient and load.
    pub fn validate(&self) -> Result<(), CycleRejection> {
        let (first, last) = match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(CycleRejection::Empty),
        };
        if first.time_hours != 0.0 {
            return Err(CycleRejection::NonZeroStart(first.time_hours));
        }
        if first.ambient_c != last.ambient_c || first.load_pu != last.load_pu {
            return Err(CycleRejection::NotCyclic {
                first_ambient: first.ambient_c,
                first_load: first.load_pu,
                last_ambient: last.ambient_c,
                last_load: last.load_pu,
            });
        }
        if let Some((idx, _)) = self
            .points
            .iter()
            .tuple_windows()
            .enumerate()
            .find(|(_, (a, b))| b.time_hours < a.time_hours)
        {
            return Err(CycleRejection::TimeReversal(idx + 1));
        }
        if let Some(idx) = self.points.iter().position(|p| p.load_pu < 0.0) {
            return Err(CycleRejection::NegativeLoad(idx));
        }
        Ok(())
    }

    /// Linear segments between consecutive breakpoints, with times in minutes
    pub fn segments(&self) -> impl Iterator<Item = LoadSegment> + '_ {
        self.points
            .iter()
            .tuple_windows()
            .map(|(start, end)| LoadSegment::between(start, end))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Linear interpolation of load and ambient between two breakpoints
pub struct LoadSegment {
    pub start_minutes: f64,
    pub end_minutes: f64,
    pub start_load_pu: f64,
    pub start_ambient: f64,
    /// pu per minute
    pub load_slope: f64,
    /// °C per minute
    pub ambient_slope: f64,
}

impl LoadSegment {
    /// Zero-length segments (step changes) get a floored duration so both
    /// slopes stay finite.
    pub fn between(start: &LoadCyclePoint, end: &LoadCyclePoint) -> Self {
        let start_minutes = start.time_hours * MINUTES_PER_HOUR;
        let end_minutes = end.time_hours * MINUTES_PER_HOUR;
        let duration = (end_minutes - start_minutes).max(SEGMENT_DURATION_FLOOR);
        Self {
            start_minutes,
            end_minutes,
            start_load_pu: start.load_pu,
            start_ambient: start.ambient_c,
            load_slope: (end.load_pu - start.load_pu) / duration,
            ambient_slope: (end.ambient_c - start.ambient_c) / duration,
        }
    }

    pub fn load_at(&self, time_minutes: f64) -> f64 {
        self.start_load_pu + self.load_slope * (time_minutes - self.start_minutes)
    }

    pub fn ambient_at(&self, time_minutes: f64) -> f64 {
        self.start_ambient + self.ambient_slope * (time_minutes - self.start_minutes)
    }

    pub fn duration_minutes(&self) -> f64 {
        self.end_minutes - self.start_minutes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_daily_cycle_is_valid() {
        let cycle = LoadCycle::c57_91_daily();
        assert_eq!(cycle.len(), 13);
        assert_eq!(cycle.validate(), Ok(()));
        assert_eq!(cycle.end_time_minutes(), 1440.0);
        assert_eq!(cycle.segments().count(), 12);
    }

    #[test]
    fn test_rejections() {
        assert_eq!(LoadCycle::default().validate(), Err(CycleRejection::Empty));

        let late = LoadCycle::new(
            "late",
            vec![LoadCyclePoint::new(1.0, 30.0, 1.0), LoadCyclePoint::new(2.0, 30.0, 1.0)],
        );
        assert_eq!(late.validate(), Err(CycleRejection::NonZeroStart(1.0)));

        let open = LoadCycle::new(
            "open",
            vec![LoadCyclePoint::new(0.0, 30.0, 1.0), LoadCyclePoint::new(24.0, 30.0, 0.9)],
        );
        assert!(matches!(open.validate(), Err(CycleRejection::NotCyclic { .. })));

        let warm = LoadCycle::new(
            "warm",
            vec![LoadCyclePoint::new(0.0, 30.0, 1.0), LoadCyclePoint::new(24.0, 31.0, 1.0)],
        );
        assert!(matches!(warm.validate(), Err(CycleRejection::NotCyclic { .. })));

        let backwards = LoadCycle::new(
            "backwards",
            vec![
                LoadCyclePoint::new(0.0, 30.0, 1.0),
                LoadCyclePoint::new(5.0, 30.0, 1.2),
                LoadCyclePoint::new(4.0, 30.0, 1.0),
            ],
        );
        assert_eq!(backwards.validate(), Err(CycleRejection::TimeReversal(2)));
    }

    #[test]
    fn test_rejection_message_names_the_problem() {
        let msg = CycleRejection::NonZeroStart(2.0).to_string();
        assert!(msg.contains("time 0"));
    }

    #[test]
    fn test_segment_interpolation() {
        let seg = LoadSegment::between(
            &LoadCyclePoint::new(1.0, 20.0, 0.5),
            &LoadCyclePoint::new(3.0, 30.0, 1.5),
        );
        assert_eq!(seg.start_minutes, 60.0);
        assert_eq!(seg.duration_minutes(), 120.0);
        assert_relative_eq!(seg.load_at(120.0), 1.0);
        assert_relative_eq!(seg.ambient_at(180.0), 30.0);
    }

    #[test]
    fn test_step_change_has_finite_slopes() {
        let seg = LoadSegment::between(
            &LoadCyclePoint::new(4.0, 30.0, 1.0),
            &LoadCyclePoint::new(4.0, 35.0, 1.5),
        );
        assert!(seg.load_slope.is_finite());
        assert!(seg.ambient_slope.is_finite());
        assert_eq!(seg.duration_minutes(), 0.0);
    }

    #[test]
    fn test_csv_round_trip_keeps_points() {
        let cycle = LoadCycle::c57_91_daily();
        let csv = cycle.to_csv().unwrap();
        assert!(csv.starts_with("time_hours,ambient_c,load_pu"));
        let parsed = LoadCycle::from_str(csv, "csv").unwrap();
        assert_eq!(parsed.points, cycle.points);
    }

    #[test]
    fn test_from_csv_file_names_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("evening_peak.csv");
        std::fs::write(&path, "time_hours,ambient_c,load_pu\n0,25,0.8\n12,25,1.2\n24,25,0.8\n")
            .unwrap();
        let cycle = LoadCycle::from_csv_file(&path).unwrap();
        assert_eq!(cycle.name, "evening_peak");
        assert_eq!(cycle.len(), 3);
        assert_eq!(cycle.points[1], LoadCyclePoint::new(12.0, 25.0, 1.2));
    }
}
