use log::debug;
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::evolution::EvolutionParams;

// Type aliases for clarity
pub type BatchId = String;
pub type SubjectId = String;
pub type FacultyId = String;
pub type ClassroomId = String;
pub type Fitness = i64;

/// A complete candidate timetable spanning every batch under scheduling.
pub type Timetable = Vec<ScheduleEntry>;

/// Teaching days, Monday through Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Day {
    pub const ALL: [Day; 6] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The six teaching periods of a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub enum Period {
    #[serde(rename = "Period 1")]
    First,
    #[serde(rename = "Period 2")]
    Second,
    #[serde(rename = "Period 3")]
    Third,
    #[serde(rename = "Period 4")]
    Fourth,
    #[serde(rename = "Period 5")]
    Fifth,
    #[serde(rename = "Period 6")]
    Sixth,
}

impl Period {
    pub const ALL: [Period; 6] = [
        Period::First,
        Period::Second,
        Period::Third,
        Period::Fourth,
        Period::Fifth,
        Period::Sixth,
    ];

    pub fn number(self) -> usize {
        self as usize + 1
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Period {}", self.number())
    }
}

/// A (day, period) cell of the weekly grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot {
    pub day: Day,
    pub period: Period,
}

impl Slot {
    pub fn new(day: Day, period: Period) -> Self {
        Self { day, period }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let day = Day::random(rng);
        Self::new(day, Period::random(rng))
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.day, self.period)
    }
}

/// Which teacher takes a subject for one batch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SubjectTeacherAssignment {
    pub subject: SubjectId,
    /// `None` when the teacher was removed; the subject is then taught by "TBD".
    #[serde(default)]
    pub teacher: Option<FacultyId>,
}

/// A cohort of students scheduled as a unit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    #[serde(alias = "_id")]
    pub id: BatchId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub department: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub shift: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subjects: Vec<SubjectId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub classrooms: Vec<ClassroomId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub teachers: Vec<FacultyId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subject_teacher_assignments: Vec<SubjectTeacherAssignment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    #[serde(alias = "_id")]
    pub id: SubjectId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub required_classes_per_week: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub max_classes_per_day: u32,
}

/// A teacher. Only the name is used when labelling entries; load figures are carried
/// through untouched.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Faculty {
    #[serde(alias = "_id")]
    pub id: FacultyId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subjects: Vec<SubjectId>,
    #[serde(default)]
    pub max_weekly_load: Option<u32>,
    #[serde(default)]
    pub avg_leaves_per_month: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Classroom {
    #[serde(alias = "_id")]
    pub id: ClassroomId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub capacity: u32,
    #[serde(default, rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
}

/// A soft placement preference set by an administrator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", content = "details", rename_all = "snake_case")]
pub enum Constraint {
    SubjectSlotPreference {
        batch: BatchId,
        subject: SubjectId,
        day: Day,
        slot: Period,
    },
    ClassroomPreference {
        batch: BatchId,
        classroom: ClassroomId,
        day: Day,
        slot: Period,
    },
    TeacherSlotPreference {
        batch: BatchId,
        faculty: FacultyId,
        day: Day,
        slot: Period,
    },
}

impl Constraint {
    pub fn slot(&self) -> Slot {
        match *self {
            Constraint::SubjectSlotPreference { day, slot, .. }
            | Constraint::ClassroomPreference { day, slot, .. }
            | Constraint::TeacherSlotPreference { day, slot, .. } => Slot::new(day, slot),
        }
    }
}

/// Every entity the engine reads during one run.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingInput {
    #[serde(default, deserialize_with = "null_as_default")]
    pub batches: Vec<Batch>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subjects: Vec<Subject>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub faculty: Vec<Faculty>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub classrooms: Vec<Classroom>,
    #[serde(default, deserialize_with = "lenient_constraints")]
    pub constraints: Vec<Constraint>,
}

/// One generation request: the entities plus the batch selection and search budget.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingRequest {
    #[serde(flatten)]
    pub input: SchedulingInput,
    #[serde(default)]
    pub batch_id: Option<BatchId>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub all_batches: bool,
    #[serde(default)]
    pub params: EvolutionParams,
}

/// Which batches a request schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode<'a> {
    AllBatches,
    Batch(&'a str),
}

impl SchedulingRequest {
    /// A missing or blank batch id falls back to scheduling every batch.
    pub fn mode(&self) -> Mode<'_> {
        match self.batch_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() && !self.all_batches => Mode::Batch(id),
            _ => Mode::AllBatches,
        }
    }
}

/// One placed class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub batch_id: BatchId,
    pub subject_id: SubjectId,
    pub classroom_id: Option<ClassroomId>,
    pub batch: String,
    pub subject: String,
    pub faculty: String,
    pub classroom: String,
    pub department: String,
    pub shift: String,
    pub day: Day,
    pub period: Period,
    pub preferred: bool,
}

impl ScheduleEntry {
    pub fn slot(&self) -> Slot {
        Slot::new(self.day, self.period)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ViolationKind {
    BatchClash,
    ClassroomClash,
    SubjectSlot,
    ClassroomPreference,
    DailyOverflow,
    WeeklyShortfall,
    WeeklyExcess,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ViolationKind::BatchClash => "Batch Double Booking",
            ViolationKind::ClassroomClash => "Classroom Double Booking",
            ViolationKind::SubjectSlot => "Subject Slot Preference",
            ViolationKind::ClassroomPreference => "Classroom Preference",
            ViolationKind::DailyOverflow => "Max Classes Per Day",
            ViolationKind::WeeklyShortfall => "Weekly Quota Shortfall",
            ViolationKind::WeeklyExcess => "Weekly Quota Excess",
        };
        f.write_str(label)
    }
}

/// Describes one penalty that contributed to a timetable's fitness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub kind: ViolationKind,
    pub penalty: Fitness,
    pub description: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] -{} {}", self.kind, self.penalty, self.description)
    }
}

/// The timetable in the shape the request asked for.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Schedule {
    #[serde(rename_all = "camelCase")]
    Batch {
        timetable: Timetable,
        selected_batch: Option<BatchId>,
    },
    #[serde(rename_all = "camelCase")]
    AllBatches {
        batch_timetables: BTreeMap<BatchId, Timetable>,
    },
}

/// The final output of the solver.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingOutput {
    #[serde(flatten)]
    pub schedule: Schedule,
    pub fitness: Fitness,
    pub violations: Vec<Violation>,
    /// Every batch in the input, for labelling the grid.
    pub batches: Vec<Batch>,
    pub days: Vec<Day>,
    pub periods: Vec<Period>,
}

fn count_from_value(value: &Value) -> Option<u32> {
    let number = match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && *f >= 0.0)
            .map(|f| f as u64),
        _ => None,
    }?;
    Some(u32::try_from(number).unwrap_or(u32::MAX))
}

// an explicit null reads like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// numbers, numeric strings, anything else is 0
fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(count_from_value).unwrap_or(0))
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => b,
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    })
}

fn lenient_constraints<'de, D>(deserializer: D) -> Result<Vec<Constraint>, D::Error>
where
    D: Deserializer<'de>,
{
    let records = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(records
        .into_iter()
        .filter_map(|record| match serde_json::from_value::<Constraint>(record) {
            Ok(constraint) => Some(constraint),
            Err(e) => {
                debug!("Skipping unusable constraint record: {}", e);
                None
            }
        })
        .collect())
}
