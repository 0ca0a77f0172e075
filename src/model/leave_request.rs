use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

use crate::error::ValidationError;
use crate::model::holiday::HolidayCalendar;
use crate::model::working_days::{check_span, count_working_days};

/// Number of leave days, in half-day steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayCount(u32);

impl DayCount {
    pub const ZERO: DayCount = DayCount(0);

    pub const fn from_half_days(half_days: u32) -> Self {
        DayCount(half_days)
    }

    pub const fn whole_days(days: u32) -> Self {
        DayCount(days * 2)
    }

    pub fn from_days(days: f64) -> Result<Self, ValidationError> {
        let doubled = days * 2.0;
        if !days.is_finite() || days < 0.0 || doubled.fract() != 0.0 || doubled > u32::MAX as f64 {
            return Err(ValidationError::InvalidDayCount(days));
        }
        Ok(DayCount(doubled as u32))
    }

    pub fn half_days(self) -> u32 {
        self.0
    }

    pub fn days(self) -> f64 {
        self.0 as f64 / 2.0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for DayCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.days())
    }
}

impl Serialize for DayCount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.days())
    }
}

impl<'de> Deserialize<'de> for DayCount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let days = f64::deserialize(deserializer)?;
        DayCount::from_days(days).map_err(serde::de::Error::custom)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LeaveCategory {
    #[serde(alias = "conge_paye")]
    #[strum(to_string = "normal", serialize = "conge_paye")]
    Normal,
    Maladie,
    Maternite,
    Paternite,
    SansSolde,
    Sabbatique,
}

impl LeaveCategory {
    pub fn label(self) -> &'static str {
        match self {
            LeaveCategory::Normal => "Congé normal",
            LeaveCategory::Maladie => "Congé maladie",
            LeaveCategory::Maternite => "Congé maternité",
            LeaveCategory::Paternite => "Congé paternité",
            LeaveCategory::SansSolde => "Congé sans solde",
            LeaveCategory::Sabbatique => "Congé sabbatique",
        }
    }

    /// Whether approved days of this kind are taken from the yearly allowance.
    pub fn uses_allowance(self) -> bool {
        self == LeaveCategory::Normal
    }
}

/// Lifecycle status (statut) of a leave request.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr, EnumIter,
)]
pub enum LeaveStatus {
    #[serde(rename = "brouillon", alias = "en_attente_confirmation")]
    #[strum(to_string = "brouillon", serialize = "en_attente_confirmation")]
    Brouillon,
    #[serde(rename = "soumise", alias = "en_attente_validation")]
    #[strum(to_string = "soumise", serialize = "en_attente_validation")]
    Soumise,
    #[serde(rename = "validée_direct", alias = "en_attente_service", alias = "validee_direct")]
    #[strum(to_string = "validée_direct", serialize = "en_attente_service", serialize = "validee_direct")]
    ValideeDirect,
    #[serde(rename = "validée_service", alias = "validee_service")]
    #[strum(to_string = "validée_service", serialize = "validee_service")]
    ValideeService,
    #[serde(rename = "approuvée", alias = "approuvee")]
    #[strum(to_string = "approuvée", serialize = "approuvee")]
    Approuvee,
    #[serde(rename = "rejetée", alias = "rejetee")]
    #[strum(to_string = "rejetée", serialize = "rejetee")]
    Rejetee,
    #[serde(rename = "payée", alias = "payee")]
    #[strum(to_string = "payée", serialize = "payee")]
    Payee,
}

/// Badge colour used wherever a status is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTone {
    Gray,
    Blue,
    Yellow,
    Orange,
    Green,
    Red,
}

impl LeaveStatus {
    pub fn label(self) -> &'static str {
        match self {
            LeaveStatus::Brouillon => "Brouillon",
            LeaveStatus::Soumise => "Soumise",
            LeaveStatus::ValideeDirect => "Validée par responsable",
            LeaveStatus::ValideeService => "Validée par service",
            LeaveStatus::Approuvee => "Approuvée",
            LeaveStatus::Rejetee => "Rejetée",
            LeaveStatus::Payee => "Payée",
        }
    }

    pub fn badge(self) -> BadgeTone {
        match self {
            LeaveStatus::Brouillon => BadgeTone::Gray,
            LeaveStatus::Soumise => BadgeTone::Blue,
            LeaveStatus::ValideeDirect => BadgeTone::Yellow,
            LeaveStatus::ValideeService => BadgeTone::Orange,
            LeaveStatus::Approuvee | LeaveStatus::Payee => BadgeTone::Green,
            LeaveStatus::Rejetee => BadgeTone::Red,
        }
    }

    /// Waiting for one of the two managers.
    pub fn is_awaiting_review(self) -> bool {
        matches!(self, LeaveStatus::Soumise | LeaveStatus::ValideeDirect)
    }

    /// Approved by both managers (paid or not).
    pub fn is_approved(self) -> bool {
        matches!(
            self,
            LeaveStatus::ValideeService | LeaveStatus::Approuvee | LeaveStatus::Payee
        )
    }
}

/// Which approval step a request was in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ApprovalStage {
    Direct,
    Service,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ApprovalRecord {
    #[serde(rename = "valide")]
    pub approved: bool,
    /// user id of the approving manager
    #[serde(rename = "valideur")]
    pub approver_id: Option<u64>,
    #[serde(rename = "date_validation")]
    #[schema(example = "2026-01-02T09:30:00Z", format = "date-time", value_type = Option<String>)]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(rename = "commentaire")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RejectionRecord {
    #[serde(rename = "rejete")]
    pub rejected: bool,
    #[serde(rename = "date_rejet")]
    #[schema(example = "2026-01-02T09:30:00Z", format = "date-time", value_type = Option<String>)]
    pub rejected_at: Option<DateTime<Utc>>,
    #[serde(rename = "motif_rejet")]
    pub reason: Option<String>,
    #[serde(rename = "etape")]
    pub stage: Option<ApprovalStage>,
}

/// One employee's request for time off, in the backend's representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LeaveRequest {
    #[schema(example = 1)]
    pub id: Option<u64>,
    #[serde(rename = "salarie")]
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[serde(rename = "type_conge")]
    pub category: LeaveCategory,
    #[serde(rename = "date_debut")]
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[serde(rename = "date_fin")]
    #[schema(example = "2026-01-09", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[serde(rename = "nombre_jours")]
    #[schema(example = 5.0, value_type = Option<f64>)]
    pub day_count: Option<DayCount>,
    #[serde(rename = "jours_confirmes")]
    pub days_confirmed: bool,
    #[serde(rename = "motif")]
    pub reason: Option<String>,
    #[serde(rename = "statut")]
    pub status: LeaveStatus,
    #[serde(rename = "validation_direct", default)]
    pub direct_approval: ApprovalRecord,
    #[serde(rename = "validation_service", default)]
    pub service_approval: ApprovalRecord,
    #[serde(rename = "rejet", default)]
    pub rejection: RejectionRecord,
    #[serde(rename = "date_creation")]
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
}

/// Input for a new draft.
#[derive(Debug, Clone)]
pub struct NewLeaveRequest {
    pub employee_id: u64,
    pub category: LeaveCategory,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Proposed count; the working-day count is used when absent.
    pub day_count: Option<DayCount>,
    pub reason: Option<String>,
}

/// Changes to a draft. `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct LeaveRevision {
    pub category: Option<LeaveCategory>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub reason: Option<String>,
}

fn check_range(start: NaiveDate, end: NaiveDate) -> Result<(), ValidationError> {
    if end < start {
        return Err(ValidationError::InvertedDateRange { start, end });
    }
    check_span(start, end)
}

fn default_day_count(calendar: &HolidayCalendar, start: NaiveDate, end: NaiveDate) -> Option<DayCount> {
    let computed = count_working_days(calendar, start, end).working_days;
    (computed > 0).then(|| DayCount::whole_days(computed))
}

impl LeaveRequest {
    /// A new, unpersisted request in `brouillon`.
    pub fn draft(
        new: NewLeaveRequest,
        calendar: &HolidayCalendar,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        if new.employee_id == 0 {
            return Err(ValidationError::MissingSubject);
        }
        check_range(new.start_date, new.end_date)?;

        let day_count = new
            .day_count
            .or_else(|| default_day_count(calendar, new.start_date, new.end_date));

        Ok(Self {
            id: None,
            employee_id: new.employee_id,
            category: new.category,
            start_date: new.start_date,
            end_date: new.end_date,
            day_count,
            days_confirmed: false,
            reason: new.reason.filter(|r| !r.trim().is_empty()),
            status: LeaveStatus::Brouillon,
            direct_approval: ApprovalRecord::default(),
            service_approval: ApprovalRecord::default(),
            rejection: RejectionRecord::default(),
            created_at: now,
        })
    }

    /// Confirms the computed or a corrected day count on a draft.
    pub fn confirm_days(&self, days: DayCount) -> Result<Self, ValidationError> {
        if self.status != LeaveStatus::Brouillon {
            return Err(ValidationError::NotADraft(self.status));
        }
        if !days.is_positive() {
            return Err(ValidationError::NonPositiveDayCount);
        }

        let mut confirmed = self.clone();
        confirmed.day_count = Some(days);
        confirmed.days_confirmed = true;
        Ok(confirmed)
    }

    /// Edits a draft. Any change clears the day confirmation; a date change
    /// also replaces the day count with the new working-day count.
    pub fn amend(&self, revision: LeaveRevision, calendar: &HolidayCalendar) -> Result<Self, ValidationError> {
        if self.status != LeaveStatus::Brouillon {
            return Err(ValidationError::NotADraft(self.status));
        }

        let mut amended = self.clone();
        if let Some(category) = revision.category {
            amended.category = category;
        }
        if let Some(reason) = revision.reason {
            amended.reason = Some(reason).filter(|r| !r.trim().is_empty());
        }

        let start = revision.start_date.unwrap_or(self.start_date);
        let end = revision.end_date.unwrap_or(self.end_date);
        check_range(start, end)?;
        if start != self.start_date || end != self.end_date {
            amended.start_date = start;
            amended.end_date = end;
            amended.day_count = default_day_count(calendar, start, end);
        }

        amended.days_confirmed = false;
        Ok(amended)
    }
}
