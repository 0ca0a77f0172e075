use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, MySqlPool};

use crate::error::{LeaveError, LeaveResult, ValidationError};
use crate::model::leave_request::{
    ApprovalRecord, ApprovalStage, DayCount, LeaveCategory, LeaveRequest, LeaveStatus, RejectionRecord,
};
use crate::store::{LeaveFilter, LeavePage, LeaveStore};

const COLUMNS: &str = r#"
    id, salarie, type_conge, date_debut, date_fin, nombre_demi_jours, jours_confirmes, motif, statut,
    valide_direct, valideur_direct, date_validation_direct, commentaire_direct,
    valide_service, valideur_service, date_validation_service, commentaire_service,
    rejete, date_rejet, motif_rejet, etape_rejet, date_creation
"#;

// Helper enum for typed SQLx binding
enum FilterValue {
    U64(u64),
    I32(i32),
    Str(String),
}

#[derive(FromRow)]
struct LeaveRow {
    id: u64,
    salarie: u64,
    type_conge: String,
    date_debut: NaiveDate,
    date_fin: NaiveDate,
    nombre_demi_jours: Option<u32>,
    jours_confirmes: bool,
    motif: Option<String>,
    statut: String,
    valide_direct: bool,
    valideur_direct: Option<u64>,
    date_validation_direct: Option<DateTime<Utc>>,
    commentaire_direct: Option<String>,
    valide_service: bool,
    valideur_service: Option<u64>,
    date_validation_service: Option<DateTime<Utc>>,
    commentaire_service: Option<String>,
    rejete: bool,
    date_rejet: Option<DateTime<Utc>>,
    motif_rejet: Option<String>,
    etape_rejet: Option<String>,
    date_creation: DateTime<Utc>,
}

fn corrupt(id: u64, column: &str, value: &str) -> LeaveError {
    LeaveError::Communication(format!("row {id}: unexpected {column} `{value}`"))
}

impl TryFrom<LeaveRow> for LeaveRequest {
    type Error = LeaveError;

    fn try_from(row: LeaveRow) -> Result<Self, Self::Error> {
        let category =
            LeaveCategory::from_str(&row.type_conge).map_err(|_| corrupt(row.id, "type_conge", &row.type_conge))?;
        let status = LeaveStatus::from_str(&row.statut).map_err(|_| corrupt(row.id, "statut", &row.statut))?;
        let stage = row
            .etape_rejet
            .as_deref()
            .map(|s| ApprovalStage::from_str(s).map_err(|_| corrupt(row.id, "etape_rejet", s)))
            .transpose()?;

        Ok(LeaveRequest {
            id: Some(row.id),
            employee_id: row.salarie,
            category,
            start_date: row.date_debut,
            end_date: row.date_fin,
            day_count: row.nombre_demi_jours.map(DayCount::from_half_days),
            days_confirmed: row.jours_confirmes,
            reason: row.motif,
            status,
            direct_approval: ApprovalRecord {
                approved: row.valide_direct,
                approver_id: row.valideur_direct,
                approved_at: row.date_validation_direct,
                comment: row.commentaire_direct,
            },
            service_approval: ApprovalRecord {
                approved: row.valide_service,
                approver_id: row.valideur_service,
                approved_at: row.date_validation_service,
                comment: row.commentaire_service,
            },
            rejection: RejectionRecord {
                rejected: row.rejete,
                rejected_at: row.date_rejet,
                reason: row.motif_rejet,
                stage,
            },
            created_at: row.date_creation,
        })
    }
}

/// Leave requests in the `demandes_conge` table.
pub struct MySqlLeaveStore {
    pool: MySqlPool,
}

impl MySqlLeaveStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn current_status(&self, id: u64) -> LeaveResult<Option<LeaveStatus>> {
        let statut: Option<String> = sqlx::query_scalar("SELECT statut FROM demandes_conge WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        statut
            .map(|s| LeaveStatus::from_str(&s).map_err(|_| corrupt(id, "statut", &s)))
            .transpose()
    }
}

fn where_clause(filter: &LeaveFilter) -> (String, Vec<FilterValue>) {
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args = Vec::new();

    if let Some(employee_id) = filter.employee_id {
        where_sql.push_str(" AND salarie = ?");
        args.push(FilterValue::U64(employee_id));
    }

    if !filter.statuses.is_empty() {
        let placeholders = vec!["?"; filter.statuses.len()].join(", ");
        where_sql.push_str(&format!(" AND statut IN ({placeholders})"));
        args.extend(filter.statuses.iter().map(|s| FilterValue::Str(s.to_string())));
    }

    if let Some(category) = filter.category {
        where_sql.push_str(" AND type_conge = ?");
        args.push(FilterValue::Str(category.to_string()));
    }

    if let Some(year) = filter.year {
        where_sql.push_str(" AND YEAR(date_debut) = ?");
        args.push(FilterValue::I32(year));
    }

    (where_sql, args)
}

#[async_trait]
impl LeaveStore for MySqlLeaveStore {
    #[tracing::instrument(name = "mysql_insert_leave", skip_all, fields(employee_id = request.employee_id))]
    async fn insert(&self, request: &LeaveRequest) -> LeaveResult<LeaveRequest> {
        if request.id.is_some() {
            return Err(ValidationError::AlreadyCreated.into());
        }

        let result = sqlx::query(
            r#"
            INSERT INTO demandes_conge
                (salarie, type_conge, date_debut, date_fin, nombre_demi_jours, jours_confirmes, motif, statut,
                 valide_direct, valideur_direct, date_validation_direct, commentaire_direct,
                 valide_service, valideur_service, date_validation_service, commentaire_service,
                 rejete, date_rejet, motif_rejet, etape_rejet, date_creation)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(request.employee_id)
        .bind(request.category.to_string())
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.day_count.map(DayCount::half_days))
        .bind(request.days_confirmed)
        .bind(&request.reason)
        .bind(request.status.to_string())
        .bind(request.direct_approval.approved)
        .bind(request.direct_approval.approver_id)
        .bind(request.direct_approval.approved_at)
        .bind(&request.direct_approval.comment)
        .bind(request.service_approval.approved)
        .bind(request.service_approval.approver_id)
        .bind(request.service_approval.approved_at)
        .bind(&request.service_approval.comment)
        .bind(request.rejection.rejected)
        .bind(request.rejection.rejected_at)
        .bind(&request.rejection.reason)
        .bind(request.rejection.stage.map(|s| s.to_string()))
        .bind(request.created_at)
        .execute(&self.pool)
        .await?;

        let mut stored = request.clone();
        stored.id = Some(result.last_insert_id());
        Ok(stored)
    }

    async fn fetch(&self, id: u64) -> LeaveResult<Option<LeaveRequest>> {
        let sql = format!("SELECT {COLUMNS} FROM demandes_conge WHERE id = ?");
        let row = sqlx::query_as::<_, LeaveRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(LeaveRequest::try_from).transpose()
    }

    #[tracing::instrument(name = "mysql_update_leave", skip_all, fields(leave_id = ?request.id, %expected))]
    async fn update(&self, expected: LeaveStatus, request: &LeaveRequest) -> LeaveResult<()> {
        let id = request.id.ok_or(LeaveError::NotFound(0))?;

        let result = sqlx::query(
            r#"
            UPDATE demandes_conge SET
                type_conge = ?, date_debut = ?, date_fin = ?, nombre_demi_jours = ?, jours_confirmes = ?,
                motif = ?, statut = ?,
                valide_direct = ?, valideur_direct = ?, date_validation_direct = ?, commentaire_direct = ?,
                valide_service = ?, valideur_service = ?, date_validation_service = ?, commentaire_service = ?,
                rejete = ?, date_rejet = ?, motif_rejet = ?, etape_rejet = ?
            WHERE id = ? AND statut = ?
            "#,
        )
        .bind(request.category.to_string())
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.day_count.map(DayCount::half_days))
        .bind(request.days_confirmed)
        .bind(&request.reason)
        .bind(request.status.to_string())
        .bind(request.direct_approval.approved)
        .bind(request.direct_approval.approver_id)
        .bind(request.direct_approval.approved_at)
        .bind(&request.direct_approval.comment)
        .bind(request.service_approval.approved)
        .bind(request.service_approval.approver_id)
        .bind(request.service_approval.approved_at)
        .bind(&request.service_approval.comment)
        .bind(request.rejection.rejected)
        .bind(request.rejection.rejected_at)
        .bind(&request.rejection.reason)
        .bind(request.rejection.stage.map(|s| s.to_string()))
        .bind(id)
        .bind(expected.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        // MySQL reports 0 rows both for a lost race and for an unchanged row.
        match self.current_status(id).await? {
            None => Err(LeaveError::NotFound(id)),
            Some(status) if status == expected => Ok(()),
            Some(_) => Err(ValidationError::StatusChanged { expected }.into()),
        }
    }

    async fn list(&self, filter: &LeaveFilter) -> LeaveResult<LeavePage> {
        let (where_sql, args) = where_clause(filter);

        let count_sql = format!("SELECT COUNT(*) FROM demandes_conge{where_sql}");
        let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
        for arg in &args {
            count_q = match arg {
                FilterValue::U64(v) => count_q.bind(*v),
                FilterValue::I32(v) => count_q.bind(*v),
                FilterValue::Str(s) => count_q.bind(s.as_str()),
            };
        }
        let total = count_q.fetch_one(&self.pool).await?;

        let window = filter.window();
        let limit_sql = if window.is_some() { " LIMIT ? OFFSET ?" } else { "" };
        let data_sql =
            format!("SELECT {COLUMNS} FROM demandes_conge{where_sql} ORDER BY date_creation DESC, id DESC{limit_sql}");

        let mut data_q = sqlx::query_as::<_, LeaveRow>(&data_sql);
        for arg in args {
            data_q = match arg {
                FilterValue::U64(v) => data_q.bind(v),
                FilterValue::I32(v) => data_q.bind(v),
                FilterValue::Str(s) => data_q.bind(s),
            };
        }
        if let Some((limit, offset)) = window {
            data_q = data_q.bind(limit).bind(offset);
        }

        let data = data_q
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(LeaveRequest::try_from)
            .collect::<LeaveResult<Vec<_>>>()?;

        let (page, per_page) = match window {
            Some((limit, _)) => (filter.page.unwrap_or(1), limit),
            None => (1, data.len() as u64),
        };

        Ok(LeavePage {
            data,
            page,
            per_page,
            total,
        })
    }

    async fn delete(&self, id: u64) -> LeaveResult<bool> {
        let result = sqlx::query("DELETE FROM demandes_conge WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
