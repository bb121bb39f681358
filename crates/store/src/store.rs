use std::collections::HashSet;
use std::path::Path;

use chrono::{Duration, NaiveDate};
use thiserror::Error;
use tracing::{info, warn};

use coldcrm_core::campaign::{self, CampaignTarget, LaunchReport};
use coldcrm_core::domain::{
    DealStage, LeadScore, LeadStatus, OutreachState, Priority, Prospect, ProspectId,
};
use coldcrm_core::{ApplicationError, DealValue, DomainError};

use crate::fixtures::DemoDataset;
use crate::io::{self, FileError};
use crate::records::{ProspectRecord, RecordError};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("prospect id {0} appears more than once")]
    DuplicateId(ProspectId),
    #[error("prospect {0} does not exist")]
    UnknownProspect(ProspectId),
    #[error("required field `{0}` is empty")]
    MissingField(&'static str),
    #[error("no prospect ids left after {0}")]
    IdSpaceExhausted(ProspectId),
    #[error("row {row}: {source}")]
    Record { row: usize, source: RecordError },
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    File(#[from] FileError),
}

impl From<StoreError> for ApplicationError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Domain(error) => Self::Domain(error),
            StoreError::File(error) => Self::Storage(error.to_string()),
            StoreError::Record { .. } | StoreError::DuplicateId(_) => {
                Self::Import(error.to_string())
            }
            StoreError::UnknownProspect(_)
            | StoreError::MissingField(_)
            | StoreError::IdSpaceExhausted(_) => {
                Self::Domain(DomainError::InvariantViolation(error.to_string()))
            }
        }
    }
}

/// Input for a manually added prospect. `name`, `company` and `email` are required.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewProspect {
    pub name: String,
    pub title: String,
    pub company: String,
    pub industry: String,
    /// Free-form size label such as "Mid (51-500)"; only the first word is kept.
    pub company_size: String,
    pub location: String,
    pub email: String,
    pub phone: String,
    pub linkedin_url: String,
    pub website: String,
    pub source: String,
    pub owner: String,
    pub priority: Option<Priority>,
    pub lead_score: LeadScore,
    pub pain_points: String,
    pub solution_interest: String,
    pub budget: String,
    pub employee_count: String,
    pub revenue: String,
    pub notes: String,
}

/// Single-field edit applied through [`ProspectStore::update`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldUpdate {
    LeadStatus(LeadStatus),
    DealStage(Option<DealStage>),
    DealValue(DealValue),
    Priority(Option<Priority>),
    LeadScore(LeadScore),
    Owner(String),
    NextFollowUp(Option<NaiveDate>),
    LastContact(Option<NaiveDate>),
    CallDate(Option<NaiveDate>),
    OpenedEmails(u32),
    Replies(u32),
    /// Dispatch the next unsent outreach email on the given day.
    SendEmail(NaiveDate),
    /// Move a dispatched email (1-based) to a later state.
    EmailState { number: usize, state: OutreachState },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportFilter {
    #[default]
    All,
    /// Anything past Prospecting.
    ActiveDeals,
    HighPriority,
}

impl ExportFilter {
    pub fn matches(self, prospect: &Prospect) -> bool {
        match self {
            Self::All => true,
            Self::ActiveDeals => prospect.deal_stage != Some(DealStage::Prospecting),
            Self::HighPriority => prospect.priority == Some(Priority::High),
        }
    }
}

impl std::str::FromStr for ExportFilter {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "all" => Ok(Self::All),
            "active" | "active_deals" => Ok(Self::ActiveDeals),
            "high" | "high_priority" => Ok(Self::HighPriority),
            other => Err(format!("unsupported export filter `{other}` (expected all|active|high)")),
        }
    }
}

/// In-memory prospect table with the mutations offered to the presentation layer. Ids are
/// unique and never reused within the lifetime of the store.
#[derive(Clone, Debug)]
pub struct ProspectStore {
    rows: Vec<Prospect>,
    next_id: u64,
}

impl ProspectStore {
    pub fn new(rows: Vec<Prospect>) -> Result<Self, StoreError> {
        let mut seen = HashSet::with_capacity(rows.len());
        for prospect in &rows {
            if !seen.insert(prospect.id) {
                return Err(StoreError::DuplicateId(prospect.id));
            }
        }
        let last_id = rows.iter().map(|prospect| prospect.id.0).max().unwrap_or(0);
        Ok(Self { rows, next_id: id_after(last_id)? })
    }

    pub fn demo(today: NaiveDate, seed: u64, extra: usize) -> Self {
        let rows = DemoDataset::generate(today, seed, extra);
        let next_id = rows.len() as u64 + 1;
        Self { rows, next_id }
    }

    /// Builds the table from stored records, keeping their ids. Records without an id get the
    /// next free one.
    pub fn from_records(records: Vec<ProspectRecord>) -> Result<Self, StoreError> {
        let last_id = records.iter().filter_map(|record| record.prospect_id).max().unwrap_or(0);
        let mut next_id = id_after(last_id)?;
        let mut rows = Vec::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            let id = match record.prospect_id {
                Some(id) => ProspectId(id),
                None => {
                    let id = ProspectId(next_id);
                    next_id = id_after(next_id)?;
                    id
                }
            };
            let prospect = record
                .into_prospect(id)
                .map_err(|source| StoreError::Record { row: index + 1, source })?;
            rows.push(prospect);
        }
        Self::new(rows)
    }

    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let records = io::read_records(path)?;
        let store = Self::from_records(records)?;
        if store.is_empty() {
            warn!(
                event_name = "store.loaded.empty",
                path = %path.display(),
                "prospect file has no rows"
            );
        }
        info!(
            event_name = "store.loaded",
            path = %path.display(),
            prospects = store.rows.len(),
            "prospect table loaded"
        );
        Ok(store)
    }

    pub fn save(&self, path: &Path, filter: ExportFilter) -> Result<usize, StoreError> {
        let records = self.export(filter);
        io::write_records(path, &records)?;
        info!(
            event_name = "store.exported",
            path = %path.display(),
            prospects = records.len(),
            "prospect table written"
        );
        Ok(records.len())
    }

    pub fn prospects(&self) -> &[Prospect] {
        &self.rows
    }

    pub fn get(&self, id: ProspectId) -> Option<&Prospect> {
        self.rows.iter().find(|prospect| prospect.id == id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn add(&mut self, new: NewProspect, today: NaiveDate) -> Result<ProspectId, StoreError> {
        let required = [("name", &new.name), ("company", &new.company), ("email", &new.email)];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(StoreError::MissingField(field));
            }
        }

        let id = ProspectId(self.next_id);
        let next_id = id_after(id.0)?;
        let mut prospect = Prospect::new(id, new.name.trim(), new.company.trim());
        prospect.title = new.title;
        prospect.industry = new.industry;
        prospect.company_size =
            new.company_size.split_whitespace().next().unwrap_or_default().to_string();
        prospect.location = new.location;
        prospect.email = new.email.trim().to_string();
        prospect.phone = new.phone;
        prospect.linkedin_url = new.linkedin_url;
        prospect.website = new.website;
        prospect.source = new.source;
        prospect.owner = new.owner;
        prospect.priority = new.priority;
        prospect.lead_score = new.lead_score;
        prospect.pain_points = new.pain_points;
        prospect.solution_interest = new.solution_interest;
        prospect.budget = new.budget;
        prospect.employee_count = new.employee_count;
        prospect.revenue = new.revenue;
        prospect.notes = new.notes;
        prospect.date_added = Some(today);
        prospect.next_follow_up = Some(today + Duration::days(1));

        info!(
            event_name = "store.prospect.added",
            prospect_id = %id,
            company = %prospect.company,
            "prospect added"
        );
        self.rows.push(prospect);
        self.next_id = next_id;
        Ok(id)
    }

    pub fn update(&mut self, id: ProspectId, update: FieldUpdate) -> Result<(), StoreError> {
        let prospect = self.get_mut(id)?;
        let field = match update {
            FieldUpdate::LeadStatus(status) => {
                prospect.lead_status = status;
                "lead_status"
            }
            FieldUpdate::DealStage(stage) => {
                prospect.deal_stage = stage;
                "deal_stage"
            }
            FieldUpdate::DealValue(value) => {
                prospect.deal_value = value;
                prospect.deal_value_text.clear();
                "deal_value"
            }
            FieldUpdate::Priority(priority) => {
                prospect.priority = priority;
                "priority"
            }
            FieldUpdate::LeadScore(score) => {
                prospect.lead_score = score;
                "lead_score"
            }
            FieldUpdate::Owner(owner) => {
                prospect.owner = owner;
                "owner"
            }
            FieldUpdate::NextFollowUp(date) => {
                prospect.next_follow_up = date;
                "next_follow_up"
            }
            FieldUpdate::LastContact(date) => {
                prospect.last_contact = date;
                "last_contact"
            }
            FieldUpdate::CallDate(date) => {
                prospect.call_date = date;
                "call_date"
            }
            FieldUpdate::OpenedEmails(count) => {
                prospect.opened_emails = count;
                "opened_emails"
            }
            FieldUpdate::Replies(count) => {
                prospect.replies = count;
                "replies"
            }
            FieldUpdate::SendEmail(on) => {
                prospect.send_next_email(on)?;
                "emails"
            }
            FieldUpdate::EmailState { number, state } => {
                prospect.advance_email(number, state)?;
                "emails"
            }
        };
        info!(event_name = "store.prospect.updated", prospect_id = %id, field, "prospect updated");
        Ok(())
    }

    pub fn add_note(
        &mut self,
        id: ProspectId,
        note: &str,
        today: NaiveDate,
    ) -> Result<(), StoreError> {
        if note.trim().is_empty() {
            return Err(StoreError::MissingField("note"));
        }
        self.get_mut(id)?.append_note(note, today);
        info!(
            event_name = "store.prospect.updated",
            prospect_id = %id,
            field = "notes",
            "note added"
        );
        Ok(())
    }

    /// Sets the status of every listed prospect. Nothing changes if any id is unknown.
    pub fn bulk_update_status(
        &mut self,
        ids: &[ProspectId],
        status: LeadStatus,
    ) -> Result<usize, StoreError> {
        if let Some(missing) = ids.iter().find(|id| self.get(**id).is_none()) {
            return Err(StoreError::UnknownProspect(*missing));
        }
        let wanted: HashSet<ProspectId> = ids.iter().copied().collect();
        let mut updated = 0;
        for prospect in self.rows.iter_mut().filter(|prospect| wanted.contains(&prospect.id)) {
            prospect.lead_status = status;
            updated += 1;
        }
        info!(
            event_name = "store.prospect.updated",
            field = "lead_status",
            status = %status,
            prospects = updated,
            "bulk status update"
        );
        Ok(updated)
    }

    pub fn launch_campaign(
        &mut self,
        name: &str,
        target: &CampaignTarget,
        on: NaiveDate,
    ) -> Result<LaunchReport, StoreError> {
        let report = campaign::launch(&mut self.rows, target, on)?;
        info!(
            event_name = "store.campaign.launched",
            campaign = name,
            targeted = report.targeted,
            sent = report.sent.len(),
            exhausted = report.exhausted.len(),
            "campaign launched"
        );
        Ok(report)
    }

    /// Appends records under fresh ids, ignoring any ids they carry. Either every record is
    /// imported or none is.
    pub fn import(&mut self, records: Vec<ProspectRecord>) -> Result<Vec<ProspectId>, StoreError> {
        let mut next_id = self.next_id;
        let mut imported = Vec::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            let id = ProspectId(next_id);
            next_id = id_after(next_id)?;
            let prospect = record
                .into_prospect(id)
                .map_err(|source| StoreError::Record { row: index + 1, source })?;
            imported.push(prospect);
        }

        let ids: Vec<ProspectId> = imported.iter().map(|prospect| prospect.id).collect();
        self.next_id = next_id;
        self.rows.extend(imported);
        info!(event_name = "store.import.completed", prospects = ids.len(), "records imported");
        Ok(ids)
    }

    /// Replaces the table with demo rows. Ids handed out before the reset stay retired.
    pub fn reset_to_demo(&mut self, today: NaiveDate, seed: u64, extra: usize) {
        let retired = self.next_id;
        *self = Self::demo(today, seed, extra);
        self.next_id = self.next_id.max(retired);
        info!(event_name = "store.reset", prospects = self.rows.len(), "table reset to demo data");
    }

    pub fn export(&self, filter: ExportFilter) -> Vec<ProspectRecord> {
        self.rows
            .iter()
            .filter(|prospect| filter.matches(prospect))
            .map(ProspectRecord::from)
            .collect()
    }

    fn get_mut(&mut self, id: ProspectId) -> Result<&mut Prospect, StoreError> {
        self.rows
            .iter_mut()
            .find(|prospect| prospect.id == id)
            .ok_or(StoreError::UnknownProspect(id))
    }
}

fn id_after(id: u64) -> Result<u64, StoreError> {
    id.checked_add(1).ok_or(StoreError::IdSpaceExhausted(ProspectId(id)))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use coldcrm_core::domain::{
        DealStage, LeadScore, LeadStatus, OutreachState, Priority, ProspectId,
    };
    use coldcrm_core::{ApplicationError, CampaignTarget, DealValue, DomainError};

    use super::{ExportFilter, FieldUpdate, NewProspect, ProspectStore, StoreError};
    use crate::records::ProspectRecord;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date")
    }

    fn demo() -> ProspectStore {
        ProspectStore::demo(today(), 42, 0)
    }

    fn new_prospect() -> NewProspect {
        NewProspect {
            name: "Priya Patel".to_string(),
            company: "Northwind Labs".to_string(),
            email: "priya@northwind.com".to_string(),
            company_size: "Mid (51-500)".to_string(),
            priority: Some(Priority::Medium),
            lead_score: LeadScore::new(50).expect("score"),
            ..NewProspect::default()
        }
    }

    #[test]
    fn new_rejects_duplicate_ids() {
        let rows = demo().prospects().to_vec();
        let mut doubled = rows.clone();
        doubled.push(rows[0].clone());

        assert!(matches!(ProspectStore::new(doubled), Err(StoreError::DuplicateId(ProspectId(1)))));
    }

    #[test]
    fn add_assigns_next_id_and_defaults() {
        let mut store = demo();
        let id = store.add(new_prospect(), today()).expect("add");

        assert_eq!(id, ProspectId(7));
        let added = store.get(id).expect("added prospect");
        assert_eq!(added.company_size, "Mid");
        assert_eq!(added.lead_status, LeadStatus::New);
        assert_eq!(added.deal_stage, Some(DealStage::Prospecting));
        assert_eq!(added.deal_value, DealValue::Unknown);
        assert_eq!(added.next_follow_up, NaiveDate::from_ymd_opt(2026, 10, 20));
        assert_eq!(added.date_added, Some(today()));
        assert_eq!(store.add(new_prospect(), today()).expect("second add"), ProspectId(8));
    }

    #[test]
    fn add_requires_name_company_and_email() {
        let mut store = demo();
        let missing_email = NewProspect { email: "  ".to_string(), ..new_prospect() };

        assert!(matches!(
            store.add(missing_email, today()),
            Err(StoreError::MissingField("email"))
        ));
        assert_eq!(store.len(), 6);
    }

    #[test]
    fn update_applies_single_fields() {
        let mut store = demo();
        let id = ProspectId(1);
        store.update(id, FieldUpdate::DealStage(Some(DealStage::ClosedWon))).expect("stage");
        store.update(id, FieldUpdate::DealValue(DealValue::parse("$40K"))).expect("value");
        store.update(id, FieldUpdate::SendEmail(today())).expect("send");

        let jane = store.get(id).expect("jane");
        assert_eq!(jane.deal_stage, Some(DealStage::ClosedWon));
        assert!(jane.deal_value.is_known());
        assert_eq!(jane.lead_status, LeadStatus::Contacted);
        assert_eq!(jane.emails_dispatched(), 1);
    }

    #[test]
    fn update_rejects_illegal_email_transition() {
        let mut store = demo();
        let outcome = store.update(
            ProspectId(1),
            FieldUpdate::EmailState { number: 1, state: OutreachState::Opened },
        );

        assert!(matches!(
            outcome,
            Err(StoreError::Domain(DomainError::InvalidOutreachTransition { .. }))
        ));
        assert!(matches!(
            store.update(ProspectId(99), FieldUpdate::Replies(1)),
            Err(StoreError::UnknownProspect(ProspectId(99)))
        ));
    }

    #[test]
    fn notes_append_with_date_stamp() {
        let mut store = demo();
        store.add_note(ProspectId(4), "Asked for a security review", today()).expect("note");

        let david = store.get(ProspectId(4)).expect("david");
        assert!(david.notes.ends_with("\n[2026-10-19] Asked for a security review"));
    }

    #[test]
    fn bulk_update_is_all_or_nothing() {
        let mut store = demo();
        let outcome =
            store.bulk_update_status(&[ProspectId(1), ProspectId(42)], LeadStatus::Qualified);

        assert!(matches!(outcome, Err(StoreError::UnknownProspect(ProspectId(42)))));
        assert_eq!(store.get(ProspectId(1)).map(|p| p.lead_status), Some(LeadStatus::New));

        let updated = store
            .bulk_update_status(&[ProspectId(1), ProspectId(4)], LeadStatus::NotInterested)
            .expect("bulk update");
        assert_eq!(updated, 2);
        assert_eq!(
            store.get(ProspectId(4)).map(|p| p.lead_status),
            Some(LeadStatus::NotInterested)
        );
    }

    #[test]
    fn launch_campaign_contacts_new_leads() {
        let mut store = demo();
        let report = store
            .launch_campaign("Q4 outreach", &CampaignTarget::default(), today())
            .expect("launch");

        assert_eq!(report.targeted, 2);
        assert_eq!(report.sent, vec![(ProspectId(1), 1), (ProspectId(4), 1)]);
        assert!(store.prospects().iter().all(|p| p.lead_status != LeadStatus::New));
    }

    #[test]
    fn import_assigns_fresh_ids_atomically() {
        let mut store = demo();
        let records = vec![
            ProspectRecord { prospect_id: Some(1), name: "A".into(), ..ProspectRecord::default() },
            ProspectRecord { name: "B".into(), ..ProspectRecord::default() },
        ];
        assert_eq!(store.import(records).expect("import"), vec![ProspectId(7), ProspectId(8)]);

        let broken = vec![
            ProspectRecord { name: "C".to_string(), ..ProspectRecord::default() },
            ProspectRecord { lead_status: "Maybe".to_string(), ..ProspectRecord::default() },
        ];
        assert!(matches!(store.import(broken), Err(StoreError::Record { row: 2, .. })));
        assert_eq!(store.len(), 8);
    }

    #[test]
    fn from_records_keeps_stored_ids() {
        let records = vec![
            ProspectRecord { prospect_id: Some(10), name: "A".into(), ..ProspectRecord::default() },
            ProspectRecord { name: "B".into(), ..ProspectRecord::default() },
        ];
        let store = ProspectStore::from_records(records).expect("records load");
        let ids: Vec<ProspectId> = store.prospects().iter().map(|p| p.id).collect();

        assert_eq!(ids, vec![ProspectId(10), ProspectId(11)]);
    }

    #[test]
    fn export_filters_match_stage_and_priority() {
        let store = demo();

        assert_eq!(store.export(ExportFilter::All).len(), 6);
        assert_eq!(store.export(ExportFilter::ActiveDeals).len(), 3);
        assert_eq!(store.export(ExportFilter::HighPriority).len(), 4);
    }

    #[test]
    fn reset_restores_demo_rows() {
        let mut store = demo();
        store.add(new_prospect(), today()).expect("add");
        store.reset_to_demo(today(), 42, 0);

        assert_eq!(store.len(), 6);
        assert_eq!(store.add(new_prospect(), today()).expect("add"), ProspectId(8));
    }

    #[test]
    fn reset_keeps_ids_retired_after_imports() {
        let mut store = demo();
        let records = vec![ProspectRecord { name: "A".into(), ..ProspectRecord::default() }; 3];
        assert_eq!(store.import(records).expect("import").last(), Some(&ProspectId(9)));

        store.reset_to_demo(today(), 42, 0);
        assert_eq!(store.add(new_prospect(), today()).expect("add"), ProspectId(10));
    }

    #[test]
    fn largest_id_is_reported_instead_of_overflowing() {
        let at_limit = vec![ProspectRecord {
            prospect_id: Some(u64::MAX),
            name: "A".into(),
            ..ProspectRecord::default()
        }];
        assert!(matches!(
            ProspectStore::from_records(at_limit),
            Err(StoreError::IdSpaceExhausted(ProspectId(u64::MAX)))
        ));

        let below_limit = vec![
            ProspectRecord {
                prospect_id: Some(u64::MAX - 1),
                name: "A".into(),
                ..ProspectRecord::default()
            },
            ProspectRecord { name: "B".into(), ..ProspectRecord::default() },
        ];
        assert!(matches!(
            ProspectStore::from_records(below_limit),
            Err(StoreError::IdSpaceExhausted(ProspectId(u64::MAX)))
        ));
    }

    #[test]
    fn new_deal_value_replaces_unparsed_text() {
        let records = vec![ProspectRecord {
            name: "A".into(),
            deal_value: "$100K-$500K".into(),
            ..ProspectRecord::default()
        }];
        let mut store = ProspectStore::from_records(records).expect("records load");
        let id = ProspectId(1);
        assert_eq!(store.export(ExportFilter::All)[0].deal_value, "$100K-$500K");

        store.update(id, FieldUpdate::DealValue(DealValue::parse("$250,000.75"))).expect("value");
        assert_eq!(store.export(ExportFilter::All)[0].deal_value, "$250,000.75");
        assert_eq!(store.get(id).map(|p| p.deal_value_text.as_str()), Some(""));
    }

    #[test]
    fn store_errors_map_to_application_errors() {
        let mapped = ApplicationError::from(StoreError::UnknownProspect(ProspectId(3)));
        assert!(matches!(mapped, ApplicationError::Domain(DomainError::InvariantViolation(_))));

        let mapped = ApplicationError::from(StoreError::DuplicateId(ProspectId(3)));
        assert!(matches!(mapped, ApplicationError::Import(_)));
    }
}
