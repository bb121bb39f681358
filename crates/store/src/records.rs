//! Flat-file row shape of a prospect and its one-way conversion into the typed model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use coldcrm_core::domain::{EmailSlot, LeadScore, OutreachState, Prospect, ProspectId};
use coldcrm_core::{DealValue, DomainError};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("column `{column}` holds `{value}`, expected a YYYY-MM-DD date")]
    InvalidDate { column: &'static str, value: String },
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// One prospect as stored in CSV/JSON files. Every column is optional on input; text fields
/// default to empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProspectRecord {
    #[serde(rename = "Prospect ID")]
    pub prospect_id: Option<u64>,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Title / Role")]
    pub title: String,
    #[serde(rename = "Company")]
    pub company: String,
    #[serde(rename = "Industry")]
    pub industry: String,
    #[serde(rename = "Company Size")]
    pub company_size: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Phone")]
    pub phone: String,
    #[serde(rename = "LinkedIn URL")]
    pub linkedin_url: String,
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Date Added")]
    pub date_added: String,
    #[serde(rename = "Lead Status")]
    pub lead_status: String,
    #[serde(rename = "Owner")]
    pub owner: String,
    #[serde(rename = "Pain Point(s)")]
    pub pain_points: String,
    #[serde(rename = "Solution Interest")]
    pub solution_interest: String,
    #[serde(rename = "Priority")]
    pub priority: String,
    #[serde(rename = "Email 1 Date")]
    pub email_1_date: String,
    #[serde(rename = "Email 1 Status")]
    pub email_1_status: String,
    #[serde(rename = "Email 2 Date")]
    pub email_2_date: String,
    #[serde(rename = "Email 2 Status")]
    pub email_2_status: String,
    #[serde(rename = "Email 3 Date")]
    pub email_3_date: String,
    #[serde(rename = "Email 3 Status")]
    pub email_3_status: String,
    #[serde(rename = "Call / Demo Date")]
    pub call_date: String,
    #[serde(rename = "Deal Stage")]
    pub deal_stage: String,
    #[serde(rename = "Deal Value")]
    pub deal_value: String,
    #[serde(rename = "Notes")]
    pub notes: String,
    #[serde(rename = "Opened Emails")]
    pub opened_emails: Option<u32>,
    #[serde(rename = "Replies")]
    pub replies: Option<u32>,
    #[serde(rename = "Last Contact")]
    pub last_contact: String,
    #[serde(rename = "Next Follow Up")]
    pub next_follow_up: String,
    #[serde(rename = "Lead Score")]
    pub lead_score: Option<i64>,
    #[serde(rename = "Website")]
    pub website: String,
    #[serde(rename = "Employee Count")]
    pub employee_count: String,
    #[serde(rename = "Revenue")]
    pub revenue: String,
    #[serde(rename = "Budget")]
    pub budget: String,
}

impl ProspectRecord {
    /// Converts the record into a prospect with the given id, ignoring `prospect_id`.
    ///
    /// Empty status means `New`, empty stage and priority mean unset, a missing score means 0.
    /// Deal values that do not parse become unknown and keep their text for export. Email slots
    /// with only one of date and status are treated as not sent.
    pub fn into_prospect(self, id: ProspectId) -> Result<Prospect, RecordError> {
        let emails = [
            slot("Email 1 Date", &self.email_1_date, &self.email_1_status)?,
            slot("Email 2 Date", &self.email_2_date, &self.email_2_status)?,
            slot("Email 3 Date", &self.email_3_date, &self.email_3_status)?,
        ];

        let mut prospect = Prospect::new(id, self.name, self.company);
        prospect.title = self.title;
        prospect.industry = self.industry;
        prospect.company_size = self.company_size;
        prospect.location = self.location;
        prospect.email = self.email;
        prospect.phone = self.phone;
        prospect.linkedin_url = self.linkedin_url;
        prospect.website = self.website;
        prospect.source = self.source;
        prospect.owner = self.owner;
        prospect.lead_status = optional_label(&self.lead_status)?.unwrap_or_default();
        prospect.deal_stage = optional_label(&self.deal_stage)?;
        prospect.priority = optional_label(&self.priority)?;
        prospect.deal_value = DealValue::parse(&self.deal_value);
        if !prospect.deal_value.is_known() {
            prospect.deal_value_text = self.deal_value.trim().to_string();
        }
        prospect.lead_score = self.lead_score.map(LeadScore::new).transpose()?.unwrap_or_default();
        prospect.emails = emails;
        prospect.opened_emails = self.opened_emails.unwrap_or_default();
        prospect.replies = self.replies.unwrap_or_default();
        prospect.date_added = date("Date Added", &self.date_added)?;
        prospect.call_date = date("Call / Demo Date", &self.call_date)?;
        prospect.last_contact = date("Last Contact", &self.last_contact)?;
        prospect.next_follow_up = date("Next Follow Up", &self.next_follow_up)?;
        prospect.pain_points = self.pain_points;
        prospect.solution_interest = self.solution_interest;
        prospect.notes = self.notes;
        prospect.employee_count = self.employee_count;
        prospect.revenue = self.revenue;
        prospect.budget = self.budget;
        Ok(prospect)
    }
}

impl From<&Prospect> for ProspectRecord {
    fn from(prospect: &Prospect) -> Self {
        let [email_1, email_2, email_3] = prospect.emails;
        let (email_1_date, email_1_status) = slot_columns(&email_1);
        let (email_2_date, email_2_status) = slot_columns(&email_2);
        let (email_3_date, email_3_status) = slot_columns(&email_3);

        Self {
            prospect_id: Some(prospect.id.0),
            name: prospect.name.clone(),
            title: prospect.title.clone(),
            company: prospect.company.clone(),
            industry: prospect.industry.clone(),
            company_size: prospect.company_size.clone(),
            location: prospect.location.clone(),
            email: prospect.email.clone(),
            phone: prospect.phone.clone(),
            linkedin_url: prospect.linkedin_url.clone(),
            source: prospect.source.clone(),
            date_added: format_date(prospect.date_added),
            lead_status: prospect.lead_status.label().to_string(),
            owner: prospect.owner.clone(),
            pain_points: prospect.pain_points.clone(),
            solution_interest: prospect.solution_interest.clone(),
            priority: optional_text(prospect.priority.map(|priority| priority.label())),
            email_1_date,
            email_1_status,
            email_2_date,
            email_2_status,
            email_3_date,
            email_3_status,
            call_date: format_date(prospect.call_date),
            deal_stage: optional_text(prospect.deal_stage.map(|stage| stage.label())),
            deal_value: match prospect.deal_value {
                DealValue::Known(_) => prospect.deal_value.stored(),
                DealValue::Unknown => prospect.deal_value_text.clone(),
            },
            notes: prospect.notes.clone(),
            opened_emails: Some(prospect.opened_emails),
            replies: Some(prospect.replies),
            last_contact: format_date(prospect.last_contact),
            next_follow_up: format_date(prospect.next_follow_up),
            lead_score: Some(i64::from(prospect.lead_score.value())),
            website: prospect.website.clone(),
            employee_count: prospect.employee_count.clone(),
            revenue: prospect.revenue.clone(),
            budget: prospect.budget.clone(),
        }
    }
}

fn optional_label<T>(raw: &str) -> Result<Option<T>, DomainError>
where
    T: std::str::FromStr<Err = DomainError>,
{
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed.parse().map(Some)
}

fn optional_text(label: Option<&str>) -> String {
    label.map(str::to_string).unwrap_or_default()
}

fn date(column: &'static str, raw: &str) -> Result<Option<NaiveDate>, RecordError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    // Exports from spreadsheets sometimes carry a midnight timestamp.
    let day = trimmed.split(['T', ' ']).next().unwrap_or(trimmed);
    NaiveDate::parse_from_str(day, DATE_FORMAT)
        .map(Some)
        .map_err(|_| RecordError::InvalidDate { column, value: raw.to_string() })
}

fn slot(column: &'static str, raw_date: &str, raw_status: &str) -> Result<EmailSlot, RecordError> {
    let state: OutreachState = raw_status.parse()?;
    Ok(EmailSlot::from_parts(date(column, raw_date)?, state))
}

fn slot_columns(slot: &EmailSlot) -> (String, String) {
    (format_date(slot.sent_on()), slot.state().label().to_string())
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|date| date.format(DATE_FORMAT).to_string()).unwrap_or_default()
}
