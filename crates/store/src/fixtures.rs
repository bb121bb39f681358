use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use coldcrm_core::domain::{
    DealStage, EmailSlot, LeadScore, LeadStatus, OutreachState, Priority, Prospect, ProspectId,
    EMAIL_SLOTS,
};
use coldcrm_core::DealValue;

/// Canonical demo prospects. Day offsets are relative to the day the dataset is built.
const DEMO_ROWS: &[DemoRow] = &[
    DemoRow {
        name: "Jane Smith",
        title: "CTO",
        company: "TechNova",
        industry: "Technology",
        company_size: "Mid",
        location: "San Francisco, CA",
        email: "jane@technova.com",
        phone: "555-123-4567",
        linkedin_url: "https://linkedin.com/in/janesmith",
        source: "LinkedIn",
        added_days_ago: 10,
        lead_status: LeadStatus::New,
        owner: "Rep A",
        pain_points: "Wants to automate reporting processes and reduce manual data entry",
        solution_interest: "AI Analytics",
        priority: Priority::High,
        emails: &[],
        call_offset: None,
        deal_stage: DealStage::Prospecting,
        deal_value: "",
        notes: "High potential lead - expanding team, budget approved for Q4",
        opened_emails: 0,
        replies: 0,
        last_contact_days_ago: None,
        follow_up_in_days: 2,
        lead_score: 85,
        website: "https://technova.com",
        employee_count: "250",
        revenue: "$50M",
        budget: "$100K-$500K",
    },
    DemoRow {
        name: "Mark Taylor",
        title: "Head of Marketing",
        company: "RetailPro",
        industry: "Retail",
        company_size: "Enterprise",
        location: "New York, NY",
        email: "mark@retailpro.com",
        phone: "555-987-6543",
        linkedin_url: "https://linkedin.com/in/marktaylor",
        source: "Trade Show",
        added_days_ago: 20,
        lead_status: LeadStatus::Contacted,
        owner: "Rep B",
        pain_points: "Needs AI for personalized customer engagement and inventory optimization",
        solution_interest: "AI Chatbots + Predictive Analytics",
        priority: Priority::High,
        emails: &[(18, OutreachState::Sent), (14, OutreachState::Opened)],
        call_offset: Some(2),
        deal_stage: DealStage::MeetingScheduled,
        deal_value: "$75,000",
        notes: "Very interested in demo, mentioned budget constraints but willing to explore ROI",
        opened_emails: 2,
        replies: 0,
        last_contact_days_ago: Some(14),
        follow_up_in_days: 2,
        lead_score: 92,
        website: "https://retailpro.com",
        employee_count: "1200",
        revenue: "$500M",
        budget: "$50K-$200K",
    },
    DemoRow {
        name: "Sofia Martinez",
        title: "Operations Manager",
        company: "HealthWorks",
        industry: "Healthcare",
        company_size: "Small",
        location: "Austin, TX",
        email: "sofia@healthworks.com",
        phone: "555-222-3333",
        linkedin_url: "https://linkedin.com/in/sofiam",
        source: "Outbound List",
        added_days_ago: 35,
        lead_status: LeadStatus::Qualified,
        owner: "Rep A",
        pain_points: "Reduce administrative overhead and improve patient data management",
        solution_interest: "RPA + AI Document Processing",
        priority: Priority::Medium,
        emails: &[
            (30, OutreachState::Opened),
            (27, OutreachState::Opened),
            (22, OutreachState::Replied),
        ],
        call_offset: Some(-20),
        deal_stage: DealStage::ProposalSent,
        deal_value: "$25,000",
        notes: "Positive response, evaluating budget. Decision maker identified as Dr. Wilson (CEO)",
        opened_emails: 3,
        replies: 1,
        last_contact_days_ago: Some(20),
        follow_up_in_days: 3,
        lead_score: 78,
        website: "https://healthworks.com",
        employee_count: "45",
        revenue: "$8M",
        budget: "$10K-$50K",
    },
    DemoRow {
        name: "David Chen",
        title: "VP of Engineering",
        company: "DataFlow Systems",
        industry: "Software",
        company_size: "Mid",
        location: "Seattle, WA",
        email: "dchen@dataflow.com",
        phone: "555-444-5555",
        linkedin_url: "https://linkedin.com/in/davidchen",
        source: "Referral",
        added_days_ago: 5,
        lead_status: LeadStatus::New,
        owner: "Rep C",
        pain_points: "Scaling data processing and reducing infrastructure costs",
        solution_interest: "AI-Powered Data Pipeline",
        priority: Priority::High,
        emails: &[],
        call_offset: None,
        deal_stage: DealStage::Prospecting,
        deal_value: "",
        notes: "Warm referral from existing client. Very technical background",
        opened_emails: 0,
        replies: 0,
        last_contact_days_ago: None,
        follow_up_in_days: 1,
        lead_score: 90,
        website: "https://dataflow.com",
        employee_count: "180",
        revenue: "$25M",
        budget: "$200K+",
    },
    DemoRow {
        name: "Emma Johnson",
        title: "Chief Innovation Officer",
        company: "GreenTech Solutions",
        industry: "Clean Energy",
        company_size: "Enterprise",
        location: "Denver, CO",
        email: "emma@greentech.com",
        phone: "555-777-8888",
        linkedin_url: "https://linkedin.com/in/emmajohnson",
        source: "Webinar",
        added_days_ago: 15,
        lead_status: LeadStatus::Contacted,
        owner: "Rep B",
        pain_points: "Optimize energy distribution and predict maintenance needs",
        solution_interest: "Predictive AI + IoT Integration",
        priority: Priority::Medium,
        emails: &[(12, OutreachState::Opened), (8, OutreachState::Clicked)],
        call_offset: None,
        deal_stage: DealStage::Prospecting,
        deal_value: "$150,000",
        notes: "Attended our webinar, downloaded whitepaper. Engaged but cautious about timeline",
        opened_emails: 2,
        replies: 0,
        last_contact_days_ago: Some(8),
        follow_up_in_days: 1,
        lead_score: 72,
        website: "https://greentech.com",
        employee_count: "800",
        revenue: "$200M",
        budget: "$100K-$300K",
    },
    DemoRow {
        name: "Michael Brown",
        title: "Director of Operations",
        company: "LogiCorp",
        industry: "Logistics",
        company_size: "Enterprise",
        location: "Chicago, IL",
        email: "mbrown@logicorp.com",
        phone: "555-333-2222",
        linkedin_url: "https://linkedin.com/in/michaelbrown",
        source: "Cold Email",
        added_days_ago: 45,
        lead_status: LeadStatus::Qualified,
        owner: "Rep A",
        pain_points: "Route optimization and warehouse automation challenges",
        solution_interest: "AI Route Optimization",
        priority: Priority::High,
        emails: &[
            (42, OutreachState::Opened),
            (38, OutreachState::Replied),
            (32, OutreachState::Opened),
        ],
        call_offset: Some(-28),
        deal_stage: DealStage::Negotiation,
        deal_value: "$200,000",
        notes: "In final negotiations. Comparing with competitors. Price sensitive but sees value",
        opened_emails: 3,
        replies: 2,
        last_contact_days_ago: Some(5),
        follow_up_in_days: 2,
        lead_score: 88,
        website: "https://logicorp.com",
        employee_count: "2500",
        revenue: "$1.2B",
        budget: "$500K+",
    },
];

const FIRST_NAMES: &[&str] =
    &["Olivia", "Liam", "Ava", "Noah", "Priya", "Mateo", "Hannah", "Kenji", "Zara", "Lucas"];
const LAST_NAMES: &[&str] =
    &["Anderson", "Patel", "Nguyen", "Garcia", "Kowalski", "Okafor", "Rossi", "Lindqvist"];
const COMPANY_STEMS: &[&str] =
    &["Apex", "Northwind", "Bluepeak", "Crestline", "Vertex", "Harbor", "Quantum", "Summit"];
const COMPANY_SUFFIXES: &[&str] = &["Labs", "Group", "Systems", "Analytics", "Partners"];
const INDUSTRIES: &[&str] =
    &["Technology", "Healthcare", "Retail", "Manufacturing", "Finance", "Education", "Logistics"];
const COMPANY_SIZES: &[&str] = &["Small", "Mid", "Enterprise"];
const SOURCES: &[&str] =
    &["LinkedIn", "Cold Email", "Referral", "Trade Show", "Webinar", "Website"];
const OWNERS: &[&str] = &["Rep A", "Rep B", "Rep C", "Rep D"];
const DEAL_SIZES: &[i64] = &[10_000, 25_000, 50_000, 75_000, 120_000, 250_000];

/// Deterministic demo dataset: the canonical rows plus optional seeded extras.
pub struct DemoDataset;

impl DemoDataset {
    pub const CANONICAL_ROWS: usize = 6;

    pub fn canonical(today: NaiveDate) -> Vec<Prospect> {
        DEMO_ROWS
            .iter()
            .enumerate()
            .map(|(index, row)| row.build(ProspectId(index as u64 + 1), today))
            .collect()
    }

    /// Canonical rows followed by `extra` generated prospects. The same seed and day always
    /// produce the same table.
    pub fn generate(today: NaiveDate, seed: u64, extra: usize) -> Vec<Prospect> {
        let mut rows = Self::canonical(today);
        let mut rng = StdRng::seed_from_u64(seed);
        let first_id = rows.len() as u64 + 1;
        rows.extend(
            (0..extra as u64)
                .map(|offset| random_prospect(&mut rng, ProspectId(first_id + offset), today)),
        );
        rows
    }
}

struct DemoRow {
    name: &'static str,
    title: &'static str,
    company: &'static str,
    industry: &'static str,
    company_size: &'static str,
    location: &'static str,
    email: &'static str,
    phone: &'static str,
    linkedin_url: &'static str,
    source: &'static str,
    added_days_ago: i64,
    lead_status: LeadStatus,
    owner: &'static str,
    pain_points: &'static str,
    solution_interest: &'static str,
    priority: Priority,
    /// Days ago each email went out, with its current state.
    emails: &'static [(i64, OutreachState)],
    /// Days from today; negative values lie in the past.
    call_offset: Option<i64>,
    deal_stage: DealStage,
    deal_value: &'static str,
    notes: &'static str,
    opened_emails: u32,
    replies: u32,
    last_contact_days_ago: Option<i64>,
    follow_up_in_days: i64,
    lead_score: u8,
    website: &'static str,
    employee_count: &'static str,
    revenue: &'static str,
    budget: &'static str,
}

impl DemoRow {
    fn build(&self, id: ProspectId, today: NaiveDate) -> Prospect {
        let ago = |days: i64| today - Duration::days(days);

        let mut prospect = Prospect::new(id, self.name, self.company);
        prospect.title = self.title.to_string();
        prospect.industry = self.industry.to_string();
        prospect.company_size = self.company_size.to_string();
        prospect.location = self.location.to_string();
        prospect.email = self.email.to_string();
        prospect.phone = self.phone.to_string();
        prospect.linkedin_url = self.linkedin_url.to_string();
        prospect.website = self.website.to_string();
        prospect.source = self.source.to_string();
        prospect.owner = self.owner.to_string();
        prospect.lead_status = self.lead_status;
        prospect.deal_stage = Some(self.deal_stage);
        prospect.priority = Some(self.priority);
        prospect.deal_value = DealValue::parse(self.deal_value);
        prospect.lead_score = LeadScore::new(i64::from(self.lead_score)).unwrap_or_default();
        for (slot, (days_ago, state)) in prospect.emails.iter_mut().zip(self.emails) {
            *slot = EmailSlot::sent(ago(*days_ago), *state);
        }
        prospect.opened_emails = self.opened_emails;
        prospect.replies = self.replies;
        prospect.date_added = Some(ago(self.added_days_ago));
        prospect.call_date = self.call_offset.map(|offset| today + Duration::days(offset));
        prospect.last_contact = self.last_contact_days_ago.map(ago);
        prospect.next_follow_up = Some(today + Duration::days(self.follow_up_in_days));
        prospect.pain_points = self.pain_points.to_string();
        prospect.solution_interest = self.solution_interest.to_string();
        prospect.notes = self.notes.to_string();
        prospect.employee_count = self.employee_count.to_string();
        prospect.revenue = self.revenue.to_string();
        prospect.budget = self.budget.to_string();
        prospect
    }
}

fn pick<'a, T>(rng: &mut StdRng, values: &'a [T]) -> &'a T {
    // Every pool above is non-empty.
    &values[rng.gen_range(0..values.len())]
}

fn random_prospect(rng: &mut StdRng, id: ProspectId, today: NaiveDate) -> Prospect {
    let first = *pick(rng, FIRST_NAMES);
    let last = *pick(rng, LAST_NAMES);
    let company = format!("{} {}", pick(rng, COMPANY_STEMS), pick(rng, COMPANY_SUFFIXES));
    let domain: String = company.to_ascii_lowercase().split_whitespace().collect();

    let mut prospect = Prospect::new(id, format!("{first} {last}"), company);
    prospect.industry = pick(rng, INDUSTRIES).to_string();
    prospect.company_size = pick(rng, COMPANY_SIZES).to_string();
    prospect.source = pick(rng, SOURCES).to_string();
    prospect.owner = pick(rng, OWNERS).to_string();
    prospect.email = format!("{}@{domain}.com", first.to_ascii_lowercase());
    prospect.website = format!("https://{domain}.com");
    prospect.priority = Some(*pick(rng, &[Priority::High, Priority::Medium, Priority::Low]));
    prospect.lead_score = LeadScore::new(rng.gen_range(40..=98)).unwrap_or_default();

    let added_days_ago = rng.gen_range(1..=60);
    let added = today - Duration::days(added_days_ago);
    prospect.date_added = Some(added);
    prospect.next_follow_up = Some(today + Duration::days(rng.gen_range(0..=7)));

    let sent = rng.gen_range(0..=EMAIL_SLOTS).min(added_days_ago as usize);
    if sent == 0 {
        return prospect;
    }

    let mut day = added;
    for slot in prospect.emails.iter_mut().take(sent) {
        day += Duration::days(rng.gen_range(1..=4));
        let state = *pick(rng, &OutreachState::ALL[1..]);
        *slot = EmailSlot::sent(day.min(today), state);
    }
    let opened = prospect.emails.iter().filter(|slot| slot.state() != OutreachState::Sent).count();
    let replied =
        prospect.emails.iter().filter(|slot| slot.state() == OutreachState::Replied).count();
    prospect.opened_emails = opened as u32;
    prospect.replies = replied as u32;
    prospect.last_contact = prospect.emails.iter().filter_map(|slot| slot.sent_on()).max();

    prospect.lead_status = if replied > 0 {
        *pick(rng, &[LeadStatus::Replied, LeadStatus::Qualified])
    } else {
        *pick(rng, &[LeadStatus::Contacted, LeadStatus::Opened, LeadStatus::NotInterested])
    };
    prospect.deal_stage = Some(match prospect.lead_status {
        LeadStatus::Qualified => {
            *pick(rng, &[DealStage::ProposalSent, DealStage::Negotiation, DealStage::ClosedWon])
        }
        LeadStatus::Replied => DealStage::MeetingScheduled,
        LeadStatus::NotInterested => DealStage::ClosedLost,
        _ => DealStage::Prospecting,
    });
    if prospect.deal_stage != Some(DealStage::Prospecting) || rng.gen_bool(0.3) {
        prospect.deal_value = DealValue::Known((*pick(rng, DEAL_SIZES)).into());
    }
    prospect
}
