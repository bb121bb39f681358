//! Built-in outreach email templates and placeholder personalisation.

use serde::Serialize;

use crate::domain::Prospect;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct EmailTemplate {
    pub name: &'static str,
    pub subject: &'static str,
    pub body: &'static str,
}

pub static TEMPLATES: [EmailTemplate; 4] = [
    EmailTemplate {
        name: "Initial Outreach",
        subject: "Quick question about [Company Name]'s [pain point]",
        body: "Hi [First Name],\n\n\
I noticed [Company Name] is [relevant observation about their business].\n\n\
Many companies in [industry] are facing similar challenges with [pain point]. \
We've helped businesses like yours [specific benefit/result].\n\n\
Would you be open to a brief conversation about how we could help [Company Name] achieve \
similar results?\n\n\
Best regards,\n[Your Name]\n[Your Title]\n[Company]",
    },
    EmailTemplate {
        name: "Follow-up",
        subject: "Following up on [Company Name] + [Your Company]",
        body: "Hi [First Name],\n\n\
I wanted to follow up on my previous email about helping [Company Name] with [pain point].\n\n\
I came across this case study of how [similar company] achieved [specific result] using our \
solution: [link or brief description]\n\n\
Would you like to see how this could apply to [Company Name]?\n\n\
Best,\n[Your Name]",
    },
    EmailTemplate {
        name: "Value Proposition",
        subject: "How [Competitor/Similar Company] reduced costs by 30%",
        body: "Hi [First Name],\n\n\
I thought you'd find this interesting:\n\n\
[Similar Company] recently implemented our AI solution and saw:\n\
• 30% reduction in operational costs\n\
• 50% faster processing times\n\
• 90% accuracy improvement\n\n\
Given [Company Name]'s focus on [relevant area], I believe we could deliver similar results \
for you.\n\n\
Would you like a 15-minute call to explore this?\n\n\
Best regards,\n[Your Name]",
    },
    EmailTemplate {
        name: "Final Attempt",
        subject: "Should I close your file?",
        body: "Hi [First Name],\n\n\
I've reached out a few times about helping [Company Name] with [pain point], but haven't \
heard back.\n\n\
Should I assume this isn't a priority right now and close your file?\n\n\
If the timing isn't right, just let me know when might be better to reconnect.\n\n\
Best,\n[Your Name]",
    },
];

pub fn find(name: &str) -> Option<&'static EmailTemplate> {
    let wanted = name.trim();
    TEMPLATES.iter().find(|template| template.name.eq_ignore_ascii_case(wanted))
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RenderedEmail {
    pub subject: String,
    pub body: String,
}

impl EmailTemplate {
    /// Fills the prospect placeholders. Placeholders whose field is empty are left in place so
    /// the sender can see what still needs writing.
    pub fn personalize(&self, prospect: &Prospect) -> RenderedEmail {
        let first_name = prospect.name.split_whitespace().next().unwrap_or_default();
        let replacements = [
            ("[First Name]", first_name),
            ("[Company Name]", prospect.company.as_str()),
            ("[industry]", prospect.industry.as_str()),
            ("[pain point]", prospect.pain_points.as_str()),
        ];
        let fill = |text: &str| {
            replacements.iter().fold(text.to_string(), |text, (placeholder, value)| {
                if value.trim().is_empty() {
                    text
                } else {
                    text.replace(placeholder, value.trim())
                }
            })
        };
        RenderedEmail { subject: fill(self.subject), body: fill(self.body) }
    }
}
