//! Built-in example process descriptions.

use std::fmt;

use serde::Serialize;

/// Rough size of a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Complexity {
    Simple,
    Medium,
    Complex,
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Simple => "Simple",
            Self::Medium => "Medium",
            Self::Complex => "Complex",
        };
        f.write_str(name)
    }
}

/// An example process description.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Scenario {
    /// Lookup key for `--scenario`
    pub key: &'static str,
    /// Display title, also used as the process name
    pub title: &'static str,
    pub complexity: Complexity,
    pub industry: &'static str,
    pub description: &'static str,
}

impl Scenario {
    /// Find a scenario by key (case-insensitive).
    pub fn find(key: &str) -> Option<&'static Self> {
        SCENARIOS.iter().find(|s| s.key.eq_ignore_ascii_case(key.trim()))
    }

    /// Keys of every scenario, comma separated.
    pub fn available_keys() -> String {
        SCENARIOS.iter().map(|s| s.key).collect::<Vec<_>>().join(", ")
    }
}

/// The scenario catalog.
pub static SCENARIOS: [Scenario; 3] = [
    Scenario {
        key: "procurement",
        title: "Supply Chain Procurement",
        complexity: Complexity::Simple,
        industry: "Manufacturing",
        description: "The procurement team identifies a need for materials or services and creates a purchase requisition. The requisition is reviewed and approved by the appropriate manager based on budget and authority levels. Suppliers are identified and requests for quotations are sent out. Supplier responses are evaluated based on price, quality, delivery time, and other criteria. A purchase order is created and sent to the selected supplier. The supplier confirms the order and provides delivery schedules. Goods are received and inspected for quality and quantity. Invoices are processed and payment is made according to agreed terms.",
    },
    Scenario {
        key: "rnd",
        title: "R&D new product or improvement to an existing one",
        complexity: Complexity::Medium,
        industry: "Manufacturing",
        description: "The process starts with identifying an idea for a new product or improvement to an
existing one . The R&D team conducts initial research and feasibility studies ,
followed by drafting design concepts . After selecting a promising design , a
prototype is built using available materials and resources . The prototype
undergoes various tests to assess its functionality , safety , and market potential .
Feedback from the testing phase is collected , and the prototype may be refined
accordingly . If a refinement is needed , then the testing phase is reinitiated . The
process ends when the prototype is either approved for further development or
discarded .",
    },
    Scenario {
        key: "enrollment",
        title: "University enrollment system",
        complexity: Complexity::Complex,
        industry: "Education",
        description: "A university enrollment system involves the following steps :
Prospective students submit an application online .
The admissions office reviews the application and supporting documents .
If documents are missing , the applicant is notified to provide the missing items .
Upon receiving all documents , the application is evaluated by the admissions
committee .
Concurrently , the finance department processes any application fees or waivers .
If the application is accepted , an acceptance letter is sent . Otherwise , a
rejection letter is sent and the process ends .
After being accepted , the student must then confirm enrollment by a specified
deadline ; otherwise the application will be canceled .
If the student confirms , they receive orientation materials and the IT department
sets up student accounts for email , online portals , and library access .
If the student is international , the international student office assists with visa
processing .
The student obtains a student ID card and starts creating their study plan , which
includes :
Meeting with an academic advisor .
Selecting courses .
Resolving any schedule conflicts .
The student begins attending classes .
Throughout each semester , the student may add or drop courses within the add / drop
period .
At the end of the semester , grades are posted , and the student can review them
online .
If the student has any grievances , they can file an appeal , which includes :
Submitting an appeal form .
Meeting with the appeals committee .
Awaiting a decision .
The process repeats each semester until the student graduates or withdraws .",
    },
];
