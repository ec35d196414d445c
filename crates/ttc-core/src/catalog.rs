//! Default charity catalog
//!
//! The three approved recipients, used directly when no hosted collection is
//! configured and as the seed set for one that is.

use crate::types::Charity;

/// Identifiers of the charities the site lists
pub const APPROVED_IDS: [&str; 3] = [
    "global-water-foundation",
    "education-for-all",
    "childrens-health-fund",
];

/// Check if a charity id is one of the approved recipients
#[inline]
#[must_use]
pub fn is_approved(id: &str) -> bool {
    APPROVED_IDS.contains(&id)
}

/// Keep only approved charities, preserving order
///
/// Returns the defaults when nothing approved is left.
#[must_use]
pub fn filter_approved(charities: Vec<Charity>) -> Vec<Charity> {
    let approved: Vec<Charity> = charities
        .into_iter()
        .filter(|c| is_approved(&c.id))
        .collect();
    if approved.is_empty() {
        default_charities()
    } else {
        approved
    }
}

/// Look up a default charity by id
#[must_use]
pub fn default_charity(id: &str) -> Option<Charity> {
    default_charities().into_iter().find(|c| c.id == id)
}

fn goals(items: &[&str]) -> Vec<String> {
    items.iter().map(|g| (*g).to_string()).collect()
}

/// The built-in charity records
#[must_use]
pub fn default_charities() -> Vec<Charity> {
    vec![
        Charity {
            id: "global-water-foundation".to_string(),
            name: "Global Water Foundation".to_string(),
            category: "Environment".to_string(),
            description: "Provides clean water access to communities in need around the world."
                .to_string(),
            long_description: Some(
                "The Global Water Foundation is dedicated to ensuring that every community has \
                 access to clean, safe water. We work with local partners to build sustainable \
                 water infrastructure, educate communities on water conservation and sanitation \
                 practices, and advocate for water as a basic human right. Our projects include \
                 well construction, rainwater harvesting systems, and water purification \
                 technologies."
                    .to_string(),
            ),
            impact: "1,500,000 people provided with clean water access".to_string(),
            location: "Global".to_string(),
            image_url: "/images/charities/global-water-foundation.jpg".to_string(),
            slug: None,
            goals: goals(&[
                "Provide clean water to 5 million people by 2030",
                "Implement water sanitation programs in 1000 communities",
                "Create sustainable water management systems in water-stressed regions",
            ]),
            wallet: Some("0xA1B2c3D4e5F6g7H8i9J0k1L2m3N4o5P6q7R8s9".to_string()),
        },
        Charity {
            id: "education-for-all".to_string(),
            name: "Education For All".to_string(),
            category: "Education".to_string(),
            description: "Supports schools and educational programs in underserved communities."
                .to_string(),
            long_description: Some(
                "Education For All believes that every child deserves access to quality \
                 education regardless of their background or circumstances. We partner with \
                 local schools and communities to improve educational infrastructure, provide \
                 learning materials, train teachers, and offer scholarships to students in \
                 need. Our holistic approach addresses the various barriers to education, from \
                 physical access to quality of teaching."
                    .to_string(),
            ),
            impact: "250,000 children gained access to quality education".to_string(),
            location: "Multiple Countries".to_string(),
            image_url: "/images/charities/education-for-all.jpg".to_string(),
            slug: None,
            goals: goals(&[
                "Build or renovate 500 schools in underserved areas",
                "Provide educational materials to 1 million students",
                "Train 10,000 teachers in modern teaching methods",
            ]),
            wallet: Some("0xB2C3d4E5f6G7h8I9j0K1l2M3n4O5p6Q7r8S9".to_string()),
        },
        Charity {
            id: "childrens-health-fund".to_string(),
            name: "Children's Health Fund".to_string(),
            category: "Health".to_string(),
            description: "Provides medical care and health services to children in need."
                .to_string(),
            long_description: Some(
                "The Children's Health Fund is committed to ensuring that every child has \
                 access to comprehensive healthcare services. We operate mobile medical \
                 clinics, support pediatric facilities in underserved areas, provide \
                 vaccinations and preventive care, and offer specialized treatments for \
                 children with chronic conditions. Our team of dedicated healthcare \
                 professionals works tirelessly to improve children's health outcomes \
                 worldwide."
                    .to_string(),
            ),
            impact: "500,000 children received essential healthcare".to_string(),
            location: "Global".to_string(),
            image_url: "/images/charities/childrens-health-fund.jpg".to_string(),
            slug: None,
            goals: goals(&[
                "Provide healthcare access to 1 million children by 2030",
                "Deploy 50 mobile medical clinics in remote areas",
                "Conduct health screenings and vaccinations for 2 million children",
            ]),
            wallet: Some("0xC3D4e5F6g7H8i9J0k1L2m3N4o5P6q7R8s9T0".to_string()),
        },
    ]
}
