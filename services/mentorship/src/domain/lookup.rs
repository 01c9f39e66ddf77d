//! Dropdown data: query shapes, static lists and provider fallbacks.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::types::AcademicLevel;

pub const EARLIEST_ACADEMIC_YEAR: i32 = 1980;
pub const MAX_INSTITUTIONS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupQuery {
    States,
    Cities { state: String },
    Institutions(InstitutionFilter),
    Degrees { level: AcademicLevel },
    Years,
}

impl LookupQuery {
    /// Cache key for provider-backed queries; `None` for static ones.
    pub fn cache_key(&self) -> Option<String> {
        match self {
            Self::States => Some("lookup:states:IN".to_owned()),
            Self::Cities { state } => Some(format!("lookup:cities:IN:{}", state.to_lowercase())),
            Self::Institutions(_) => Some("lookup:universities:IN".to_owned()),
            Self::Degrees { .. } | Self::Years => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstitutionFilter {
    pub state: String,
    pub city: String,
    pub degree: String,
}

/// University as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct University {
    pub name: String,
    #[serde(default)]
    pub state_province: Option<String>,
}

pub fn degrees(level: AcademicLevel) -> Vec<String> {
    let list: &[&str] = match level {
        AcademicLevel::Ug => &[
            "B.Tech Computer Science",
            "B.Tech Electronics",
            "B.Tech Mechanical",
            "B.Sc Computer Science",
            "BBA",
            "B.Com",
        ],
        AcademicLevel::Pg => &[
            "M.Tech Computer Science",
            "M.Tech Data Science",
            "MBA",
            "MCA",
        ],
    };
    list.iter().map(|s| (*s).to_owned()).collect()
}

/// Current year down to 1980, newest first.
pub fn years(current_year: i32) -> Vec<String> {
    (EARLIEST_ACADEMIC_YEAR..=current_year.max(EARLIEST_ACADEMIC_YEAR))
        .rev()
        .map(|y| y.to_string())
        .collect()
}

pub fn fallback_states() -> Vec<String> {
    [
        "Andhra Pradesh",
        "Delhi",
        "Gujarat",
        "Karnataka",
        "Maharashtra",
        "Tamil Nadu",
        "Telangana",
        "Uttar Pradesh",
        "West Bengal",
    ]
    .iter()
    .map(|s| (*s).to_owned())
    .collect()
}

const FALLBACK_CITIES: &[(&str, &[&str])] = &[
    ("Andhra Pradesh", &["Visakhapatnam", "Vijayawada", "Guntur", "Nellore"]),
    ("Arunachal Pradesh", &["Itanagar", "Tawang"]),
    ("Assam", &["Guwahati", "Silchar", "Dibrugarh"]),
    ("Bihar", &["Patna", "Gaya", "Bhagalpur"]),
    ("Chhattisgarh", &["Raipur", "Bhilai"]),
    ("Delhi", &["New Delhi"]),
    ("Goa", &["Panaji", "Margao"]),
    ("Gujarat", &["Ahmedabad", "Surat", "Vadodara", "Rajkot"]),
    ("Haryana", &["Gurugram", "Faridabad"]),
    ("Himachal Pradesh", &["Shimla", "Manali"]),
    ("Jharkhand", &["Ranchi", "Jamshedpur"]),
    ("Karnataka", &["Bengaluru", "Mysuru", "Mangaluru", "Hubballi"]),
    ("Kerala", &["Thiruvananthapuram", "Kochi", "Kozhikode"]),
    ("Madhya Pradesh", &["Bhopal", "Indore", "Gwalior"]),
    ("Maharashtra", &["Mumbai", "Pune", "Nagpur", "Nashik"]),
    ("Manipur", &["Imphal"]),
    ("Meghalaya", &["Shillong"]),
    ("Mizoram", &["Aizawl"]),
    ("Nagaland", &["Kohima", "Dimapur"]),
    ("Odisha", &["Bhubaneswar", "Cuttack"]),
    ("Punjab", &["Amritsar", "Ludhiana", "Jalandhar"]),
    ("Rajasthan", &["Jaipur", "Udaipur", "Jodhpur"]),
    ("Sikkim", &["Gangtok"]),
    ("Tamil Nadu", &["Chennai", "Coimbatore", "Madurai", "Salem"]),
    ("Telangana", &["Hyderabad", "Warangal", "Nizamabad"]),
    ("Tripura", &["Agartala"]),
    ("Uttar Pradesh", &["Lucknow", "Kanpur", "Noida", "Varanasi"]),
    ("Uttarakhand", &["Dehradun", "Haridwar"]),
    ("West Bengal", &["Kolkata", "Siliguri", "Durgapur"]),
];

pub fn fallback_cities(state: &str) -> Vec<String> {
    FALLBACK_CITIES
        .iter()
        .find(|(s, _)| s.eq_ignore_ascii_case(state.trim()))
        .map(|(_, cities)| cities.iter().map(|c| (*c).to_owned()).collect())
        .unwrap_or_default()
}

const CURATED_INSTITUTIONS: &[(&str, &str, &[&str])] = &[
    (
        "Karnataka",
        "Bengaluru",
        &[
            "Indian Institute of Science",
            "RV College of Engineering",
            "BMS College of Engineering",
            "PES University",
            "Dayananda Sagar College of Engineering",
        ],
    ),
    (
        "Maharashtra",
        "Pune",
        &[
            "College of Engineering Pune",
            "MIT World Peace University",
            "Symbiosis Institute of Technology",
            "Vishwakarma Institute of Technology",
        ],
    ),
    (
        "Tamil Nadu",
        "Chennai",
        &[
            "Anna University",
            "IIT Madras",
            "SSN College of Engineering",
            "SRM Institute of Science and Technology",
        ],
    ),
];

/// Curated names for an exact (state, city) match, else every curated entry
/// for the state.
fn curated_for(state: &str, city: &str) -> Vec<&'static str> {
    let exact: Vec<&'static str> = CURATED_INSTITUTIONS
        .iter()
        .filter(|(s, c, _)| *s == state && *c == city)
        .flat_map(|(_, _, names)| names.iter().copied())
        .collect();
    if !exact.is_empty() || state.is_empty() {
        return exact;
    }
    CURATED_INSTITUTIONS
        .iter()
        .filter(|(s, _, _)| *s == state)
        .flat_map(|(_, _, names)| names.iter().copied())
        .collect()
}

/// Filter provider universities by state/city substring, merge curated
/// entries, narrow by the degree's first keyword when that leaves anything,
/// then dedupe, sort and cap at 200.
pub fn filter_institutions(universities: &[University], filter: &InstitutionFilter) -> Vec<String> {
    let state = filter.state.trim();
    let city = filter.city.trim();
    let n_state = state.to_lowercase();
    let n_city = city.to_lowercase();
    let n_degree = filter
        .degree
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_lowercase();

    let mut candidates: Vec<String> = universities
        .iter()
        .filter(|u| !u.name.is_empty())
        .filter(|u| {
            let name = u.name.to_lowercase();
            let province = u.state_province.as_deref().unwrap_or_default().to_lowercase();
            let ok_state =
                n_state.is_empty() || province.contains(&n_state) || name.contains(&n_state);
            let ok_city = n_city.is_empty() || name.contains(&n_city);
            ok_state && ok_city
        })
        .map(|u| u.name.clone())
        .collect();

    candidates.extend(curated_for(state, city).into_iter().map(str::to_owned));

    if !n_degree.is_empty() {
        let narrowed: Vec<String> = candidates
            .iter()
            .filter(|n| n.to_lowercase().contains(&n_degree))
            .cloned()
            .collect();
        if !narrowed.is_empty() {
            candidates = narrowed;
        }
    }

    candidates
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .take(MAX_INSTITUTIONS)
        .collect()
}
