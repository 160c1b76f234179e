//! Route table for the portal.

use crate::session::Role;

/// Pages inside the patient area (`/patient/...`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatientPage {
    Dashboard,
    Labs,
    Lifestyle,
    Symptoms,
    Mental,
    Chronic,
    Diet,
    DiabetesRisk,
    Appointments,
    Chatbot,
    History,
    Profile,
    Risk,
    Reports,
}

impl PatientPage {
    const ALL: [Self; 14] = [
        Self::Dashboard,
        Self::Labs,
        Self::Lifestyle,
        Self::Symptoms,
        Self::Mental,
        Self::Chronic,
        Self::Diet,
        Self::DiabetesRisk,
        Self::Appointments,
        Self::Chatbot,
        Self::History,
        Self::Profile,
        Self::Risk,
        Self::Reports,
    ];

    /// Path segment below `/patient` (empty for the dashboard).
    #[must_use]
    pub fn segment(self) -> &'static str {
        match self {
            Self::Dashboard => "",
            Self::Labs => "labs",
            Self::Lifestyle => "lifestyle",
            Self::Symptoms => "symptoms",
            Self::Mental => "mental",
            Self::Chronic => "chronic",
            Self::Diet => "diet",
            Self::DiabetesRisk => "diabetes-risk",
            Self::Appointments => "appointments",
            Self::Chatbot => "chatbot",
            Self::History => "history",
            Self::Profile => "profile",
            Self::Risk => "risk",
            Self::Reports => "reports",
        }
    }

    fn from_segment(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|page| page.segment() == segment)
    }
}

/// Pages inside the doctor area (`/doctor/...`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DoctorPage {
    Dashboard,
    Patients,
    PatientDetail(String),
}

/// A screen the portal can show.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    /// Public landing page at `/`.
    Landing,
    Login,
    Register,
    Patient(PatientPage),
    Doctor(DoctorPage),
}

impl Route {
    /// Parses a normalised path. Unknown paths yield `None`.
    #[must_use]
    pub fn parse(path: &str) -> Option<Self> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Some(Self::Landing),
            ["login"] => Some(Self::Login),
            ["register"] => Some(Self::Register),
            ["patient"] => Some(Self::Patient(PatientPage::Dashboard)),
            ["patient", page] => PatientPage::from_segment(page).map(Self::Patient),
            ["doctor"] => Some(Self::Doctor(DoctorPage::Dashboard)),
            ["doctor", "patients"] => Some(Self::Doctor(DoctorPage::Patients)),
            ["doctor", "patients", id] => Some(Self::Doctor(DoctorPage::PatientDetail((*id).to_string()))),
            _ => None,
        }
    }

    /// Canonical path of this route.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Landing => "/".to_string(),
            Self::Login => "/login".to_string(),
            Self::Register => "/register".to_string(),
            Self::Patient(PatientPage::Dashboard) => "/patient".to_string(),
            Self::Patient(page) => format!("/patient/{}", page.segment()),
            Self::Doctor(DoctorPage::Dashboard) => "/doctor".to_string(),
            Self::Doctor(DoctorPage::Patients) => "/doctor/patients".to_string(),
            Self::Doctor(DoctorPage::PatientDetail(id)) => format!("/doctor/patients/{}", id),
        }
    }

    /// Role needed to see this route; `None` for public screens.
    #[must_use]
    pub fn required_role(&self) -> Option<Role> {
        match self {
            Self::Landing | Self::Login | Self::Register => None,
            Self::Patient(_) => Some(Role::Patient),
            Self::Doctor(_) => Some(Role::Doctor),
        }
    }

    /// Whether the screen is only meant for signed-out visitors.
    #[must_use]
    pub fn is_auth_surface(&self) -> bool {
        matches!(self, Self::Login | Self::Register)
    }
}

/// Strips query, fragment and trailing slashes.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or("");
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

/// A sidebar entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavLink {
    pub path: &'static str,
    pub label: &'static str,
}

const PATIENT_LINKS: &[NavLink] = &[
    NavLink { path: "/patient", label: "Dashboard" },
    NavLink { path: "/patient/labs", label: "Lab Reports" },
    NavLink { path: "/patient/lifestyle", label: "Lifestyle Score" },
    NavLink { path: "/patient/symptoms", label: "Symptom Checker" },
    NavLink { path: "/patient/mental", label: "Mental Wellness" },
    NavLink { path: "/patient/chronic", label: "Blood Pressure" },
    NavLink { path: "/patient/diet", label: "Diet Plan" },
    NavLink { path: "/patient/diabetes-risk", label: "Diabetes Risk" },
    NavLink { path: "/patient/appointments", label: "Appointments" },
    NavLink { path: "/patient/chatbot", label: "Health Chat" },
    NavLink { path: "/patient/history", label: "History" },
    NavLink { path: "/patient/profile", label: "Profile" },
];

const DOCTOR_LINKS: &[NavLink] = &[
    NavLink { path: "/doctor", label: "Dashboard" },
    NavLink { path: "/doctor/patients", label: "Patients" },
];

/// Ordered sidebar links for a role.
#[must_use]
pub fn nav_links(role: Role) -> &'static [NavLink] {
    match role {
        Role::Patient => PATIENT_LINKS,
        Role::Doctor => DOCTOR_LINKS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_public_routes() {
        assert_eq!(Route::parse("/"), Some(Route::Landing));
        assert_eq!(Route::parse("/login"), Some(Route::Login));
        assert_eq!(Route::parse("/register"), Some(Route::Register));
    }

    #[test]
    fn test_parse_patient_routes() {
        assert_eq!(Route::parse("/patient"), Some(Route::Patient(PatientPage::Dashboard)));
        assert_eq!(Route::parse("/patient/diabetes-risk"), Some(Route::Patient(PatientPage::DiabetesRisk)));
        assert_eq!(Route::parse("/patient/unknown"), None);
        assert_eq!(Route::parse("/patient/labs/extra"), None);
    }

    #[test]
    fn test_parse_doctor_routes() {
        assert_eq!(Route::parse("/doctor"), Some(Route::Doctor(DoctorPage::Dashboard)));
        assert_eq!(Route::parse("/doctor/patients"), Some(Route::Doctor(DoctorPage::Patients)));
        assert_eq!(
            Route::parse("/doctor/patients/p-42"),
            Some(Route::Doctor(DoctorPage::PatientDetail("p-42".to_string())))
        );
        assert_eq!(Route::parse("/doctor/schedule"), None);
    }

    #[test]
    fn test_every_patient_page_round_trips() {
        for page in PatientPage::ALL {
            let route = Route::Patient(page);
            assert_eq!(Route::parse(&route.path()), Some(route));
        }
    }

    #[test]
    fn test_required_roles() {
        assert_eq!(Route::Landing.required_role(), None);
        assert_eq!(Route::Login.required_role(), None);
        assert_eq!(Route::Patient(PatientPage::Profile).required_role(), Some(Role::Patient));
        assert_eq!(Route::Doctor(DoctorPage::Patients).required_role(), Some(Role::Doctor));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("/doctor/"), "/doctor");
        assert_eq!(normalize_path("doctor/patients"), "/doctor/patients");
        assert_eq!(normalize_path("/patient/labs?tab=recent#top"), "/patient/labs");
    }

    #[test]
    fn test_nav_links_are_reachable_by_role() {
        for role in [Role::Patient, Role::Doctor] {
            let links = nav_links(role);
            assert_eq!(links[0].path, role.home_path());
            for link in links {
                let route = Route::parse(link.path).unwrap();
                assert_eq!(route.required_role(), Some(role), "link {}", link.path);
            }
        }
        assert_eq!(nav_links(Role::Patient).len(), 12);
        assert_eq!(nav_links(Role::Doctor).len(), 2);
    }
}
