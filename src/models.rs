use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MouRecord {
    pub institute_name: String,
    pub start_date: String,
    pub end_date: String,
    pub signed_by: String,
    pub faculty_details: String,
    pub academic_year: String,
    pub purpose: String,
    pub outcomes: String,
    pub agreement_file_id: String,
    pub file_name: String,
    pub created_by: String,
    pub created_at: String,
    #[serde(skip)]
    pub ordinal_index: usize,
}

impl MouRecord {
    pub fn from_row(ordinal_index: usize, cells: &[String]) -> Self {
        let cell = |i: usize| cells.get(i).cloned().unwrap_or_default();
        Self {
            institute_name: cell(0),
            start_date: cell(1),
            end_date: cell(2),
            signed_by: cell(3),
            faculty_details: cell(4),
            academic_year: cell(5),
            purpose: cell(6),
            outcomes: cell(7),
            agreement_file_id: cell(8),
            file_name: cell(9),
            created_by: cell(10),
            created_at: cell(11),
            ordinal_index,
        }
    }

    pub fn to_row(&self) -> Vec<String> {
        self.field_values().iter().map(|v| v.to_string()).collect()
    }

    pub fn field_values(&self) -> [&str; 12] {
        [
            &self.institute_name,
            &self.start_date,
            &self.end_date,
            &self.signed_by,
            &self.faculty_details,
            &self.academic_year,
            &self.purpose,
            &self.outcomes,
            &self.agreement_file_id,
            &self.file_name,
            &self.created_by,
            &self.created_at,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub institute_name: String,
    pub message: String,
    pub end_date: String,
}

#[derive(Debug, Clone)]
pub struct DashboardStats {
    pub total: usize,
    pub active: usize,
    pub expiring_soon: usize,
}

#[derive(Debug, Clone, Default)]
pub struct MouFilter {
    pub query: Option<String>,
    pub academic_year: Option<String>,
    pub institute: Option<String>,
    pub faculty: Option<String>,
    pub duration: Option<String>,
}

impl MouFilter {
    pub fn is_empty(&self) -> bool {
        self.query.is_none()
            && self.academic_year.is_none()
            && self.institute.is_none()
            && self.faculty.is_none()
            && self.duration.is_none()
    }

    pub fn matches(&self, record: &MouRecord) -> bool {
        if let Some(query) = &self.query {
            if !record
                .field_values()
                .iter()
                .any(|value| contains_ci(value, query))
            {
                return false;
            }
        }
        if let Some(year) = &self.academic_year {
            if !contains_ci(&record.academic_year, year) {
                return false;
            }
        }
        if let Some(institute) = &self.institute {
            if !contains_ci(&record.institute_name, institute) {
                return false;
            }
        }
        if let Some(faculty) = &self.faculty {
            if !contains_ci(&record.faculty_details, faculty) {
                return false;
            }
        }
        if let Some(duration) = &self.duration {
            if !contains_ci(&record.start_date, duration)
                && !contains_ci(&record.end_date, duration)
            {
                return false;
            }
        }
        true
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
