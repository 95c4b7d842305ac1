//! Submission list view-model: the filtering and per-patient grouping that
//! the doctor and admin screens render. Every function here is pure over
//! immutable inputs and is recomputed on each criteria or source change.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::submission::{DiabetesType, Submission};

/// Category half of the filter criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    All,
    Only(DiabetesType),
}

impl TypeFilter {
    fn matches(&self, submission: &Submission) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Only(wanted) => submission.diabetes_type == *wanted,
        }
    }
}

/// Transient, view-local filter state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterCriteria {
    /// Substring matched case-insensitively against patient name and email.
    /// Empty matches everything.
    pub query: String,
    pub diabetes_type: TypeFilter,
}

impl FilterCriteria {
    fn matches(&self, submission: &Submission) -> bool {
        let query_ok = if self.query.is_empty() {
            true
        } else {
            let needle = self.query.to_lowercase();
            submission.patient_name.to_lowercase().contains(&needle)
                || submission.patient_email.to_lowercase().contains(&needle)
        };
        query_ok && self.diabetes_type.matches(submission)
    }
}

/// Stable filter: output preserves input order, no re-sort.
pub fn filter(submissions: &[Submission], criteria: &FilterCriteria) -> Vec<Submission> {
    submissions
        .iter()
        .filter(|s| criteria.matches(s))
        .cloned()
        .collect()
}

/// One patient's slice of the submission list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientGroup {
    pub patient_id: String,
    pub patient_name: String,
    pub patient_email: String,
    pub patient_age: Option<u32>,
    pub submissions: Vec<Submission>,
}

/// Partition submissions by patient. Group order follows the first
/// appearance of each patient in the input; member order follows input
/// order. Every submission lands in exactly one group.
pub fn group_by_patient(submissions: &[Submission]) -> Vec<PatientGroup> {
    let mut groups: Vec<PatientGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for submission in submissions {
        let slot = match index.get(&submission.patient_id) {
            Some(slot) => *slot,
            None => {
                index.insert(submission.patient_id.clone(), groups.len());
                groups.push(PatientGroup {
                    patient_id: submission.patient_id.clone(),
                    patient_name: submission.patient_name.clone(),
                    patient_email: submission.patient_email.clone(),
                    patient_age: submission.patient_age,
                    submissions: Vec::new(),
                });
                groups.len() - 1
            }
        };
        groups[slot].submissions.push(submission.clone());
    }

    groups
}

/// Sort each group's submissions newest first. Display post-processing,
/// separate from grouping itself.
pub fn newest_first(groups: &mut [PatientGroup]) {
    for group in groups.iter_mut() {
        group
            .submissions
            .sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }
}

/// The list the doctor dashboard renders: filtered, grouped by patient,
/// each history newest first.
pub fn doctor_view(submissions: &[Submission], criteria: &FilterCriteria) -> Vec<PatientGroup> {
    let mut groups = group_by_patient(&filter(submissions, criteria));
    newest_first(&mut groups);
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::HashSet;

    fn submission(id: &str, patient: &str, name: &str, kind: DiabetesType, day: u32) -> Submission {
        Submission {
            id: id.to_string(),
            patient_id: patient.to_string(),
            patient_name: name.to_string(),
            patient_email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            patient_age: Some(50),
            tongue_image_url: format!("/uploads/{id}.jpg"),
            blood_glucose: 120.0,
            hba1c: 6.5,
            insulin_level: None,
            diabetes_type: kind,
            symptoms: vec![],
            medications: vec![],
            notes: None,
            created_at: Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0).unwrap(),
        }
    }

    fn sample() -> Vec<Submission> {
        vec![
            submission("s1", "p1", "Ann Lee", DiabetesType::Type1, 1),
            submission("s2", "p2", "Bob", DiabetesType::Type2, 2),
            submission("s3", "p1", "Ann Lee", DiabetesType::Type1, 3),
            submission("s4", "p3", "Carol", DiabetesType::Prediabetes, 4),
        ]
    }

    #[test]
    fn empty_criteria_is_identity() {
        let subs = sample();
        let out = filter(&subs, &FilterCriteria::default());
        let ids: Vec<_> = out.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["s1", "s2", "s3", "s4"]);
    }

    #[test]
    fn filter_is_idempotent() {
        let subs = sample();
        let criteria = FilterCriteria {
            query: "ann".to_string(),
            diabetes_type: TypeFilter::All,
        };
        let once = filter(&subs, &criteria);
        let twice = filter(&once, &criteria);
        assert_eq!(
            once.iter().map(|s| &s.id).collect::<Vec<_>>(),
            twice.iter().map(|s| &s.id).collect::<Vec<_>>()
        );
    }

    #[test]
    fn query_matches_name_or_email_case_insensitively() {
        let subs = sample();
        let by_name = filter(
            &subs,
            &FilterCriteria {
                query: "ANN".to_string(),
                diabetes_type: TypeFilter::All,
            },
        );
        assert!(by_name.iter().all(|s| s.patient_name == "Ann Lee"));
        assert_eq!(by_name.len(), 2);

        let by_email = filter(
            &subs,
            &FilterCriteria {
                query: "bob@".to_string(),
                diabetes_type: TypeFilter::All,
            },
        );
        assert_eq!(by_email.len(), 1);
        assert_eq!(by_email[0].id, "s2");
    }

    #[test]
    fn type_filter_composes_with_query() {
        let subs = sample();
        let out = filter(
            &subs,
            &FilterCriteria {
                query: "ann".to_string(),
                diabetes_type: TypeFilter::Only(DiabetesType::Type2),
            },
        );
        assert!(out.is_empty());

        let out = filter(
            &subs,
            &FilterCriteria {
                query: String::new(),
                diabetes_type: TypeFilter::Only(DiabetesType::Type2),
            },
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "s2");
    }

    #[test]
    fn grouping_partitions_the_input() {
        let subs = sample();
        let groups = group_by_patient(&subs);

        let grouped_ids: Vec<_> = groups
            .iter()
            .flat_map(|g| g.submissions.iter().map(|s| s.id.clone()))
            .collect();
        let input_ids: HashSet<_> = subs.iter().map(|s| s.id.clone()).collect();
        assert_eq!(grouped_ids.len(), subs.len());
        assert_eq!(
            grouped_ids.iter().cloned().collect::<HashSet<_>>(),
            input_ids
        );

        for group in &groups {
            assert!(group.submissions.iter().all(|s| s.patient_id == group.patient_id));
        }
    }

    #[test]
    fn group_order_is_first_seen() {
        let groups = group_by_patient(&sample());
        let order: Vec<_> = groups.iter().map(|g| g.patient_id.as_str()).collect();
        assert_eq!(order, ["p1", "p2", "p3"]);
    }

    #[test]
    fn doctor_view_sorts_each_history_newest_first() {
        let groups = doctor_view(&sample(), &FilterCriteria::default());
        let ann = &groups[0];
        let ids: Vec<_> = ann.submissions.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["s3", "s1"]);
    }

    #[test]
    fn ann_lee_scenario() {
        let subs = vec![
            submission("s1", "p1", "Ann Lee", DiabetesType::Type1, 1),
            submission("s2", "p2", "Bob", DiabetesType::Type2, 2),
        ];
        let out = filter(
            &subs,
            &FilterCriteria {
                query: "ann".to_string(),
                diabetes_type: TypeFilter::All,
            },
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].patient_name, "Ann Lee");
    }
}
