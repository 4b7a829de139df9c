use crate::domain::JobRaw;

/// Everything a successful match extracted
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchedFields {
    /// One record per complete pass of the outermost `forEach` cycle
    pub records: Vec<JobRaw>,
    /// Fields matched outside any `forEach`
    pub root: JobRaw,
    pub token: Option<String>,
    pub destinations: Vec<String>,
}

impl MatchedFields {
    /// Job records; root fields count as a single job when no `forEach`
    /// produced any records
    pub fn into_jobs(self) -> Vec<JobRaw> {
        if self.records.is_empty() && !self.root.is_empty() {
            vec![self.root]
        } else {
            self.records
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
            && self.root.is_empty()
            && self.token.is_none()
            && self.destinations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FieldValue, PresetField};

    #[test]
    fn test_root_becomes_job_without_records() {
        let mut fields = MatchedFields::default();
        assert!(fields.is_empty());

        fields
            .root
            .insert_preset(PresetField::Id, FieldValue::String("a".into()));
        assert_eq!(fields.clone().into_jobs().len(), 1);

        fields.records.push(JobRaw::default());
        fields.records.push(JobRaw::default());
        assert_eq!(fields.into_jobs().len(), 2);
    }
}
