/// Models split by where they are served from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelPartition {
    /// Ids under the lab-hosted namespace prefix, sorted.
    pub lbl_hosted: Vec<String>,
    /// Everything else, sorted.
    pub commercial: Vec<String>,
}

impl ModelPartition {
    pub fn total(&self) -> usize {
        self.lbl_hosted.len() + self.commercial.len()
    }
}

pub fn is_hosted(model: &str, hosted_prefix: &str) -> bool {
    model.starts_with(hosted_prefix)
}

/// Partitions model ids by the hosted namespace prefix.
pub fn classify<I, S>(models: I, hosted_prefix: &str) -> ModelPartition
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut partition = ModelPartition::default();
    for model in models {
        let model = model.as_ref();
        if is_hosted(model, hosted_prefix) {
            partition.lbl_hosted.push(model.to_string());
        } else {
            partition.commercial.push(model.to_string());
        }
    }
    for side in [&mut partition.lbl_hosted, &mut partition.commercial] {
        side.sort();
        side.dedup();
    }
    partition
}
