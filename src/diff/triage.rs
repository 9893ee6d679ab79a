//! Noise filtering and priority ordering.

use tracing::debug;

use super::classify::{Classifier, PriorityTier};
use super::model::ChangeRecord;

/// A change record paired with its tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedFile<'a> {
    pub record: &'a ChangeRecord,
    pub tier: PriorityTier,
}

/// Result of triage: surviving files in priority order plus the dropped count.
#[derive(Debug, Clone, Default)]
pub struct Triage<'a> {
    pub files: Vec<ClassifiedFile<'a>>,
    pub noise_count: usize,
}

/// Classify every record, drop noise, and order the rest by
/// (tier ascending, total changes descending).
///
/// The sort is stable, so records with equal keys keep their input order.
pub fn triage<'a>(records: &'a [ChangeRecord], classifier: &Classifier) -> Triage<'a> {
    let mut files = Vec::with_capacity(records.len());
    let mut noise_count = 0;

    for record in records {
        match classifier.classify(&record.path) {
            PriorityTier::Noise => {
                debug!("Filtered noise file: {}", record.path);
                noise_count += 1;
            }
            tier => files.push(ClassifiedFile { record, tier }),
        }
    }

    files.sort_by(|a, b| {
        a.tier
            .cmp(&b.tier)
            .then_with(|| b.record.total_changes().cmp(&a.record.total_changes()))
    });

    Triage { files, noise_count }
}
