//! Regex-based i18n debt counts per source file.

use regex::Regex;

use super::gate::Measurement;
use crate::config::DebtPattern;
use crate::scanner::SourceText;

/// Compiled debt patterns.
#[derive(Debug, Clone)]
pub struct DebtScanner {
    patterns: Vec<(String, Regex)>,
}

impl DebtScanner {
    pub fn new(patterns: &[DebtPattern]) -> Result<Self, regex::Error> {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(&p.pattern).map(|regex| (p.name.clone(), regex)))
            .collect::<Result<_, _>>()?;
        Ok(Self { patterns })
    }

    /// Counts matches of every pattern in every file.
    ///
    /// Metrics hold per-pattern totals; files hold non-zero per-file counts;
    /// samples list the offending files, worst first.
    #[must_use]
    pub fn measure(&self, sources: &[SourceText]) -> Measurement {
        let mut measurement = Measurement::default();
        for (name, _) in &self.patterns {
            measurement.metrics.insert(name.clone(), 0);
        }

        let mut offenders: Vec<(String, usize, String)> = Vec::new();
        for source in sources {
            let file = source.relative.to_string_lossy().replace('\\', "/");
            for (name, regex) in &self.patterns {
                let count = regex.find_iter(&source.text).count();
                if count == 0 {
                    continue;
                }
                *measurement.metrics.entry(name.clone()).or_default() += count;
                measurement.files.entry(file.clone()).or_default().insert(name.clone(), count);
                offenders.push((name.clone(), count, file.clone()));
            }
        }

        offenders.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)).then_with(|| a.2.cmp(&b.2)));
        for (name, count, file) in offenders {
            measurement.samples.entry(name).or_default().push(format!("{file} ({count})"));
        }

        tracing::debug!(files = measurement.files.len(), "Measured i18n debt");
        measurement
    }
}
