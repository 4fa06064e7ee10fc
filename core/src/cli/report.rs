use crate::consolidation::ConsolidationSummary;
use crate::extraction::ExtractionSummary;
use std::fmt;

/// Run summary to report
enum Summary<'a> {
    Extraction(&'a ExtractionSummary),
    Consolidation(&'a ConsolidationSummary),
}

/// Text report formatter for a finished run
pub struct TextReport<'a> {
    summary: Summary<'a>,
}

impl<'a> TextReport<'a> {
    pub fn extraction(summary: &'a ExtractionSummary) -> Self {
        Self {
            summary: Summary::Extraction(summary),
        }
    }

    pub fn consolidation(summary: &'a ConsolidationSummary) -> Self {
        Self {
            summary: Summary::Consolidation(summary),
        }
    }
}

impl<'a> fmt::Display for TextReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.summary {
            Summary::Extraction(s) => {
                writeln!(f, "Feature Extraction")?;
                writeln!(f, "==================")?;
                writeln!(f)?;
                writeln!(f, "Folders:           {}", s.total())?;
                writeln!(f, "Extracted:         {}", s.extracted.len())?;
                writeln!(f, "Already processed: {}", s.already_processed.len())?;
                writeln!(f, "Missing inputs:    {}", s.missing_inputs.len())?;
                writeln!(f, "Failed:            {}", s.failed.len())?;

                if !s.failed.is_empty() {
                    writeln!(f)?;
                    writeln!(f, "Failures")?;
                    writeln!(f, "--------")?;
                    for (folder, reason) in &s.failed {
                        writeln!(f, "{}: {}", folder.display(), reason)?;
                    }
                }
            }
            Summary::Consolidation(s) => {
                writeln!(f, "Consolidation")?;
                writeln!(f, "=============")?;
                writeln!(f)?;
                writeln!(f, "Output:    {}", s.output.display())?;
                writeln!(f, "Patients:  {}", s.patients)?;
                writeln!(f, "Variables: {}", s.variables)?;
                writeln!(f, "Target:    {}", s.target)?;
            }
        }

        Ok(())
    }
}
