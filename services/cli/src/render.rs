use idris::scoring::{flags, Dimension, ScoredResult, ScoringEngine};

pub(crate) fn result_summary(result: &ScoredResult) -> String {
    let mut lines = vec![format!(
        "Project {} (input {})",
        result.project_id,
        short_hash(&result.input_hash)
    )];
    lines.push(format!(
        "Composite {:.1} -> {}",
        result.composite.presented(),
        result.band()
    ));
    if result.veto.is_triggered() {
        let names: Vec<&str> = result
            .veto
            .triggered_by
            .iter()
            .map(|dimension| dimension.label())
            .collect();
        lines.push(format!(
            "Social veto: {} (raw band {} capped to {})",
            names.join(", "),
            result.banding.raw,
            result.band()
        ));
    }

    lines.push("Dimensions:".to_string());
    for (dimension, score) in result.scores.iter() {
        let marker = if result.scores.proxied_dimensions().contains(&dimension) {
            " (proxied)"
        } else {
            ""
        };
        lines.push(format!("  - {}: {:.1}{marker}", dimension.label(), score.value));
    }

    if result.proxy_used() {
        lines.push("Proxies:".to_string());
        for note in &result.notes {
            lines.push(format!("  - {}", note.detail));
        }
    }

    lines.push("Regulatory gates:".to_string());
    for gate in result.gates.gates() {
        lines.push(format!("  - {}: {}", gate.framework.label(), gate.outcome.label()));
    }
    if let Some(article) = result.sfdr_article() {
        lines.push(format!("SFDR classification: {article}"));
    }
    lines.push(format!(
        "PAI: {} of {} indicators adverse, summary {:.1}",
        result.pai.adverse_count(),
        result.pai.indicators().len(),
        result.pai.summary_score()
    ));

    let warnings: Vec<_> = flags::warnings(&result.flags).collect();
    if !warnings.is_empty() {
        lines.push("Warnings:".to_string());
        lines.extend(warnings.iter().map(|flag| format!("  - {}", flag.message)));
    }
    let strengths: Vec<_> = flags::strengths(&result.flags).collect();
    if !strengths.is_empty() {
        lines.push("Strengths:".to_string());
        lines.extend(strengths.iter().map(|flag| format!("  - {}", flag.message)));
    }

    lines.join("\n")
}

pub(crate) fn config_summary(engine: &ScoringEngine) -> String {
    let config = engine.config();
    let mut lines = vec!["Configuration valid".to_string(), "Weights:".to_string()];
    for dimension in Dimension::ordered() {
        lines.push(format!(
            "  - {}: {:.2}",
            dimension.label(),
            config.weights.weight(dimension)
        ));
    }

    lines.push("Bands:".to_string());
    for range in config.bands.ranges() {
        lines.push(format!("  - {}: {}-{}", range.band, range.min, range.max));
    }
    lines.push(format!(
        "Social veto: gender or social mobility below {:.0}",
        config.veto.threshold
    ));

    lines.push("SFDR mapping:".to_string());
    for rule in config.frameworks.sfdr.table.rules() {
        let fallback = rule
            .fallback
            .map(|article| format!(" (else {article})"))
            .unwrap_or_default();
        lines.push(format!("  - {}: {}{fallback}", rule.band, rule.article));
    }

    lines.join("\n")
}

fn short_hash(hash: &str) -> &str {
    hash.get(..12).unwrap_or(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use idris::scoring::ProjectRecord;

    #[test]
    fn summary_mentions_veto_and_gates() {
        let record = ProjectRecord::new("mine", "Nigeria", "Extractive Industry", "Equity", 2.5e7)
            .with_gender_equality(0.2);
        let result = ScoringEngine::default().score(&record).expect("scores");
        let text = result_summary(&result);

        assert!(text.starts_with("Project mine"));
        assert!(text.contains("Social veto: Gender Equity"));
        assert!(text.contains("  - MiFID II: "));
        assert!(text.contains("Warnings:"));
    }

    #[test]
    fn config_summary_lists_every_weight() {
        let text = config_summary(&ScoringEngine::default());
        assert!(text.contains("Gender Equity: 0.20"));
        assert!(text.contains("Amber: Article 8 (else Article 6)"));
    }
}
