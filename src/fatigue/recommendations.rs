//! Rule-based fatigue recommendations

use super::types::{FatigueIndicatorSet, FatigueSeverity, RangeKind};

/// Build the recommendation list for one entity's indicators.
///
/// The range-level message comes first, followed by one message per
/// indicator that is individually high.
pub fn generate_recommendations(
    indicators: &FatigueIndicatorSet,
    range_kind: RangeKind,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    if let Some(rec) = check_overall(indicators.overall_severity, range_kind) {
        recommendations.push(rec);
    }
    if let Some(rec) = check_creative(indicators) {
        recommendations.push(rec);
    }
    if let Some(rec) = check_audience(indicators) {
        recommendations.push(rec);
    }
    if let Some(rec) = check_platform(indicators) {
        recommendations.push(rec);
    }

    recommendations
}

fn check_overall(severity: FatigueSeverity, range_kind: RangeKind) -> Option<String> {
    match (severity, range_kind) {
        (FatigueSeverity::High, RangeKind::ShortTerm) => Some(
            "Severe fatigue within a short window: pause this ad or swap in a fresh creative immediately"
                .to_string(),
        ),
        (FatigueSeverity::High, RangeKind::LongTerm) => Some(
            "Sustained fatigue over a long window: rotate creatives and shift budget gradually to fresher ads"
                .to_string(),
        ),
        (FatigueSeverity::Medium, _) => Some(
            "Early signs of fatigue: monitor closely and prepare replacement creatives".to_string(),
        ),
        (FatigueSeverity::Low, _) => None,
    }
}

fn check_creative(indicators: &FatigueIndicatorSet) -> Option<String> {
    let creative = &indicators.creative;
    if creative.severity != FatigueSeverity::High {
        return None;
    }
    Some(format!(
        "CTR moved {:+.1}% over the period: refresh the creative (new visual, hook, or copy)",
        creative.ctr_change_pct
    ))
}

fn check_audience(indicators: &FatigueIndicatorSet) -> Option<String> {
    let audience = &indicators.audience;
    if audience.severity != FatigueSeverity::High {
        return None;
    }
    Some(format!(
        "Frequency is {:.2}: expand the audience or add exclusions to reduce repeat exposure",
        audience.current_frequency
    ))
}

fn check_platform(indicators: &FatigueIndicatorSet) -> Option<String> {
    let platform = &indicators.platform;
    if platform.severity != FatigueSeverity::High {
        return None;
    }
    Some(format!(
        "CPM moved {:+.1}% over the period: review placements and bidding strategy",
        platform.cpm_change_pct
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fatigue::types::{
        AudienceFatigue, CreativeFatigue, CreativeTrend, PlatformFatigue, TrendDirection,
    };

    fn indicators(
        creative: FatigueSeverity,
        audience: FatigueSeverity,
        platform: FatigueSeverity,
        overall: FatigueSeverity,
    ) -> FatigueIndicatorSet {
        FatigueIndicatorSet {
            creative: CreativeFatigue {
                trend: CreativeTrend::Declining,
                severity: creative,
                ctr_change_pct: -40.0,
            },
            audience: AudienceFatigue {
                frequency_trend: TrendDirection::Increasing,
                severity: audience,
                current_frequency: 4.2,
            },
            platform: PlatformFatigue {
                cpm_trend: TrendDirection::Stable,
                severity: platform,
                cpm_change_pct: 5.0,
            },
            overall_severity: overall,
            recommendations: Vec::new(),
        }
    }

    #[test]
    fn test_all_low_has_no_recommendations() {
        use FatigueSeverity::Low;
        let set = indicators(Low, Low, Low, Low);
        assert!(generate_recommendations(&set, RangeKind::LongTerm).is_empty());
    }

    #[test]
    fn test_short_term_high_recommends_pause() {
        use FatigueSeverity::{High, Low};
        let set = indicators(High, High, Low, High);
        let recs = generate_recommendations(&set, RangeKind::ShortTerm);

        assert_eq!(recs.len(), 3);
        assert!(recs[0].contains("pause this ad"));
        assert!(recs[1].contains("-40.0%"));
        assert!(recs[2].contains("4.20"));
    }

    #[test]
    fn test_long_term_high_recommends_rotation() {
        use FatigueSeverity::High;
        let set = indicators(High, High, High, High);
        let recs = generate_recommendations(&set, RangeKind::LongTerm);

        assert!(recs[0].contains("rotate creatives"));
        assert_eq!(recs.len(), 4);
    }

    #[test]
    fn test_single_high_indicator_appended() {
        use FatigueSeverity::{High, Low, Medium};
        let set = indicators(Low, Low, High, Medium);
        let recs = generate_recommendations(&set, RangeKind::LongTerm);

        assert_eq!(recs.len(), 2);
        assert!(recs[0].contains("Early signs"));
        assert!(recs[1].contains("CPM"));
    }
}
