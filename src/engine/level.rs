use super::types::FactorLevel;

/// Converts a 0-100 risk score into a human-readable level.
///
/// | Range   | Level       |
/// |---------|-------------|
/// | >= 70   | High Risk   |
/// | >= 40   | Medium Risk |
/// | < 40    | Low Risk    |
pub fn risk_level(score: u8) -> &'static str {
    match score {
        s if s >= 70 => "High Risk",
        s if s >= 40 => "Medium Risk",
        _ => "Low Risk",
    }
}

/// Severity band for a single factor in the enhanced breakdown.
pub fn factor_level(score: u8) -> FactorLevel {
    match score {
        s if s >= 80 => FactorLevel::High,
        s if s >= 50 => FactorLevel::Medium,
        _ => FactorLevel::Low,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_boundaries() {
        assert_eq!(risk_level(100), "High Risk");
        assert_eq!(risk_level(70), "High Risk");
        assert_eq!(risk_level(69), "Medium Risk");
        assert_eq!(risk_level(40), "Medium Risk");
        assert_eq!(risk_level(39), "Low Risk");
        assert_eq!(risk_level(0), "Low Risk");
    }

    #[test]
    fn test_factor_level_boundaries() {
        assert_eq!(factor_level(100), FactorLevel::High);
        assert_eq!(factor_level(80), FactorLevel::High);
        assert_eq!(factor_level(79), FactorLevel::Medium);
        assert_eq!(factor_level(50), FactorLevel::Medium);
        assert_eq!(factor_level(49), FactorLevel::Low);
        assert_eq!(factor_level(0), FactorLevel::Low);
    }
}
