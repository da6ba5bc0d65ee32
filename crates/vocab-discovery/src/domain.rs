//! Best-effort domain inference from dataset identifiers.

const DOMAIN_TOKENS: &[(&str, &[&str])] = &[
    ("air", &["air", "aq", "airnow", "aqs", "openaq", "purpleair"]),
    ("water", &["water", "nwis", "wqp", "hydro", "river", "stream"]),
    ("weather", &["weather", "met", "meteo", "ghcn", "isd", "nws"]),
    ("soil", &["soil", "smap", "scan"]),
    ("ocean", &["ocean", "ndbc", "tide", "tides", "marine", "coastal"]),
];

/// Guesses a coarse domain from a dataset name such as `USGS_NWIS` or
/// `EPA_AirNow`.
///
/// Names are split into lowercase alphanumeric tokens. Exact token matches
/// against every domain win; only then does a token containing a domain
/// name (`groundwater`) count. Returns `None` when nothing matches.
pub fn infer_domain(dataset: &str) -> Option<&'static str> {
    let lowered = dataset.to_lowercase();
    let tokens: Vec<&str> = lowered
        .split(|ch: char| !ch.is_ascii_alphanumeric())
        .filter(|token| !token.is_empty())
        .collect();
    let exact = DOMAIN_TOKENS.iter().find_map(|(domain, known)| {
        tokens
            .iter()
            .any(|token| known.contains(token))
            .then_some(*domain)
    });
    exact.or_else(|| {
        DOMAIN_TOKENS.iter().find_map(|(domain, _)| {
            tokens
                .iter()
                .any(|token| token.contains(domain))
                .then_some(*domain)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_sources() {
        assert_eq!(infer_domain("EPA_AQS"), Some("air"));
        assert_eq!(infer_domain("OpenAQ"), Some("air"));
        assert_eq!(infer_domain("EPA-AirNow"), Some("air"));
        assert_eq!(infer_domain("USGS_NWIS"), Some("water"));
        assert_eq!(infer_domain("groundwater_levels"), Some("water"));
        assert_eq!(infer_domain("NOAA GHCN daily"), Some("weather"));
        assert_eq!(infer_domain("NASA_SMAP"), Some("soil"));
        assert_eq!(infer_domain("NOAA_NDBC"), Some("ocean"));
    }

    #[test]
    fn exact_tokens_beat_embedded_domain_names() {
        assert_eq!(infer_domain("USGS_Fairbanks_River"), Some("water"));
        assert_eq!(infer_domain("dairy_soil_probes"), Some("soil"));
        assert_eq!(infer_domain("fairbanks"), Some("air"));
    }

    #[test]
    fn unknown_sources() {
        assert_eq!(infer_domain("census"), None);
        assert_eq!(infer_domain(""), None);
    }
}
