use std::collections::HashMap;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy)]
pub struct PriceEntry {
    /// USD per million input tokens.
    pub input: f64,
    /// USD per million output tokens.
    pub output: f64,
}

pub static PRICING: LazyLock<HashMap<&'static str, PriceEntry>> = LazyLock::new(|| {
    HashMap::from([
        (
            "gemini-2.0-flash-lite",
            PriceEntry {
                input: 0.075,
                output: 0.30,
            },
        ),
        (
            "gemini-2.0-flash",
            PriceEntry {
                input: 0.10,
                output: 0.40,
            },
        ),
        (
            "claude-haiku-4-5-20251001",
            PriceEntry {
                input: 1.00,
                output: 5.00,
            },
        ),
    ])
});

pub fn calculate_cost(model: &str, input_tokens: u32, output_tokens: u32) -> f64 {
    match PRICING.get(model) {
        Some(entry) => {
            (f64::from(input_tokens) * entry.input / 1_000_000.0)
                + (f64::from(output_tokens) * entry.output / 1_000_000.0)
        }
        None => 0.0,
    }
}

pub static PROVIDER_SERVERS: LazyLock<HashMap<&str, &str>> = LazyLock::new(|| {
    HashMap::from([
        ("google", "generativelanguage.googleapis.com"),
        ("anthropic", "api.anthropic.com"),
    ])
});

pub static PROVIDER_PORTS: LazyLock<HashMap<&str, i64>> =
    LazyLock::new(|| HashMap::from([("google", 443_i64), ("anthropic", 443)]));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_cost_known_model() {
        let cost = calculate_cost("gemini-2.0-flash-lite", 1_000_000, 1_000_000);
        assert!((cost - 0.375).abs() < 1e-9);
    }

    #[test]
    fn test_calculate_cost_unknown_model() {
        let cost = calculate_cost("nonexistent-model-xyz", 1000, 1000);
        assert_eq!(cost, 0.0);
    }

    #[test]
    fn test_calculate_cost_zero_tokens() {
        let cost = calculate_cost("gemini-2.0-flash-lite", 0, 0);
        assert_eq!(cost, 0.0);
    }

    #[test]
    fn test_provider_servers() {
        assert_eq!(
            PROVIDER_SERVERS.get("google"),
            Some(&"generativelanguage.googleapis.com")
        );
        assert_eq!(
            PROVIDER_SERVERS.get("anthropic"),
            Some(&"api.anthropic.com")
        );
    }

    #[test]
    fn test_provider_ports() {
        assert_eq!(PROVIDER_PORTS.get("google"), Some(&443));
        assert_eq!(PROVIDER_PORTS.get("anthropic"), Some(&443));
    }
}
