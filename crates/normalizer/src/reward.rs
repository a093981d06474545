use once_cell::sync::Lazy;
use regex::Regex;

static AMOUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\$\s*([0-9]+(?:\.[0-9]+)?)\s*(k)?$").expect("invalid regex")
});

/// Dollar value advertised by the first label shaped like `$100`, `$1,000`
/// or `$1.2k`.
pub fn bounty_amount<S: AsRef<str>>(labels: &[S]) -> Option<u64> {
    labels.iter().find_map(|label| parse_amount(label.as_ref()))
}

fn parse_amount(label: &str) -> Option<u64> {
    let cleaned = label.trim().to_lowercase().replace(',', "");
    let caps = AMOUNT.captures(&cleaned)?;
    let value: f64 = caps.get(1)?.as_str().parse().ok()?;
    let multiplier = if caps.get(2).is_some() { 1000.0 } else { 1.0 };
    Some((value * multiplier).round() as u64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BountyTier {
    S,
    A,
    B,
}

impl BountyTier {
    pub fn from_amount(amount: u64) -> Self {
        match amount {
            500.. => BountyTier::S,
            200.. => BountyTier::A,
            _ => BountyTier::B,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BountyTier::S => "S-Tier",
            BountyTier::A => "A-Tier",
            BountyTier::B => "B-Tier",
        }
    }
}
