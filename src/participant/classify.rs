use serde::Serialize;
use utoipa::ToSchema;

const ERASMUS_KEYWORDS: [&str; 1] = ["ERASMUS"];
const OTHER_EXCHANGE_KEYWORDS: [&str; 3] = ["OTHER", "FULL-TIME", "INTERNATIONAL STUDENT"];
const TUTOR_KEYWORDS: [&str; 1] = ["TUTOR"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeKind {
    Erasmus,
    OtherExchange,
}

/// Category flags derived from a free-form participant type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct Classification {
    pub exchange: Option<ExchangeKind>,
    pub tutor: bool,
}

impl Classification {
    pub fn is_erasmus(&self) -> bool {
        self.exchange == Some(ExchangeKind::Erasmus)
    }

    pub fn is_other_exchange(&self) -> bool {
        self.exchange == Some(ExchangeKind::OtherExchange)
    }
}

/// Classifies a type tag by case-insensitive keyword match.
///
/// Exchange status is exclusive: an other-exchange keyword outranks ERASMUS.
/// Tutor is independent of exchange status.
pub fn classify(participant_type: &str) -> Classification {
    let upper = participant_type.to_uppercase();
    let has_any = |keywords: &[&str]| keywords.iter().any(|keyword| upper.contains(keyword));

    let exchange = if has_any(&OTHER_EXCHANGE_KEYWORDS) {
        Some(ExchangeKind::OtherExchange)
    } else if has_any(&ERASMUS_KEYWORDS) {
        Some(ExchangeKind::Erasmus)
    } else {
        None
    };

    Classification {
        exchange,
        tutor: has_any(&TUTOR_KEYWORDS),
    }
}
