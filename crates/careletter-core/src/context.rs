use serde::Deserialize;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize)]
pub enum ClientType {
    #[serde(alias = "individual")]
    Individual,
    #[serde(alias = "corporate")]
    Corporate,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize)]
pub enum Track {
    #[serde(alias = "small_claims", alias = "small-claims")]
    SmallClaims,
    #[serde(alias = "fast")]
    Fast,
    #[serde(alias = "intermediate")]
    Intermediate,
    #[serde(alias = "multi")]
    Multi,
}

impl Track {
    pub const ALL: [Track; 4] = [
        Track::SmallClaims,
        Track::Fast,
        Track::Intermediate,
        Track::Multi,
    ];

    /// Digit used by track tags (`[a1]` is small claims, `[u4]` is multi track).
    pub fn digit(self) -> char {
        match self {
            Track::SmallClaims => '1',
            Track::Fast => '2',
            Track::Intermediate => '3',
            Track::Multi => '4',
        }
    }

    pub fn from_digit(digit: char) -> Option<Self> {
        match digit {
            '1' => Some(Track::SmallClaims),
            '2' => Some(Track::Fast),
            '3' => Some(Track::Intermediate),
            '4' => Some(Track::Multi),
            _ => None,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Track::SmallClaims => "Small Claims Track",
            Track::Fast => "Fast Track",
            Track::Intermediate => "Intermediate Track",
            Track::Multi => "Multi Track",
        }
    }
}

/// Facts that decide which conditional blocks of the precedent are rendered.
///
/// Built once per generation request and never mutated.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ChoiceContext {
    pub client_type: ClientType,
    pub claim_already_assigned: bool,
    pub selected_track: Track,
}

impl ChoiceContext {
    pub fn new(client_type: ClientType, claim_already_assigned: bool, selected_track: Track) -> Self {
        Self {
            client_type,
            claim_already_assigned,
            selected_track,
        }
    }
}
