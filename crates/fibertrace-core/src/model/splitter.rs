// ── Passive splitter domain types ──
//
// A splitter lives in an LCP and fans one input fiber out to N outputs.
// Insertion loss is ratio-dependent: roughly 3.5 dB per doubling.

use serde::{Deserialize, Serialize};

use super::cable::FiberRef;
use super::entity_id::EntityId;

/// Supported passive split ratios.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
pub enum SplitRatio {
    #[serde(rename = "1:2")]
    #[strum(serialize = "1:2")]
    OneToTwo,
    #[serde(rename = "1:4")]
    #[strum(serialize = "1:4")]
    OneToFour,
    #[serde(rename = "1:8")]
    #[strum(serialize = "1:8")]
    OneToEight,
    #[serde(rename = "1:16")]
    #[strum(serialize = "1:16")]
    OneToSixteen,
    #[serde(rename = "1:32")]
    #[strum(serialize = "1:32")]
    OneToThirtyTwo,
    #[serde(rename = "1:64")]
    #[strum(serialize = "1:64")]
    OneToSixtyFour,
}

impl SplitRatio {
    pub fn output_count(self) -> u32 {
        match self {
            Self::OneToTwo => 2,
            Self::OneToFour => 4,
            Self::OneToEight => 8,
            Self::OneToSixteen => 16,
            Self::OneToThirtyTwo => 32,
            Self::OneToSixtyFour => 64,
        }
    }

    /// Nominal insertion loss for an even split: 3.5 dB per doubling.
    pub fn insertion_loss_db(self) -> f64 {
        match self {
            Self::OneToTwo => 3.5,
            Self::OneToFour => 7.0,
            Self::OneToEight => 10.5,
            Self::OneToSixteen => 14.0,
            Self::OneToThirtyTwo => 17.5,
            Self::OneToSixtyFour => 21.0,
        }
    }
}

/// Where a splitter output is patched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SplitterEgress {
    /// Spliced or patched onto a fiber of an outgoing cable.
    CableFiber { cable: EntityId, fiber: u32 },
    /// Jumpered directly to a port in an enclosure (typically an ODF).
    EnclosurePort { enclosure: EntityId, port: u32 },
}

/// One numbered splitter output and its patching, if any.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitterOutput {
    pub number: u32,
    pub link: Option<SplitterEgress>,
}

/// A passive optical splitter mounted in an LCP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Splitter {
    pub id: EntityId,
    pub project: EntityId,
    pub enclosure: EntityId,
    pub name: Option<String>,
    pub ratio: SplitRatio,
    /// Measured insertion loss, overriding the nominal ratio value.
    pub loss_db: Option<f64>,
    pub input: Option<FiberRef>,
    pub outputs: Vec<SplitterOutput>,
}

impl Splitter {
    pub fn effective_loss_db(&self) -> f64 {
        self.loss_db.unwrap_or_else(|| self.ratio.insertion_loss_db())
    }

    pub fn output(&self, number: u32) -> Option<&SplitterOutput> {
        self.outputs.iter().find(|o| o.number == number)
    }

    /// Outputs that are actually patched somewhere.
    pub fn linked_outputs(&self) -> impl Iterator<Item = &SplitterOutput> {
        self.outputs.iter().filter(|o| o.link.is_some())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn nominal_loss_follows_doubling_rule() {
        assert!((SplitRatio::OneToTwo.insertion_loss_db() - 3.5).abs() < f64::EPSILON);
        assert!((SplitRatio::OneToEight.insertion_loss_db() - 10.5).abs() < f64::EPSILON);
        assert!((SplitRatio::OneToSixtyFour.insertion_loss_db() - 21.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ratio_serializes_as_colon_notation() {
        assert_eq!(
            serde_json::to_string(&SplitRatio::OneToThirtyTwo).unwrap(),
            "\"1:32\""
        );
        let back: SplitRatio = serde_json::from_str("\"1:8\"").unwrap();
        assert_eq!(back, SplitRatio::OneToEight);
        assert_eq!(back.to_string(), "1:8");
    }

    #[test]
    fn measured_loss_overrides_nominal() {
        let sp = Splitter {
            id: "SP1".into(),
            project: "p1".into(),
            enclosure: "LCP1".into(),
            name: None,
            ratio: SplitRatio::OneToFour,
            loss_db: Some(7.4),
            input: None,
            outputs: Vec::new(),
        };
        assert!((sp.effective_loss_db() - 7.4).abs() < f64::EPSILON);
    }

    #[test]
    fn linked_outputs_skips_unpatched() {
        let sp = Splitter {
            id: "SP1".into(),
            project: "p1".into(),
            enclosure: "LCP1".into(),
            name: None,
            ratio: SplitRatio::OneToFour,
            loss_db: None,
            input: None,
            outputs: vec![
                SplitterOutput {
                    number: 1,
                    link: Some(SplitterEgress::CableFiber {
                        cable: "D1".into(),
                        fiber: 1,
                    }),
                },
                SplitterOutput {
                    number: 2,
                    link: None,
                },
            ],
        };
        let linked: Vec<u32> = sp.linked_outputs().map(|o| o.number).collect();
        assert_eq!(linked, vec![1]);
    }
}
