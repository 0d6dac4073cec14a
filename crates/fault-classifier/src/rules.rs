//! Fixed Threshold Rules

use crate::status::DetectionStatus;
use ring_buffer::{Channel, SensorReading};
use serde::Serialize;

/// Node of a threshold tree over a single channel value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    /// Terminal verdict
    Leaf {
        status: DetectionStatus,
        confidence: f64,
    },
    /// `value <= threshold` descends left, anything else (including NaN) right
    Split {
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    fn leaf(status: DetectionStatus, confidence: f64) -> Self {
        TreeNode::Leaf { status, confidence }
    }

    fn split(threshold: f64, left: TreeNode, right: TreeNode) -> Self {
        TreeNode::Split {
            threshold,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Walk the tree for a value
    pub fn evaluate(&self, value: f64) -> (DetectionStatus, f64) {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { status, confidence } => return (*status, *confidence),
                TreeNode::Split {
                    threshold,
                    left,
                    right,
                } => {
                    node = if value <= *threshold { left } else { right };
                }
            }
        }
    }

    /// Number of split levels on the deepest path
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// One ensemble member: a two-level tree bound to one channel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionRule {
    /// Position in the ensemble, also the source of its seed
    pub index: usize,
    pub channel: Channel,
    pub root: TreeNode,
}

impl DecisionRule {
    /// Build the rule at `index`.
    ///
    /// The channel cycles through the classified channels by `index % 4` and
    /// the breakpoints are nudged by `seed = index * 42` so that rules for the
    /// same channel disagree slightly near band edges.
    pub fn build(index: usize) -> Self {
        use DetectionStatus::{Critical, Normal, Warning};

        let seed = index.wrapping_mul(42);
        let jitter = |modulus: usize| (seed % modulus) as f64;
        let channel = Channel::CLASSIFIED[index % Channel::CLASSIFIED.len()];

        let root = match channel {
            Channel::EngineTemp => TreeNode::split(
                95.0 + jitter(10),
                TreeNode::split(
                    85.0 + jitter(5),
                    TreeNode::leaf(Normal, 0.90),
                    TreeNode::leaf(Warning, 0.80),
                ),
                TreeNode::leaf(Critical, 0.95),
            ),
            // Low pressure is the dangerous side
            Channel::OilPressure => TreeNode::split(
                1.5 - jitter(3) * 0.1,
                TreeNode::leaf(Critical, 0.90),
                TreeNode::split(
                    3.0 + jitter(2) * 0.2,
                    TreeNode::leaf(Warning, 0.75),
                    TreeNode::leaf(Normal, 0.85),
                ),
            ),
            // Above the charging band is flagged too
            Channel::BatteryVoltage => TreeNode::split(
                11.5 + jitter(2) * 0.2,
                TreeNode::leaf(Critical, 0.88),
                TreeNode::split(
                    13.8 + jitter(3) * 0.1,
                    TreeNode::leaf(Normal, 0.82),
                    TreeNode::leaf(Warning, 0.78),
                ),
            ),
            _ => TreeNode::split(
                15.0 + jitter(5),
                TreeNode::leaf(Normal, 0.85),
                TreeNode::split(
                    25.0 + jitter(3),
                    TreeNode::leaf(Warning, 0.80),
                    TreeNode::leaf(Critical, 0.92),
                ),
            ),
        };

        Self {
            index,
            channel,
            root,
        }
    }

    /// Vote of this rule for a reading
    pub fn predict(&self, reading: &SensorReading) -> (DetectionStatus, f64) {
        self.root.evaluate(reading.value(self.channel))
    }
}
