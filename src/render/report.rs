use crate::foundation::error::AssetError;

/// Node variant, as reported in a [`RenderReport`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Container box.
    Container,
    /// Image box.
    Image,
    /// Text block.
    Text,
}

/// Why a node was left out of the drawing.
#[derive(Clone, Debug, PartialEq)]
pub enum SkipReason {
    /// The image resource failed to load.
    Image(AssetError),
    /// The font resource failed to load or register.
    Font(AssetError),
    /// The surface rejected the draw call.
    Surface(String),
}

/// One skipped node.
#[derive(Clone, Debug, PartialEq)]
pub struct SkippedNode {
    /// Variant of the skipped node.
    pub kind: NodeKind,
    /// Cause.
    pub reason: SkipReason,
}

/// Summary of one render or draw pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderReport {
    /// Nodes drawn, containers included.
    pub drawn: usize,
    /// Nodes skipped because a resource or draw call failed.
    pub skipped: Vec<SkippedNode>,
}

impl RenderReport {
    /// `true` when no node was skipped.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    pub(crate) fn record(&mut self, kind: NodeKind, outcome: Result<(), SkipReason>) {
        match outcome {
            Ok(()) => self.drawn += 1,
            Err(reason) => {
                tracing::warn!(?kind, ?reason, "node skipped");
                self.skipped.push(SkippedNode { kind, reason });
            }
        }
    }
}
