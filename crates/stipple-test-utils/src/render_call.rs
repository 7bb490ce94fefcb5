//! Records of batch operations.

/// Kind of batch a recorded call was made on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchKind {
    Line,
    Fill,
    Marker,
    SelectMarker,
    Error,
    Text,
}

/// A batch operation, recorded in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    Prepare {
        ok: bool,
    },
    CreateBatch {
        id: usize,
        kind: BatchKind,
    },
    Update {
        id: usize,
        kind: BatchKind,
        items: usize,
    },
    SetViewport {
        id: usize,
        kind: BatchKind,
    },
    Draw {
        id: usize,
        kind: BatchKind,
        item: usize,
    },
    DrawMany {
        id: usize,
        kind: BatchKind,
        items: Vec<usize>,
    },
    DrawSubsets {
        id: usize,
        kind: BatchKind,
        subsets: Vec<Option<Vec<usize>>>,
    },
    Render {
        id: usize,
    },
    Destroy {
        id: usize,
        kind: BatchKind,
    },
}

impl RenderCall {
    /// Whether the call puts pixels on screen.
    pub fn is_draw(&self) -> bool {
        matches!(
            self,
            Self::Draw { .. } | Self::DrawMany { .. } | Self::DrawSubsets { .. } | Self::Render { .. }
        )
    }

    pub fn kind(&self) -> Option<BatchKind> {
        match self {
            Self::Prepare { .. } => None,
            Self::Render { .. } => Some(BatchKind::Text),
            Self::CreateBatch { kind, .. }
            | Self::Update { kind, .. }
            | Self::SetViewport { kind, .. }
            | Self::Draw { kind, .. }
            | Self::DrawMany { kind, .. }
            | Self::DrawSubsets { kind, .. }
            | Self::Destroy { kind, .. } => Some(*kind),
        }
    }
}
