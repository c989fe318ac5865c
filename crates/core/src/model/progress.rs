/// Per-shape edge tracing progress. Reset whenever a new shape spawns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeProgress {
    pub shape_index: usize,
    pub edge_index: usize,
    pub total_edges: usize,
}

impl EdgeProgress {
    #[must_use]
    pub fn new(shape_index: usize, total_edges: usize) -> Self {
        Self {
            shape_index,
            edge_index: 0,
            total_edges,
        }
    }

    /// Index of the edge that must be hit next, if any remain.
    #[must_use]
    pub fn current_edge(&self) -> Option<usize> {
        (self.edge_index < self.total_edges).then_some(self.edge_index)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.edge_index >= self.total_edges
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.total_edges.saturating_sub(self.edge_index)
    }

    pub(crate) fn advance(&mut self) {
        if !self.is_complete() {
            self.edge_index += 1;
        }
    }
}

/// Progress through the snowman assembly parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnowmanProgress {
    pub part_index: usize,
    pub total_parts: usize,
    pub completed_parts: Vec<String>,
}

impl SnowmanProgress {
    #[must_use]
    pub fn new(total_parts: usize) -> Self {
        Self {
            part_index: 0,
            total_parts,
            completed_parts: Vec::with_capacity(total_parts),
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.part_index >= self.total_parts
    }

    pub(crate) fn complete_part(&mut self, part: impl Into<String>) {
        if self.is_complete() {
            return;
        }
        self.completed_parts.push(part.into());
        self.part_index += 1;
    }
}
