//! Output-pipeline handles and their custody between a main/alt pair.
//!
//! The four handles are opaque to the core: it creates them, retargets the
//! get-set and writer when the active buffer of a pair changes, and
//! transfers the whole group exactly once per alt-buffer switch. The
//! parsing and dispatch behind them live elsewhere.

use crate::attr::TextAttribute;
use crate::console::ScreenBufferId;
use crate::Result;

/// Identity of a pipeline group, stable across retargets. Lets callers
/// verify that a main/alt pair observes one and the same pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineId(pub u64);

/// Console-API shim the dispatcher drives. Tracks which buffer it operates
/// on.
#[derive(Debug)]
pub struct InternalGetSet {
    target: ScreenBufferId,
}

impl InternalGetSet {
    #[must_use]
    pub fn target(&self) -> ScreenBufferId {
        self.target
    }

    pub fn set_active_screen_buffer(&mut self, target: ScreenBufferId) {
        self.target = target;
    }
}

/// Writes processed output into its target buffer.
#[derive(Debug)]
pub struct BufferWriter {
    target: ScreenBufferId,
}

impl BufferWriter {
    #[must_use]
    pub fn target(&self) -> ScreenBufferId {
        self.target
    }

    pub fn set_active_screen_buffer(&mut self, target: ScreenBufferId) {
        self.target = target;
    }
}

/// Escape-sequence dispatcher. Seeded with the default attribute word.
#[derive(Debug)]
pub struct AdapterDispatch {
    default_attributes: u16,
}

impl AdapterDispatch {
    #[must_use]
    pub fn default_attributes(&self) -> u16 {
        self.default_attributes
    }
}

/// Output state machine driving the dispatcher.
#[derive(Debug, Default)]
pub struct StateMachine {}

/// The four output handles, created and destroyed as one group.
#[derive(Debug)]
pub struct OutputPipeline {
    id: PipelineId,
    pub get_set: InternalGetSet,
    pub writer: BufferWriter,
    pub adapter: AdapterDispatch,
    pub state_machine: StateMachine,
}

impl OutputPipeline {
    pub fn new(id: PipelineId, target: ScreenBufferId, attributes: TextAttribute) -> Result<Self> {
        Ok(Self {
            id,
            get_set: InternalGetSet { target },
            writer: BufferWriter { target },
            adapter: AdapterDispatch {
                default_attributes: attributes.legacy_attributes(),
            },
            state_machine: StateMachine::default(),
        })
    }

    #[must_use]
    pub fn id(&self) -> PipelineId {
        self.id
    }

    /// Point the get-set and writer at `target`. All subsequent output lands
    /// in that buffer.
    pub fn retarget(&mut self, target: ScreenBufferId) {
        self.get_set.set_active_screen_buffer(target);
        self.writer.set_active_screen_buffer(target);
    }

    #[must_use]
    pub fn target(&self) -> ScreenBufferId {
        self.get_set.target()
    }
}

/// Who holds the pipeline for this buffer.
///
/// The group physically lives on the main buffer of a pair; an alt borrows
/// it, and tearing the alt down retargets the handles back to the main
/// before the alt is dropped.
#[derive(Debug)]
pub enum PipelineCustody {
    OwnedHere(OutputPipeline),
    BorrowedFromMain,
}

impl PipelineCustody {
    #[must_use]
    pub fn owned(&self) -> Option<&OutputPipeline> {
        match self {
            Self::OwnedHere(pipeline) => Some(pipeline),
            Self::BorrowedFromMain => None,
        }
    }

    pub fn owned_mut(&mut self) -> Option<&mut OutputPipeline> {
        match self {
            Self::OwnedHere(pipeline) => Some(pipeline),
            Self::BorrowedFromMain => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retarget_moves_both_endpoints() {
        let a = ScreenBufferId(1);
        let b = ScreenBufferId(2);
        let mut pipeline =
            OutputPipeline::new(PipelineId(7), a, TextAttribute::from_legacy(0x07)).unwrap();
        assert_eq!(pipeline.target(), a);
        pipeline.retarget(b);
        assert_eq!(pipeline.get_set.target(), b);
        assert_eq!(pipeline.writer.target(), b);
        assert_eq!(pipeline.id(), PipelineId(7));
    }

    #[test]
    fn adapter_keeps_seed_attributes() {
        let pipeline = OutputPipeline::new(
            PipelineId(1),
            ScreenBufferId(1),
            TextAttribute::from_legacy(0x1F),
        )
        .unwrap();
        assert_eq!(pipeline.adapter.default_attributes(), 0x1F);
    }
}
