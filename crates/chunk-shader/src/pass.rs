//! Block render passes

use std::fmt;

/// Class of terrain geometry drawn together with one blend/cull setup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockRenderPass {
    Solid,
    Cutout,
    CutoutMipped,
    Translucent,
    Tripwire,
}

impl BlockRenderPass {
    pub const COUNT: usize = 5;

    /// Every pass, in ordinal order
    pub const VALUES: [BlockRenderPass; Self::COUNT] = [
        BlockRenderPass::Solid,
        BlockRenderPass::Cutout,
        BlockRenderPass::CutoutMipped,
        BlockRenderPass::Translucent,
        BlockRenderPass::Tripwire,
    ];

    /// Position in [`Self::VALUES`]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Translucent passes are blended and drawn back to front
    pub fn is_translucent(self) -> bool {
        matches!(self, BlockRenderPass::Translucent | BlockRenderPass::Tripwire)
    }

    /// Lowercase name used in program labels
    pub fn name(self) -> &'static str {
        match self {
            BlockRenderPass::Solid => "solid",
            BlockRenderPass::Cutout => "cutout",
            BlockRenderPass::CutoutMipped => "cutout_mipped",
            BlockRenderPass::Translucent => "translucent",
            BlockRenderPass::Tripwire => "tripwire",
        }
    }
}

impl fmt::Display for BlockRenderPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
