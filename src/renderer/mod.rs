pub mod accumulator;
pub mod batch;
pub mod commands;
pub mod context;
pub mod finishers;
pub mod flags;
pub mod group;
pub mod mode_table;
pub mod recording;
pub mod registrars;
pub mod state;
pub mod technique;

pub use accumulator::{
    Accumulator, AccumulatorId, AccumulatorPhase, FrameStats, RegisterOutcome, SkipReason,
    SHADOW_OVERRIDE_ALL,
};
pub use batch::{BatchClassifier, PassItem, PassList};
pub use commands::{CommandQueue, Registration, RegistrationQueue, RenderCommand};
pub use context::{RenderContext, ShaderGlobals};
pub use finishers::FinisherKind;
pub use flags::RenderFlags;
pub use group::{GroupKind, RenderGroup};
pub use mode_table::{RenderMode, RenderModeTable};
pub use recording::{RecordingState, StateCall};
pub use registrars::RegistrarKind;
pub use state::{
    ClearChannel, ClearPolicy, CullMode, DepthStencilMode, DepthStencilTarget, DrawCall,
    ImagespaceEffect, RenderTarget, RendererState, ResourceId,
};
pub use technique::{TechniqueId, TechniqueRange};
