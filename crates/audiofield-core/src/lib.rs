//! Platform-independent core of the audiofield visualizer.
//!
//! Signal analysis, the idle signal, 2D panel painters, the particle field,
//! effect layers and the frame scheduler all live here so they can be tested
//! on the host. Front-ends supply a [`SignalSource`] and a [`Renderer`].

pub mod analysis;
pub mod color;
pub mod config;
pub mod constants;
pub mod decode;
pub mod error;
pub mod idle;
pub mod layers;
pub mod paint;
pub mod particles;
pub mod scheduler;
pub mod sections;
pub mod snapshot;
pub mod source;
pub mod state;

pub use analysis::Analyser;
pub use config::VisualizerConfig;
pub use decode::{decode_wav, DecodedAudio};
pub use error::{DecodeError, NoBufferError, PlayError};
pub use idle::IdleSignal;
pub use layers::{EffectLayer, LayerKind, LayerStack};
pub use paint::{ColorStop, DrawCommand, LinearGradient, PanelSize};
pub use particles::{ParticleField, ParticlePoint};
pub use scheduler::{
    FrameScheduler, FrameState, LoadTicket, Mailbox, Message, Notice, Renderer, Stage,
    VisualizationContext,
};
pub use sections::{SectionBinder, SectionId};
pub use snapshot::{AudioLevel, SampleSnapshot};
pub use source::{BufferSource, Clock, ManualClock, Playing, Ready, SignalSource, SystemClock};
pub use state::{Camera, Orbit, Viewport};
