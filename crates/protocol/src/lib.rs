//! holler-protocol – Protokoll-Definitionen
//!
//! Dieses Crate definiert die Frame-Arten die ueber eine Relay-Verbindung
//! laufen (binaere Audio-Segmente, Text-Control-Frames, Close) sowie die
//! beiden JSON-Control-Frames die der Server erzeugt.
//!
//! Fuer rohe TCP-Verbindungen gibt es zusaetzlich einen laengen-praefixierten
//! `FrameCodec` (siehe [`wire`]).

pub mod control;
pub mod frame;
pub mod wire;

pub use control::ControlFrame;
pub use frame::{Frame, FrameArt};
pub use wire::FrameCodec;
