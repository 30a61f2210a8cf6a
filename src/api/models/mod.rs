// Models module - contains diagram records, generation DTOs, and enums

pub mod diagram;
pub mod enums;
pub mod generation;

pub use diagram::{DiagramRecord, NewDiagram, SharedDiagramView, SharingUpdate};
pub use enums::{CloudProvider, DiagramStyle, Template};
pub use generation::{GenerateDiagramRequest, GenerateDiagramResponse};
